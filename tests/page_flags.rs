//! Page flags tests - decorative effect toggles

use folio::flags::PageFlags;

#[test]
fn default_flags_enable_every_effect() {
    let flags = PageFlags::default();

    assert!(flags.typing_effect, "typing_effect should be enabled by default");
    assert!(flags.parallax, "parallax should be enabled by default");
    assert!(flags.ripple, "ripple should be enabled by default");
    assert!(
        flags.navbar_autohide,
        "navbar_autohide should be enabled by default"
    );
}

#[test]
fn all_disabled_disables_everything() {
    let flags = PageFlags::all_disabled();

    assert!(!flags.typing_effect);
    assert!(!flags.parallax);
    assert!(!flags.ripple);
    assert!(!flags.navbar_autohide);
}

#[test]
fn reduced_motion_keeps_navigation_behaviour() {
    let flags = PageFlags::reduced_motion();

    // Self-animating effects off
    assert!(!flags.typing_effect);
    assert!(!flags.parallax);
    assert!(!flags.ripple);

    // Navbar still reacts to scrolling
    assert!(flags.navbar_autohide);
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let flags: PageFlags = toml::from_str("ripple = false").unwrap();
    assert!(!flags.ripple);
    assert!(flags.typing_effect);
    assert!(flags.parallax);
}
