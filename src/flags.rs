//! Page effect toggles
//!
//! Decorative effects can be switched off individually without touching the
//! rest of the page. Content reveal, navigation and the contact form are not
//! optional and have no flag.

use serde::{Deserialize, Serialize};

/// Feature flags for decorative page behaviour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFlags {
    /// Type the hero title out character by character.
    ///
    /// Default: `true`
    pub typing_effect: bool,

    /// Move the hero at half scroll speed on desktop widths.
    ///
    /// Default: `true`
    pub parallax: bool,

    /// Ripple animation on button clicks.
    ///
    /// Default: `true`
    pub ripple: bool,

    /// Hide the navbar while scrolling down on desktop widths.
    ///
    /// Default: `true`
    pub navbar_autohide: bool,
}

impl Default for PageFlags {
    fn default() -> Self {
        PageFlags {
            typing_effect: true,
            parallax: true,
            ripple: true,
            navbar_autohide: true,
        }
    }
}

impl PageFlags {
    /// Every decorative effect off
    pub fn all_disabled() -> Self {
        PageFlags {
            typing_effect: false,
            parallax: false,
            ripple: false,
            navbar_autohide: false,
        }
    }

    /// For visitors who asked for reduced motion: keep the navbar behaviour,
    /// drop everything that animates on its own.
    pub fn reduced_motion() -> Self {
        PageFlags {
            typing_effect: false,
            parallax: false,
            ripple: false,
            navbar_autohide: true,
        }
    }
}
