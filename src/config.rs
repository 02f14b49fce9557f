use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::notify::NotifySettings;

/// folio - interactive behaviour for a static resume page
///
/// Headless preview and configuration checker for the page core.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resume page behaviour: config check and headless replay", long_about = None)]
pub struct CliArgs {
    /// Site configuration file (TOML)
    #[arg(short, long, env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Viewport width in px used for replay (1-10000)
    #[arg(long, env = "FOLIO_VIEWPORT_WIDTH", global = true)]
    pub viewport_width: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration and print a summary
    Check,
    /// Print the default configuration as TOML
    Defaults,
    /// Replay a scripted page-event timeline and print every presentation effect
    Replay {
        /// Scenario file (.toml or .json)
        script: PathBuf,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
        /// Pretend the browser has no IntersectionObserver
        #[arg(long)]
        no_observer: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerConfig {
    pub name: String,
    pub role: String,
    pub email: String,
    /// Dialable form used for `tel:` links.
    pub phone: String,
    /// Human-readable form shown in fallback notifications.
    pub phone_display: String,
    pub address: String,
    pub linkedin_url: String,
    pub github_url: String,
    /// When unset, "download resume" only tells the visitor to get in touch.
    pub resume_url: Option<String>,
    pub resume_file_name: String,
    pub email_subject: String,
    pub email_body: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            name: "Jordan Reyes".to_string(),
            role: "Software Developer".to_string(),
            email: "hello@example.com".to_string(),
            phone: "+15550100".to_string(),
            phone_display: "+1 555 0100".to_string(),
            address: "1 Example Street, Springfield".to_string(),
            linkedin_url: "https://www.linkedin.com/in/example/".to_string(),
            github_url: "https://github.com/example".to_string(),
            resume_url: None,
            resume_file_name: "Resume.pdf".to_string(),
            email_subject: "Job Opportunity".to_string(),
            email_body: "Hello,\n\nI am interested in discussing a potential opportunity with you.\n\nBest regards,".to_string(),
        }
    }
}

/// CSS selectors the browser adapter resolves at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub navbar: String,
    pub hamburger: String,
    pub nav_menu: String,
    pub nav_links: String,
    pub skill_bars: String,
    pub reveal_items: String,
    pub hero: String,
    pub hero_title: String,
    pub contact_form: String,
    pub submit_button: String,
    pub buttons: String,
    pub lazy_images: String,
    pub contact_section: String,
    pub about_section: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            navbar: ".navbar".to_string(),
            hamburger: ".hamburger".to_string(),
            nav_menu: ".nav-menu".to_string(),
            nav_links: ".nav-menu a[href^=\"#\"]".to_string(),
            skill_bars: ".skill-progress".to_string(),
            reveal_items: ".skill, .soft-skill, .timeline-item, .contact-card, .reference-card, .strength-item, .info-item".to_string(),
            hero: ".hero".to_string(),
            hero_title: ".hero-left h1".to_string(),
            contact_form: "#contactForm".to_string(),
            submit_button: "#contactForm button[type=\"submit\"]".to_string(),
            buttons: ".btn, .contact-btn".to_string(),
            lazy_images: "img[loading=\"lazy\"]".to_string(),
            contact_section: "#contact".to_string(),
            about_section: "#about".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Widths above this are "desktop" (navbar auto-hide, parallax).
    pub desktop_breakpoint_px: u32,
    /// Widths at or below this get full-width notification banners.
    pub compact_breakpoint_px: u32,
    pub navbar_scrolled_px: f64,
    pub navbar_hide_after_px: f64,
    pub parallax_rate: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            desktop_breakpoint_px: 768,
            compact_breakpoint_px: 480,
            navbar_scrolled_px: 50.0,
            navbar_hide_after_px: 100.0,
            parallax_rate: -0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub notification_ms: u32,
    pub notification_fade_ms: u32,
    pub navbar_idle_ms: u32,
    pub reveal_stagger_ms: u32,
    pub skill_bar_delay_ms: u32,
    pub ripple_ms: u32,
    pub typing_start_ms: u32,
    pub typing_char_ms: u32,
    pub cursor_ms: u32,
    pub send_delay_ms: u32,
    pub frame_ms: u32,
    pub resize_debounce_ms: u32,
    pub action_throttle_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            notification_ms: 5000,
            notification_fade_ms: 300,
            navbar_idle_ms: 1000,
            reveal_stagger_ms: 100,
            skill_bar_delay_ms: 200,
            ripple_ms: 600,
            typing_start_ms: 1000,
            typing_char_ms: 50,
            cursor_ms: 3000,
            send_delay_ms: 2000,
            frame_ms: 16,
            resize_debounce_ms: 100,
            action_throttle_ms: 500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub skill_threshold: f64,
    pub section_threshold: f64,
    pub lazy_threshold: f64,
    pub margin_bottom_px: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            skill_threshold: 0.3,
            section_threshold: 0.1,
            lazy_threshold: 0.0,
            margin_bottom_px: -50.0,
        }
    }
}

/// All static configuration consumed by the page core.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub owner: OwnerConfig,
    pub selectors: SelectorConfig,
    pub layout: LayoutConfig,
    pub timing: TimingConfig,
    pub reveal: RevealConfig,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate link format (basic scheme check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/') {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http://, https://, or /"))
    }
}

const MAX_DURATION_MS: u32 = 600_000;

impl SiteConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(s).context("invalid site configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing site configuration")
    }

    pub fn validate(&self) -> Result<()> {
        let l = &self.layout;
        validate_in_range(l.desktop_breakpoint_px, 1, 10_000, "layout.desktop_breakpoint_px")?;
        validate_in_range(l.compact_breakpoint_px, 1, 10_000, "layout.compact_breakpoint_px")?;
        if l.compact_breakpoint_px > l.desktop_breakpoint_px {
            return Err(anyhow!(
                "layout.compact_breakpoint_px ({}) cannot exceed layout.desktop_breakpoint_px ({})",
                l.compact_breakpoint_px,
                l.desktop_breakpoint_px
            ));
        }

        let t = &self.timing;
        for (value, name) in [
            (t.notification_ms, "timing.notification_ms"),
            (t.notification_fade_ms, "timing.notification_fade_ms"),
            (t.navbar_idle_ms, "timing.navbar_idle_ms"),
            (t.reveal_stagger_ms, "timing.reveal_stagger_ms"),
            (t.skill_bar_delay_ms, "timing.skill_bar_delay_ms"),
            (t.ripple_ms, "timing.ripple_ms"),
            (t.typing_start_ms, "timing.typing_start_ms"),
            (t.typing_char_ms, "timing.typing_char_ms"),
            (t.cursor_ms, "timing.cursor_ms"),
            (t.send_delay_ms, "timing.send_delay_ms"),
            (t.resize_debounce_ms, "timing.resize_debounce_ms"),
            (t.action_throttle_ms, "timing.action_throttle_ms"),
        ] {
            validate_in_range(value, 0, MAX_DURATION_MS, name)?;
        }
        validate_in_range(t.frame_ms, 1, 1000, "timing.frame_ms")?;

        let r = &self.reveal;
        validate_in_range(r.skill_threshold, 0.0, 1.0, "reveal.skill_threshold")?;
        validate_in_range(r.section_threshold, 0.0, 1.0, "reveal.section_threshold")?;
        validate_in_range(r.lazy_threshold, 0.0, 1.0, "reveal.lazy_threshold")?;

        let o = &self.owner;
        if !o.email.contains('@') {
            return Err(anyhow!("owner.email must be an email address, got '{}'", o.email));
        }
        if o.phone.is_empty() {
            return Err(anyhow!("owner.phone cannot be empty"));
        }
        validate_url(&o.linkedin_url, "owner.linkedin_url")?;
        validate_url(&o.github_url, "owner.github_url")?;
        if let Some(ref url) = o.resume_url {
            validate_url(url, "owner.resume_url")?;
        }
        Ok(())
    }

    pub fn notify_settings(&self) -> NotifySettings {
        NotifySettings {
            default_duration_ms: self.timing.notification_ms,
            fade_ms: self.timing.notification_fade_ms,
            compact_breakpoint_px: self.layout.compact_breakpoint_px,
        }
    }

    /// Print current configuration (useful for debugging)
    pub fn print_summary(&self) {
        eprintln!("folio configuration:");
        eprintln!("  Owner: {} ({})", self.owner.name, self.owner.role);
        eprintln!("  Contact: {} / {}", self.owner.email, self.owner.phone_display);
        match self.owner.resume_url {
            Some(ref url) => eprintln!("  Resume: {url}"),
            None => eprintln!("  Resume: not published"),
        }
        eprintln!(
            "  Breakpoints: desktop > {}px, compact <= {}px",
            self.layout.desktop_breakpoint_px, self.layout.compact_breakpoint_px
        );
        eprintln!(
            "  Notifications: {}ms (fade {}ms)",
            self.timing.notification_ms, self.timing.notification_fade_ms
        );
        eprintln!(
            "  Typing: start {}ms, {}ms/char, cursor {}ms",
            self.timing.typing_start_ms, self.timing.typing_char_ms, self.timing.cursor_ms
        );
    }
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load(args: &CliArgs) -> Result<SiteConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env::var("FOLIO_CONFIG").ok().map(PathBuf::from));
    match path {
        Some(path) => SiteConfig::load_file(&path),
        None => {
            log::debug!("no config file given, using defaults");
            let config = SiteConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Viewport width for headless replay: CLI > env > 1280.
pub fn viewport_width(args: &CliArgs) -> Result<u32> {
    let width = args
        .viewport_width
        .or_else(|| {
            env::var("FOLIO_VIEWPORT_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(1280);
    validate_in_range(width, 1, 10_000, "FOLIO_VIEWPORT_WIDTH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SiteConfig::from_toml_str(
            r#"
            [owner]
            email = "me@example.org"

            [timing]
            notification_ms = 3000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.owner.email, "me@example.org");
        assert_eq!(cfg.timing.notification_ms, 3000);
        assert_eq!(cfg.timing.typing_char_ms, 50);
        assert_eq!(cfg.layout.desktop_breakpoint_px, 768);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = SiteConfig::from_toml_str("[reveal]\nskill_threshold = 1.5\n").unwrap_err();
        assert!(format!("{err:#}").contains("reveal.skill_threshold"));
    }

    #[test]
    fn breakpoints_must_be_ordered() {
        let err = SiteConfig::from_toml_str(
            "[layout]\ncompact_breakpoint_px = 900\ndesktop_breakpoint_px = 768\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = SiteConfig::default().to_toml().unwrap();
        assert_eq!(SiteConfig::from_toml_str(&text).unwrap(), SiteConfig::default());
    }
}
