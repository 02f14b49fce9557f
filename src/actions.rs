//! Public page actions (the buttons and links wired to named functions).

use serde::{Deserialize, Serialize};

use crate::config::OwnerConfig;
use crate::debug::{self, cat};
use crate::notify::Severity;
use crate::page::PageContext;
use crate::port::ElementRef;

pub const RESUME_PENDING: &str =
    "Resume download will be available soon! Please contact me directly.";

/// Every action reachable from the page's buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicAction {
    ScrollToContact,
    ScrollToAbout,
    DownloadResume,
    SendEmail,
    CallNow,
    OpenLinkedin,
    OpenGithub,
    ViewLocation,
    ScrollToTop,
}

impl PublicAction {
    pub const ALL: [PublicAction; 9] = [
        PublicAction::ScrollToContact,
        PublicAction::ScrollToAbout,
        PublicAction::DownloadResume,
        PublicAction::SendEmail,
        PublicAction::CallNow,
        PublicAction::OpenLinkedin,
        PublicAction::OpenGithub,
        PublicAction::ViewLocation,
        PublicAction::ScrollToTop,
    ];

    /// Name of the function exported to page scripts.
    pub fn js_name(self) -> &'static str {
        match self {
            PublicAction::ScrollToContact => "scrollToContact",
            PublicAction::ScrollToAbout => "scrollToAbout",
            PublicAction::DownloadResume => "downloadResume",
            PublicAction::SendEmail => "sendEmail",
            PublicAction::CallNow => "callNow",
            PublicAction::OpenLinkedin => "openLinkedIn",
            PublicAction::OpenGithub => "openGitHub",
            PublicAction::ViewLocation => "viewLocation",
            PublicAction::ScrollToTop => "scrollToTop",
        }
    }

    pub fn from_js_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.js_name() == name)
    }
}

/// `mailto:` link with a pre-filled subject and body.
pub fn mailto_link(owner: &OwnerConfig) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        owner.email,
        urlencoding::encode(&owner.email_subject),
        urlencoding::encode(&owner.email_body)
    )
}

pub fn tel_link(owner: &OwnerConfig) -> String {
    format!("tel:{}", owner.phone)
}

pub fn maps_link(address: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(address)
    )
}

pub struct Actions {
    ctx: PageContext,
}

impl Actions {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    pub fn run(&self, action: PublicAction) {
        debug::log(cat::ACTION, format!("{}()", action.js_name()));
        match action {
            PublicAction::ScrollToContact => self.scroll_to_contact(),
            PublicAction::ScrollToAbout => self.scroll_to_about(),
            PublicAction::DownloadResume => self.download_resume(),
            PublicAction::SendEmail => self.send_email(),
            PublicAction::CallNow => self.call_now(),
            PublicAction::OpenLinkedin => self.open_linkedin(),
            PublicAction::OpenGithub => self.open_github(),
            PublicAction::ViewLocation => self.view_location(),
            PublicAction::ScrollToTop => self.scroll_to_top(),
        }
    }

    fn owner(&self) -> &OwnerConfig {
        &self.ctx.config.owner
    }

    pub fn scroll_to_contact(&self) {
        let el = ElementRef::from(self.ctx.config.selectors.contact_section.as_str());
        self.ctx.port.scroll_into_view(&el);
    }

    pub fn scroll_to_about(&self) {
        let el = ElementRef::from(self.ctx.config.selectors.about_section.as_str());
        self.ctx.port.scroll_into_view(&el);
    }

    pub fn scroll_to_top(&self) {
        self.ctx.port.scroll_to_top();
    }

    pub fn download_resume(&self) {
        let Some(url) = self.owner().resume_url.as_deref() else {
            self.ctx.notifier.notify(RESUME_PENDING, Severity::Info);
            return;
        };
        let file_name = &self.owner().resume_file_name;
        if let Err(err) = self.ctx.nav.download(url, file_name) {
            log::warn!("resume download failed: {err}");
            self.ctx.notifier.notify(RESUME_PENDING, Severity::Info);
        }
    }

    pub fn send_email(&self) {
        let owner = self.owner();
        match self.ctx.nav.navigate(&mailto_link(owner)) {
            Ok(()) => {
                self.ctx.notifier.notify("Opening email client...", Severity::Info);
            }
            Err(err) => {
                log::warn!("mailto handoff failed: {err}");
                self.ctx
                    .notifier
                    .notify(format!("Please email me at: {}", owner.email), Severity::Info);
            }
        }
    }

    pub fn call_now(&self) {
        let owner = self.owner();
        match self.ctx.nav.navigate(&tel_link(owner)) {
            Ok(()) => {
                self.ctx.notifier.notify("Initiating phone call...", Severity::Info);
            }
            Err(err) => {
                log::warn!("tel handoff failed: {err}");
                self.ctx.notifier.notify(
                    format!("Please call: {}", owner.phone_display),
                    Severity::Info,
                );
            }
        }
    }

    pub fn open_linkedin(&self) {
        self.open_social("LinkedIn", &self.owner().linkedin_url);
    }

    pub fn open_github(&self) {
        self.open_social("GitHub", &self.owner().github_url);
    }

    pub fn view_location(&self) {
        let url = maps_link(&self.owner().address);
        self.open_social("the map", &url);
    }

    fn open_social(&self, label: &str, url: &str) {
        if let Err(err) = self.ctx.nav.open_external(url) {
            log::warn!("could not open {label}: {err}");
            self.ctx
                .notifier
                .notify(format!("Please visit {label} at: {url}"), Severity::Info);
        }
    }

    /// Page-script entry point for notifications; unknown severities fall
    /// back to info.
    pub fn notify(&self, message: &str, severity: Option<&str>, duration_ms: Option<u32>) -> u64 {
        let severity = severity.map(Severity::parse_lossy).unwrap_or_default();
        let duration = duration_ms.unwrap_or(self.ctx.notifier.settings().default_duration_ms);
        self.ctx.notifier.notify_for(message, severity, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::port::PortCall;
    use crate::test_support::Harness;

    fn last_message(h: &Harness) -> Option<String> {
        h.ctx().notifier.current().map(|n| n.message)
    }

    #[test]
    fn mailto_is_percent_encoded() {
        let owner = OwnerConfig {
            email: "me@example.org".into(),
            email_subject: "Job Opportunity".into(),
            email_body: "Hi,\nthere".into(),
            ..OwnerConfig::default()
        };
        assert_eq!(
            mailto_link(&owner),
            "mailto:me@example.org?subject=Job%20Opportunity&body=Hi%2C%0Athere"
        );
        assert_eq!(
            maps_link("Springfield, IL"),
            "https://www.google.com/maps/search/?api=1&query=Springfield%2C%20IL"
        );
    }

    #[test]
    fn resume_without_url_explains() {
        let h = Harness::new();
        Actions::new(h.ctx()).download_resume();
        assert_eq!(last_message(&h).as_deref(), Some(RESUME_PENDING));
    }

    #[test]
    fn resume_downloads_under_configured_name() {
        let mut config = SiteConfig::default();
        config.owner.resume_url = Some("https://example.com/cv.pdf".into());
        config.owner.resume_file_name = "Jordan_Reyes.pdf".into();
        let h = Harness::with_config(config, 1280);

        Actions::new(h.ctx()).download_resume();
        assert_eq!(
            h.port.calls(),
            vec![PortCall::Download {
                url: "https://example.com/cv.pdf".into(),
                file_name: "Jordan_Reyes.pdf".into(),
            }]
        );
        assert!(last_message(&h).is_none());

        h.port.fail_navigation(true);
        Actions::new(h.ctx()).download_resume();
        assert_eq!(last_message(&h).as_deref(), Some(RESUME_PENDING));
    }

    #[test]
    fn email_fallback_shows_address() {
        let h = Harness::new();
        let actions = Actions::new(h.ctx());
        actions.send_email();
        assert_eq!(last_message(&h).as_deref(), Some("Opening email client..."));

        h.port.fail_navigation(true);
        actions.send_email();
        assert_eq!(
            last_message(&h),
            Some(format!("Please email me at: {}", h.config.owner.email))
        );
    }

    #[test]
    fn call_fallback_shows_display_number() {
        let h = Harness::new();
        h.port.fail_navigation(true);
        Actions::new(h.ctx()).call_now();
        assert_eq!(
            last_message(&h),
            Some(format!("Please call: {}", h.config.owner.phone_display))
        );
        assert!(!h.port.calls().iter().any(|c| matches!(c, PortCall::Navigate { .. })));
    }

    #[test]
    fn social_links_open_in_new_tab() {
        let h = Harness::new();
        let actions = Actions::new(h.ctx());
        actions.run(PublicAction::OpenGithub);
        assert_eq!(
            h.port.calls(),
            vec![PortCall::OpenExternal { url: h.config.owner.github_url.clone() }]
        );
        assert!(h.ctx().notifier.current().is_none());
    }

    #[test]
    fn scroll_actions_target_sections() {
        let h = Harness::new();
        let actions = Actions::new(h.ctx());
        actions.run(PublicAction::ScrollToContact);
        actions.run(PublicAction::ScrollToTop);
        assert_eq!(
            h.port.calls(),
            vec![
                PortCall::ScrollIntoView { el: "#contact".into() },
                PortCall::ScrollToTop,
            ]
        );
    }

    #[test]
    fn js_names_round_trip() {
        for action in PublicAction::ALL {
            assert_eq!(PublicAction::from_js_name(action.js_name()), Some(action));
        }
        assert_eq!(PublicAction::from_js_name("nope"), None);
    }

    #[test]
    fn notify_export_parses_severity_leniently() {
        let h = Harness::new();
        let actions = Actions::new(h.ctx());
        actions.notify("hi", Some("WARNING"), Some(1000));
        let note = h.ctx().notifier.current().unwrap();
        assert_eq!((note.severity, note.duration_ms), (Severity::Warning, 1000));

        actions.notify("hi", Some("shouting"), None);
        let note = h.ctx().notifier.current().unwrap();
        assert_eq!((note.severity, note.duration_ms), (Severity::Info, 5000));
    }
}
