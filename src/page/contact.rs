//! Contact form: field validation and the simulated send.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PageContext;
use crate::debug::{self, cat};
use crate::notify::Severity;
use crate::port::ElementRef;

pub const SENT_MESSAGE: &str = "Message sent successfully! I will get back to you soon.";

/// Raw form values as submitted. Missing fields count as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// First failing rule. `Display` is the text shown to the visitor.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid name (minimum 2 characters)")]
    Name,
    #[error("Please enter your email address")]
    EmailMissing,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("Please enter a subject (minimum 3 characters)")]
    Subject,
    #[error("Please enter a message (minimum 10 characters)")]
    Message,
}

/// Whitespace as browsers see it: Unicode `White_Space` plus the BOM.
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn trimmed(field: &Option<String>) -> &str {
    field.as_deref().map(|v| v.trim_matches(is_space)).unwrap_or("")
}

fn too_short(value: &str, min: usize) -> bool {
    value.chars().count() < min
}

/// `local@domain.tld` shape: exactly one `@`, no whitespace, and a dot in the
/// domain with something on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(is_space) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

impl ContactFields {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if too_short(trimmed(&self.name), 2) {
            return Err(ValidationError::Name);
        }
        let email = trimmed(&self.email);
        if email.is_empty() {
            return Err(ValidationError::EmailMissing);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::EmailInvalid);
        }
        if too_short(trimmed(&self.subject), 3) {
            return Err(ValidationError::Subject);
        }
        if too_short(trimmed(&self.message), 10) {
            return Err(ValidationError::Message);
        }
        Ok(())
    }
}

/// What happened to a submit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(ValidationError),
    Sending,
    /// A send is already in flight.
    Ignored,
}

pub struct ContactForm {
    ctx: PageContext,
    form: ElementRef,
    button: ElementRef,
    in_flight: Rc<Cell<bool>>,
}

impl ContactForm {
    pub fn new(ctx: PageContext, form: ElementRef, button: ElementRef) -> Self {
        Self {
            ctx,
            form,
            button,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.get()
    }

    pub fn submit(&self, fields: &ContactFields) -> SubmitOutcome {
        if self.in_flight.get() {
            log::info!("contact form submit ignored: send already in flight");
            return SubmitOutcome::Ignored;
        }

        let port = &self.ctx.port;
        port.set_busy(&self.button, true);

        if let Err(err) = fields.validate() {
            debug::log(cat::FORM, format!("rejected: {err:?}"));
            port.set_busy(&self.button, false);
            self.ctx.notifier.notify(err.to_string(), Severity::Error);
            return SubmitOutcome::Rejected(err);
        }

        self.in_flight.set(true);
        debug::log(cat::FORM, "valid, sending");

        let port = port.clone();
        let notifier = self.ctx.notifier.clone();
        let in_flight = self.in_flight.clone();
        let form = self.form.clone();
        let button = self.button.clone();
        self.ctx.sched.schedule(
            self.ctx.config.timing.send_delay_ms,
            Box::new(move || {
                port.set_busy(&button, false);
                notifier.notify(SENT_MESSAGE, Severity::Success);
                port.reset_form(&form);
                in_flight.set(false);
                debug::log(cat::FORM, "sent");
            }),
        );
        SubmitOutcome::Sending
    }
}
