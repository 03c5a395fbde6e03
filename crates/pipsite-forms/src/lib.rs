//! Visitor-facing forms: contact requests and newsletter signups.
//!
//! Both flows validate the raw input first. Validation failures are not
//! errors; they come back as a [`FormOutcome`] carrying per-field messages,
//! which the site returns to the browser as JSON.

mod contact;
mod error;
mod fs;
mod mail;
mod newsletter;
mod validation;

use serde::Serialize;

pub use contact::{ContactForm, ContactLog, ContactRecord, ContactService, ContactSubmission};
pub use error::{FormError, FormResult};
pub use fs::{append_line, atomic_write};
pub use mail::{Mailer, OutboxMailer, OutgoingMail};
pub use newsletter::{
    mailing_list, LocalMailingList, MailchimpList, MailingList, NewsletterForm,
    NewsletterService, SubscribeStatus, Subscriber,
};
pub use validation::{is_email, ValidationErrors};

/// Result of a form submission as reported to the browser.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FormOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl FormOutcome {
    pub fn accepted() -> Self {
        Self {
            success: true,
            errors: None,
        }
    }

    pub fn rejected(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_outcome_omits_errors() {
        assert_eq!(
            serde_json::to_string(&FormOutcome::accepted()).unwrap(),
            r#"{"success":true}"#
        );
    }

    #[test]
    fn rejected_outcome_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "The email field is required.");
        assert_eq!(
            serde_json::to_string(&FormOutcome::rejected(errors)).unwrap(),
            r#"{"success":false,"errors":{"email":["The email field is required."]}}"#
        );
    }
}
