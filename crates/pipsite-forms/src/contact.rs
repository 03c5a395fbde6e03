use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use pipsite_config::ContactSettings;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FormResult;
use crate::fs::append_line;
use crate::mail::{Mailer, OutgoingMail};
use crate::validation::{email, max_chars, present, required, ValidationErrors};
use crate::FormOutcome;

const NAME_MAX_CHARS: usize = 255;

/// Raw contact form input; every field may be absent.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// A contact form that passed validation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactForm {
    pub fn validate(self) -> Result<ContactSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", self.name);
        if let Some(name) = &name {
            max_chars(&mut errors, "name", name, NAME_MAX_CHARS);
        }
        let address = required(&mut errors, "email", self.email);
        if let Some(address) = &address {
            email(&mut errors, "email", address);
        }
        let message = required(&mut errors, "message", self.message);

        match (name, address, message) {
            (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(ContactSubmission {
                name,
                email,
                phone: present(self.phone),
                message,
            }),
            _ => Err(errors),
        }
    }
}

/// Stored form of a submission.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only JSON-lines log of contact submissions.
#[derive(Debug)]
pub struct ContactLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ContactLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn append(&self, record: &ContactRecord) -> FormResult<()> {
        let line = serde_json::to_string(record)?;
        // A poisoned lock only means another append panicked; the file is still usable.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        append_line(&self.path, &line)
    }
}

/// Validates submissions, records them and notifies the site team.
#[derive(Debug, Clone)]
pub struct ContactService {
    log: Arc<ContactLog>,
    mailer: Arc<dyn Mailer>,
    notify: String,
    from: String,
}

impl ContactService {
    pub fn new(log: Arc<ContactLog>, mailer: Arc<dyn Mailer>, settings: &ContactSettings) -> Self {
        Self {
            log,
            mailer,
            notify: settings.notify.clone(),
            from: settings.from.clone(),
        }
    }

    pub fn submit(&self, form: ContactForm) -> FormResult<FormOutcome> {
        let submission = match form.validate() {
            Ok(submission) => submission,
            Err(errors) => return Ok(FormOutcome::rejected(errors)),
        };

        let record = ContactRecord {
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            message: submission.message,
            created_at: Utc::now(),
        };
        self.log.append(&record)?;
        self.mailer.send(&self.notification(&record))?;
        info!(email = %record.email, "contact request stored");

        Ok(FormOutcome::accepted())
    }

    fn notification(&self, record: &ContactRecord) -> OutgoingMail {
        let mut body = format!(
            "New contact request\n\nName: {}\nEmail: {}\n",
            record.name, record.email
        );
        if let Some(phone) = &record.phone {
            body.push_str(&format!("Phone: {phone}\n"));
        }
        body.push('\n');
        body.push_str(&record.message);

        OutgoingMail {
            from: self.from.clone(),
            to: self.notify.clone(),
            reply_to: Some(record.email.clone()),
            subject: format!("Contact request from {}", record.name),
            body,
        }
    }
}
