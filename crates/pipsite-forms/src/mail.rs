//! Outgoing notification mail.
//!
//! The site does not speak SMTP itself. Messages are dropped into an outbox
//! directory as `.eml` files for the host's mail transfer agent to pick up.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::FormResult;
use crate::fs::atomic_write;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// RFC 5322 text with CRLF line endings.
    pub fn to_rfc5322(&self, date: DateTime<Utc>) -> String {
        let mut out = String::new();
        push_header(&mut out, "Date", &date.to_rfc2822());
        push_header(&mut out, "From", &self.from);
        push_header(&mut out, "To", &self.to);
        if let Some(reply_to) = &self.reply_to {
            push_header(&mut out, "Reply-To", reply_to);
        }
        push_header(&mut out, "Subject", &self.subject);
        push_header(&mut out, "MIME-Version", "1.0");
        push_header(&mut out, "Content-Type", "text/plain; charset=utf-8");
        out.push_str("\r\n");
        for line in self.body.lines() {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out
    }
}

/// Header values never carry line breaks, so user input cannot add headers.
fn push_header(out: &mut String, name: &str, value: &str) {
    let value: String = value
        .chars()
        .map(|ch| if ch == '\r' || ch == '\n' { ' ' } else { ch })
        .collect();
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value.trim());
    out.push_str("\r\n");
}

pub trait Mailer: fmt::Debug + Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> FormResult<()>;
}

/// Writes each message to its own file in the outbox directory.
#[derive(Debug)]
pub struct OutboxMailer {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, mail: &OutgoingMail) -> FormResult<()> {
        let now = Utc::now();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{}-{seq:04}.eml",
            now.format("%Y%m%dT%H%M%S%.6fZ"),
            std::process::id()
        );
        let path = self.dir.join(name);
        atomic_write(&path, &mail.to_rfc5322(now))?;
        info!(path = %path.display(), to = %mail.to, "queued notification mail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "noreply@example.org".into(),
            to: "team@example.org".into(),
            reply_to: Some("alice@example.org".into()),
            subject: "Contact request from Alice\r\nBcc: victim@example.org".into(),
            body: "line one\nline two".into(),
        }
    }

    #[test]
    fn headers_cannot_be_injected() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let text = mail().to_rfc5322(date);
        assert!(text.contains("Subject: Contact request from Alice  Bcc: victim@example.org\r\n"));
        assert!(!text.contains("\r\nBcc:"));
    }

    #[test]
    fn body_follows_blank_line_with_crlf() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let text = mail().to_rfc5322(date);
        assert!(text.starts_with("Date: Tue, 2 Jan 2024 03:04:05 +0000\r\n"));
        assert!(text.ends_with("\r\n\r\nline one\r\nline two\r\n"));
    }

    #[test]
    fn outbox_writes_one_file_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let mailer = OutboxMailer::new(dir.path().join("outbox"));
        mailer.send(&mail()).unwrap();
        mailer.send(&mail()).unwrap();

        let files: Vec<_> = std::fs::read_dir(mailer.dir())
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files
            .iter()
            .all(|path| path.extension().is_some_and(|ext| ext == "eml")));
    }
}
