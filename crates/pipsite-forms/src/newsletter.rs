use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipsite_config::NewsletterProvider;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::error::{FormError, FormResult};
use crate::fs::append_line;
use crate::validation::{email, present, required, ValidationErrors};
use crate::FormOutcome;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewsletterForm {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl NewsletterForm {
    pub fn validate(self) -> Result<Subscriber, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let address = required(&mut errors, "email", self.email);
        if let Some(address) = &address {
            email(&mut errors, "email", address);
        }
        match address {
            Some(address) if errors.is_empty() => Ok(Subscriber {
                email: address,
                first_name: present(self.name),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubscribeStatus {
    Subscribed,
    AlreadySubscribed,
}

/// A mailing list that accepts subscriptions.
#[async_trait]
pub trait MailingList: fmt::Debug + Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn subscribe(&self, subscriber: &Subscriber) -> FormResult<SubscribeStatus>;
}

/// Build the list configured for this deployment.
pub fn mailing_list(provider: &NewsletterProvider) -> FormResult<Arc<dyn MailingList>> {
    Ok(match provider {
        NewsletterProvider::Local { list_file } => Arc::new(LocalMailingList::new(list_file)),
        NewsletterProvider::Mailchimp {
            api_key,
            list_id,
            data_center,
        } => Arc::new(MailchimpList::new(
            api_key.clone(),
            list_id.clone(),
            format!("https://{data_center}.api.mailchimp.com"),
        )?),
    })
}

#[derive(Debug, Serialize)]
struct LocalEntry<'a> {
    #[serde(flatten)]
    subscriber: &'a Subscriber,
    subscribed_at: DateTime<Utc>,
}

/// JSON-lines file of subscribers, one entry per address.
///
/// File access runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct LocalMailingList {
    file: Arc<ListFile>,
}

#[derive(Debug)]
struct ListFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalMailingList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(ListFile {
                path: path.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }
}

impl ListFile {
    fn contains(&self, address: &str) -> FormResult<bool> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(FormError::io(&self.path, err)),
        };
        Ok(contents
            .lines()
            .filter_map(|line| serde_json::from_str::<Subscriber>(line).ok())
            .any(|existing| existing.email.eq_ignore_ascii_case(address)))
    }

    fn add(&self, subscriber: &Subscriber) -> FormResult<SubscribeStatus> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.contains(&subscriber.email)? {
            return Ok(SubscribeStatus::AlreadySubscribed);
        }
        let entry = LocalEntry {
            subscriber,
            subscribed_at: Utc::now(),
        };
        append_line(&self.path, &serde_json::to_string(&entry)?)?;
        Ok(SubscribeStatus::Subscribed)
    }
}

#[async_trait]
impl MailingList for LocalMailingList {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn subscribe(&self, subscriber: &Subscriber) -> FormResult<SubscribeStatus> {
        let file = Arc::clone(&self.file);
        let subscriber = subscriber.clone();
        tokio::task::spawn_blocking(move || file.add(&subscriber)).await?
    }
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mailchimp marketing API, `lists/{id}/members` endpoint.
pub struct MailchimpList {
    api_key: String,
    list_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl fmt::Debug for MailchimpList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailchimpList")
            .field("list_id", &self.list_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MailchimpList {
    /// `base_url` is the API root, e.g. `https://us14.api.mailchimp.com`.
    pub fn new(api_key: String, list_id: String, base_url: String) -> FormResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FormError::Client)?;
        Ok(Self {
            api_key,
            list_id,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    pub fn members_url(&self) -> String {
        format!("{}/3.0/lists/{}/members", self.base_url, self.list_id)
    }
}

#[derive(Debug, Deserialize)]
struct MailchimpProblem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

#[async_trait]
impl MailingList for MailchimpList {
    fn backend_tag(&self) -> &'static str {
        "mailchimp"
    }

    #[instrument(name = "mailchimp_subscribe", skip_all)]
    async fn subscribe(&self, subscriber: &Subscriber) -> FormResult<SubscribeStatus> {
        let body = json!({
            "email_address": subscriber.email,
            "status": "subscribed",
            "merge_fields": { "FNAME": subscriber.first_name.as_deref().unwrap_or("") },
        });
        let response = self
            .client
            .post(self.members_url())
            .basic_auth("pipsite", Some(&self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| FormError::Upstream(format!("request failed: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(SubscribeStatus::Subscribed);
        }

        let problem: Option<MailchimpProblem> = response.json().await.ok();
        match problem {
            Some(problem) if status.as_u16() == 400 && problem.title == "Member Exists" => {
                Ok(SubscribeStatus::AlreadySubscribed)
            }
            Some(problem) => Err(FormError::Upstream(format!(
                "status {status}: {} {}",
                problem.title, problem.detail
            ))),
            None => Err(FormError::Upstream(format!("status {status}"))),
        }
    }
}

/// Validates signups and hands them to the configured list.
#[derive(Debug, Clone)]
pub struct NewsletterService {
    list: Arc<dyn MailingList>,
}

impl NewsletterService {
    pub fn new(list: Arc<dyn MailingList>) -> Self {
        Self { list }
    }

    pub async fn subscribe(&self, form: NewsletterForm) -> FormResult<FormOutcome> {
        let subscriber = match form.validate() {
            Ok(subscriber) => subscriber,
            Err(errors) => return Ok(FormOutcome::rejected(errors)),
        };

        match self.list.subscribe(&subscriber).await {
            Ok(status) => {
                info!(backend = self.list.backend_tag(), ?status, "newsletter signup");
                Ok(FormOutcome::accepted())
            }
            Err(err) => {
                warn!(backend = self.list.backend_tag(), error = %err, "newsletter signup failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_optional() {
        let subscriber = NewsletterForm {
            email: Some("bob@example.org".into()),
            name: None,
        }
        .validate()
        .unwrap();
        assert_eq!(subscriber.first_name, None);
    }

    #[test]
    fn email_is_required_and_checked() {
        let errors = NewsletterForm::default().validate().unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            &["The email field is required.".to_string()]
        );

        let errors = NewsletterForm {
            email: Some("bob".into()),
            name: Some("Bob".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            &["The email must be a valid email address.".to_string()]
        );
    }

    #[test]
    fn mailchimp_url_uses_list_id() {
        let list = MailchimpList::new(
            "key-us3".into(),
            "abc".into(),
            "https://us3.api.mailchimp.com/".into(),
        )
        .unwrap();
        assert_eq!(
            list.members_url(),
            "https://us3.api.mailchimp.com/3.0/lists/abc/members"
        );
    }

    #[tokio::test]
    async fn local_list_deduplicates_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let list = LocalMailingList::new(dir.path().join("list.jsonl"));
        let first = Subscriber {
            email: "Bob@Example.org".into(),
            first_name: Some("Bob".into()),
        };
        let again = Subscriber {
            email: "bob@example.org".into(),
            first_name: None,
        };

        assert_eq!(
            list.subscribe(&first).await.unwrap(),
            SubscribeStatus::Subscribed
        );
        assert_eq!(
            list.subscribe(&again).await.unwrap(),
            SubscribeStatus::AlreadySubscribed
        );

        let contents = fs::read_to_string(dir.path().join("list.jsonl")).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("\"first_name\":\"Bob\""));
    }
}
