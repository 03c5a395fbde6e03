//! Core orchestration layer for pipsite.

use std::sync::Arc;

use pipsite_catalog::{ContentCatalog, DocumentCatalog};
use pipsite_config::Config;
use pipsite_forms::{
    mailing_list, ContactLog, ContactService, FormError, MailingList, NewsletterService,
    OutboxMailer,
};
use pipsite_store::{DocumentStore, LocalFsStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to set up the newsletter list: {0}")]
    Newsletter(#[source] FormError),
}

/// Every service the site needs, built once from configuration.
///
/// Cloning is cheap; the services share their store and writers.
#[derive(Clone, Debug)]
pub struct PipSite {
    config: Arc<Config>,
    documents: DocumentCatalog,
    content: ContentCatalog,
    contact: ContactService,
    newsletter: NewsletterService,
}

impl PipSite {
    /// Bootstrap against the local storage root named in `config`.
    pub fn bootstrap(config: Config) -> Result<Self, BootstrapError> {
        let store: Arc<dyn DocumentStore> = Arc::new(LocalFsStore::new(&config.storage.root));
        Self::with_store(config, store)
    }

    /// Bootstrap with a caller-supplied document store.
    pub fn with_store(
        config: Config,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, BootstrapError> {
        let documents = DocumentCatalog::new(Arc::clone(&store), config.pips.clone());
        let content = ContentCatalog::new(store, config.content.clone());
        let contact = ContactService::new(
            Arc::new(ContactLog::new(&config.contact.log)),
            Arc::new(OutboxMailer::new(&config.contact.outbox)),
            &config.contact,
        );
        let list =
            mailing_list(&config.newsletter.provider).map_err(BootstrapError::Newsletter)?;

        Ok(Self {
            config: Arc::new(config),
            documents,
            content,
            contact,
            newsletter: NewsletterService::new(list),
        })
    }

    /// Replace the configured mailing list.
    pub fn with_mailing_list(mut self, list: Arc<dyn MailingList>) -> Self {
        self.newsletter = NewsletterService::new(list);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn documents(&self) -> &DocumentCatalog {
        &self.documents
    }

    pub fn content(&self) -> &ContentCatalog {
        &self.content
    }

    pub fn contact(&self) -> &ContactService {
        &self.contact
    }

    pub fn newsletter(&self) -> &NewsletterService {
        &self.newsletter
    }
}
