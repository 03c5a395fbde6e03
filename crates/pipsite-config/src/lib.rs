//! Configuration primitives and loader for pipsite.
//!
//! Settings are resolved from a precedence stack:
//! override flag → working directory → built-in defaults.
//! Parsed layers are merged field by field and then normalised into typed
//! structures, so the rest of the workspace never touches raw TOML. The
//! resulting [`Config`] is built once at process start and handed down
//! immutably.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use pipsite_store::{validate_key, StoreError};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".pipsite.toml";

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_SITE_NAME: &str = "PIP Site";
const DEFAULT_STORAGE_ROOT: &str = "storage";
const DEFAULT_PIP_INDEX: &str = "PIP/index.toml";
const DEFAULT_PIP_DOCUMENTS: &str = "PIP";
const DEFAULT_ASSET_BASE: &str = "/storage/PIP/resources/";
const DEFAULT_RPC_DOCUMENT: &str = "RPC.md";
const DEFAULT_PROJECTS: &str = "projects.toml";
const DEFAULT_WHITEPAPER: &str = "whitepaper.toml";
const DEFAULT_CONTACT_LOG: &str = "contacts.jsonl";
const DEFAULT_OUTBOX: &str = "outbox";
const DEFAULT_NOTIFY: &str = "team@example.org";
const DEFAULT_FROM: &str = "noreply@example.org";
const DEFAULT_LIST_FILE: &str = "newsletter.jsonl";
const DEFAULT_LOG_FILTER: &str = "info";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub pips: PipSettings,
    pub content: ContentSettings,
    pub contact: ContactSettings,
    pub newsletter: NewsletterSettings,
    pub logging: LoggingSettings,
    pub sources: ConfigSources,
}

/// HTTP listener settings.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    pub site_name: String,
}

/// Location of the read-only document store.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub root: PathBuf,
}

/// Settings for the PIP document catalog.
///
/// `index`, `documents_dir` and `rpc_document` are store keys: relative,
/// `/`-separated paths resolved by the document store, not by the filesystem.
#[derive(Clone, Debug)]
pub struct PipSettings {
    pub index: String,
    pub documents_dir: String,
    /// Public URL prefix that replaces the `resources/` part of the
    /// `resources/PIP-` prefix (`RESOURCE_PREFIX` in the catalog) in rendered
    /// documents.
    /// Always ends with `/`.
    pub asset_base: String,
    pub rpc_document: String,
}

/// Store keys for the auxiliary content files.
#[derive(Clone, Debug)]
pub struct ContentSettings {
    pub projects: String,
    pub whitepaper: String,
}

/// Where contact submissions and notification mail end up.
#[derive(Clone, Debug)]
pub struct ContactSettings {
    pub log: PathBuf,
    pub outbox: PathBuf,
    pub notify: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct NewsletterSettings {
    pub provider: NewsletterProvider,
}

/// Backend that receives newsletter subscriptions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NewsletterProvider {
    /// Append subscriptions to a JSON-lines file.
    Local { list_file: PathBuf },
    /// Subscribe through the Mailchimp members API.
    Mailchimp {
        api_key: String,
        list_id: String,
        data_center: String,
    },
}

#[derive(Clone, Debug)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub filter: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(&default_source));

        let mut source_layers = vec![default_source];

        let local_config_path = working_dir.join(CONFIG_FILE_NAME);
        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, &source)?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, &source)?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            server: resolved.server,
            storage: resolved.storage,
            pips: resolved.pips,
            content: resolved.content,
            contact: resolved.contact,
            newsletter: resolved.newsletter,
            logging: resolved.logging,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: &ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Io {
        path: path.into(),
        source: err,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.into(),
        source: err,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: &ConfigSource) -> PartialConfig {
    let at = |value: &str| Some(Located::new(value.to_owned(), source.clone()));
    let path_at = |value: &str| Some(Located::new(PathBuf::from(value), source.clone()));

    PartialConfig {
        server: ServerPartial {
            bind: at(DEFAULT_BIND),
            site_name: at(DEFAULT_SITE_NAME),
        },
        storage: StoragePartial {
            root: path_at(DEFAULT_STORAGE_ROOT),
        },
        pips: PipPartial {
            index: at(DEFAULT_PIP_INDEX),
            documents_dir: at(DEFAULT_PIP_DOCUMENTS),
            asset_base: at(DEFAULT_ASSET_BASE),
            rpc_document: at(DEFAULT_RPC_DOCUMENT),
        },
        content: ContentPartial {
            projects: at(DEFAULT_PROJECTS),
            whitepaper: at(DEFAULT_WHITEPAPER),
        },
        contact: ContactPartial {
            log: path_at(DEFAULT_CONTACT_LOG),
            outbox: path_at(DEFAULT_OUTBOX),
            notify: at(DEFAULT_NOTIFY),
            from: at(DEFAULT_FROM),
        },
        newsletter: NewsletterPartial {
            provider: at("local"),
            list_file: path_at(DEFAULT_LIST_FILE),
            mailchimp_api_key: None,
            mailchimp_list_id: None,
        },
        logging: LoggingPartial {
            format: at("pretty"),
            filter: at(DEFAULT_LOG_FILTER),
        },
    }
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    server: ServerPartial,
    storage: StoragePartial,
    pips: PipPartial,
    content: ContentPartial,
    contact: ContactPartial,
    newsletter: NewsletterPartial,
    logging: LoggingPartial,
}

/// Overwrite each listed field of `$target` when `$other` provides it.
macro_rules! merge_fields {
    ($target:expr, $other:expr, $($field:ident),+ $(,)?) => {
        $(
            if $other.$field.is_some() {
                $target.$field = $other.$field;
            }
        )+
    };
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        merge_fields!(self.server, other.server, bind, site_name);
        merge_fields!(self.storage, other.storage, root);
        merge_fields!(
            self.pips,
            other.pips,
            index,
            documents_dir,
            asset_base,
            rpc_document
        );
        merge_fields!(self.content, other.content, projects, whitepaper);
        merge_fields!(self.contact, other.contact, log, outbox, notify, from);
        merge_fields!(
            self.newsletter,
            other.newsletter,
            provider,
            list_file,
            mailchimp_api_key,
            mailchimp_list_id
        );
        merge_fields!(self.logging, other.logging, format, filter);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();

        let bind_loc = required(self.server.bind, DEFAULT_BIND);
        let bind = match bind_loc.value.parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(err) => {
                errors.push(
                    ConfigValidationError::new(
                        Some(bind_loc.source.clone()),
                        format!("'{}' is not a socket address: {err}", bind_loc.value),
                    )
                    .with_context("server.bind"),
                );
                None
            }
        };
        let site_name = required(self.server.site_name, DEFAULT_SITE_NAME).value;

        let storage_root = resolve_path(&required_path(self.storage.root, DEFAULT_STORAGE_ROOT));

        let index = store_key(
            required(self.pips.index, DEFAULT_PIP_INDEX),
            "pips.index",
            false,
            &mut errors,
        );
        let documents_dir = store_key(
            required(self.pips.documents_dir, DEFAULT_PIP_DOCUMENTS),
            "pips.documents_dir",
            true,
            &mut errors,
        );
        let rpc_document = store_key(
            required(self.pips.rpc_document, DEFAULT_RPC_DOCUMENT),
            "pips.rpc_document",
            false,
            &mut errors,
        );

        let asset_base_loc = required(self.pips.asset_base, DEFAULT_ASSET_BASE);
        let mut asset_base = asset_base_loc.value.trim().to_owned();
        if asset_base.is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(asset_base_loc.source.clone()),
                    "asset base cannot be empty".into(),
                )
                .with_context("pips.asset_base"),
            );
        } else if !asset_base.ends_with('/') {
            asset_base.push('/');
        }

        let projects = store_key(
            required(self.content.projects, DEFAULT_PROJECTS),
            "content.projects",
            false,
            &mut errors,
        );
        let whitepaper = store_key(
            required(self.content.whitepaper, DEFAULT_WHITEPAPER),
            "content.whitepaper",
            false,
            &mut errors,
        );

        let contact_log = resolve_path(&required_path(self.contact.log, DEFAULT_CONTACT_LOG));
        let outbox = resolve_path(&required_path(self.contact.outbox, DEFAULT_OUTBOX));
        let notify = mailbox(
            required(self.contact.notify, DEFAULT_NOTIFY),
            "contact.notify",
            &mut errors,
        );
        let from = mailbox(
            required(self.contact.from, DEFAULT_FROM),
            "contact.from",
            &mut errors,
        );

        let provider = finalize_provider(self.newsletter, &mut errors);

        let format_loc = required(self.logging.format, "pretty");
        let format = match format_loc.value.parse::<LogFormat>() {
            Ok(format) => format,
            Err(()) => {
                errors.push(
                    ConfigValidationError::new(
                        Some(format_loc.source.clone()),
                        format!(
                            "unknown log format '{}' (expected 'pretty' or 'json')",
                            format_loc.value
                        ),
                    )
                    .with_context("logging.format"),
                );
                LogFormat::Pretty
            }
        };
        let filter = required(self.logging.filter, DEFAULT_LOG_FILTER).value;

        match (bind, provider) {
            (Some(bind), Some(provider)) if errors.is_empty() => Ok(ResolvedConfig {
                server: ServerSettings { bind, site_name },
                storage: StorageSettings { root: storage_root },
                pips: PipSettings {
                    index,
                    documents_dir,
                    asset_base,
                    rpc_document,
                },
                content: ContentSettings {
                    projects,
                    whitepaper,
                },
                contact: ContactSettings {
                    log: contact_log,
                    outbox,
                    notify,
                    from,
                },
                newsletter: NewsletterSettings { provider },
                logging: LoggingSettings { format, filter },
            }),
            _ => Err(ConfigValidationErrors(errors)),
        }
    }
}

fn finalize_provider(
    partial: NewsletterPartial,
    errors: &mut Vec<ConfigValidationError>,
) -> Option<NewsletterProvider> {
    let provider = required(partial.provider, "local");
    match provider.value.as_str() {
        "local" => {
            let list_file = resolve_path(&required_path(partial.list_file, DEFAULT_LIST_FILE));
            Some(NewsletterProvider::Local { list_file })
        }
        "mailchimp" => {
            let api_key = partial.mailchimp_api_key.map(|loc| loc.value);
            let list_id = partial.mailchimp_list_id.map(|loc| loc.value);
            let (Some(api_key), Some(list_id)) = (api_key, list_id) else {
                errors.push(
                    ConfigValidationError::new(
                        Some(provider.source.clone()),
                        "mailchimp provider requires mailchimp_api_key and mailchimp_list_id"
                            .into(),
                    )
                    .with_context("newsletter"),
                );
                return None;
            };
            match api_key.rsplit_once('-') {
                Some((_, dc)) if !dc.is_empty() => Some(NewsletterProvider::Mailchimp {
                    data_center: dc.to_owned(),
                    api_key,
                    list_id,
                }),
                _ => {
                    errors.push(
                        ConfigValidationError::new(
                            Some(provider.source.clone()),
                            "mailchimp_api_key must end with a data-centre suffix such as '-us1'"
                                .into(),
                        )
                        .with_context("newsletter"),
                    );
                    None
                }
            }
        }
        other => {
            errors.push(
                ConfigValidationError::new(
                    Some(provider.source.clone()),
                    format!("unknown provider '{other}' (expected 'local' or 'mailchimp')"),
                )
                .with_context("newsletter.provider"),
            );
            None
        }
    }
}

fn required(value: Option<Located<String>>, fallback: &str) -> Located<String> {
    value.unwrap_or_else(|| {
        Located::new(
            fallback.to_owned(),
            ConfigSource::default(PathBuf::from(".")),
        )
    })
}

fn required_path(value: Option<Located<PathBuf>>, fallback: &str) -> Located<PathBuf> {
    value.unwrap_or_else(|| {
        Located::new(
            PathBuf::from(fallback),
            ConfigSource::default(PathBuf::from(".")),
        )
    })
}

/// Normalise a store key (drop `.` segments and a trailing `/`) and check it
/// against the store's key rules.
fn store_key(
    located: Located<String>,
    context: &str,
    allow_empty: bool,
    errors: &mut Vec<ConfigValidationError>,
) -> String {
    let key = located
        .value
        .trim()
        .trim_end_matches('/')
        .split('/')
        .filter(|segment| *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    let problem = if key.is_empty() {
        (!allow_empty).then(|| "store path cannot be empty".to_owned())
    } else {
        match validate_key(&key) {
            Ok(()) => None,
            Err(StoreError::InvalidKey { reason, .. }) => {
                Some(format!("store path '{key}' is invalid: {reason}"))
            }
            Err(err) => Some(err.to_string()),
        }
    };

    if let Some(message) = problem {
        errors.push(ConfigValidationError::new(Some(located.source), message).with_context(context));
    }
    key
}

fn mailbox(
    located: Located<String>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> String {
    let value = located.value.trim().to_owned();
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        errors.push(
            ConfigValidationError::new(
                Some(located.source),
                format!("'{value}' is not an email address"),
            )
            .with_context(context),
        );
    }
    value
}

#[derive(Clone, Debug, Default)]
struct ServerPartial {
    bind: Option<Located<String>>,
    site_name: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct StoragePartial {
    root: Option<Located<PathBuf>>,
}

#[derive(Clone, Debug, Default)]
struct PipPartial {
    index: Option<Located<String>>,
    documents_dir: Option<Located<String>>,
    asset_base: Option<Located<String>>,
    rpc_document: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct ContentPartial {
    projects: Option<Located<String>>,
    whitepaper: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct ContactPartial {
    log: Option<Located<PathBuf>>,
    outbox: Option<Located<PathBuf>>,
    notify: Option<Located<String>>,
    from: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct NewsletterPartial {
    provider: Option<Located<String>>,
    list_file: Option<Located<PathBuf>>,
    mailchimp_api_key: Option<Located<String>>,
    mailchimp_list_id: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct LoggingPartial {
    format: Option<Located<String>>,
    filter: Option<Located<String>>,
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        let joined = located.source.base_dir.join(path);
        // Drop `.` segments so paths print cleanly in logs.
        joined
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect()
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    server: ServerSettings,
    storage: StorageSettings,
    pips: PipSettings,
    content: ContentSettings,
    contact: ContactSettings,
    newsletter: NewsletterSettings,
    logging: LoggingSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: Option<RawServer>,
    #[serde(default)]
    storage: Option<RawStorage>,
    #[serde(default)]
    pips: Option<RawPips>,
    #[serde(default)]
    content: Option<RawContent>,
    #[serde(default)]
    contact: Option<RawContact>,
    #[serde(default)]
    newsletter: Option<RawNewsletter>,
    #[serde(default)]
    logging: Option<RawLogging>,
}

impl RawConfig {
    fn into_partial(self, source: &ConfigSource) -> PartialConfig {
        let at = |value: Option<String>| value.map(|v| Located::new(v, source.clone()));
        let path_at = |value: Option<PathBuf>| value.map(|v| Located::new(v, source.clone()));

        let server = self.server.unwrap_or_default();
        let storage = self.storage.unwrap_or_default();
        let pips = self.pips.unwrap_or_default();
        let content = self.content.unwrap_or_default();
        let contact = self.contact.unwrap_or_default();
        let newsletter = self.newsletter.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        PartialConfig {
            server: ServerPartial {
                bind: at(server.bind),
                site_name: at(server.site_name),
            },
            storage: StoragePartial {
                root: path_at(storage.root),
            },
            pips: PipPartial {
                index: at(pips.index),
                documents_dir: at(pips.documents_dir),
                asset_base: at(pips.asset_base),
                rpc_document: at(pips.rpc_document),
            },
            content: ContentPartial {
                projects: at(content.projects),
                whitepaper: at(content.whitepaper),
            },
            contact: ContactPartial {
                log: path_at(contact.log),
                outbox: path_at(contact.outbox),
                notify: at(contact.notify),
                from: at(contact.from),
            },
            newsletter: NewsletterPartial {
                provider: at(newsletter.provider),
                list_file: path_at(newsletter.list_file),
                mailchimp_api_key: at(newsletter.mailchimp_api_key),
                mailchimp_list_id: at(newsletter.mailchimp_list_id),
            },
            logging: LoggingPartial {
                format: at(logging.format),
                filter: at(logging.filter),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    #[serde(default)]
    bind: Option<String>,
    #[serde(default)]
    site_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    #[serde(default)]
    root: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPips {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    documents_dir: Option<String>,
    #[serde(default)]
    asset_base: Option<String>,
    #[serde(default)]
    rpc_document: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContent {
    #[serde(default)]
    projects: Option<String>,
    #[serde(default)]
    whitepaper: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContact {
    #[serde(default)]
    log: Option<PathBuf>,
    #[serde(default)]
    outbox: Option<PathBuf>,
    #[serde(default)]
    notify: Option<String>,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNewsletter {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    list_file: Option<PathBuf>,
    #[serde(default)]
    mailchimp_api_key: Option<String>,
    #[serde(default)]
    mailchimp_list_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    filter: Option<String>,
}
