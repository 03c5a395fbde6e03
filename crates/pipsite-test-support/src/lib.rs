//! Shared test harness utilities for pipsite crates.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::extract::{Path as UrlPath, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pipsite_config::{Config, LoadOptions};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ASSET_BASE: &str = "/assets/pip/";

pub const INDEX: &str = r#"[[pip]]
number = 1
slug = "pip-1"
title = "PIP Purpose and Guidelines"
author = "Core Team"
kind = "Process"
status = "Active"
created = "2018-06-21"

[[pip]]
number = 2
slug = "pip-2"
title = "Block Rewards"
status = "Draft"
"#;

pub const PIP_1: &str = "See resources/PIP-1-fig.png";

pub const PIP_2: &str = "# Block Rewards\n\n![chart](resources/PIP-2/chart.png)\n";

pub const RPC: &str = "# JSON-RPC API\n\n## getblock\n\nReturns a block.\n";

pub const PROJECTS: &str = r#"[[project]]
id = 1
title = "Wallet"
description = "A **desktop** wallet."

[[project]]
id = 2
title = "Explorer"
description = "Block explorer."
"#;

pub const WHITEPAPER: &str = r#"[[section]]
title = "Consensus"
icon = "fa-cubes"
content = "Proof of stake."
position = 2

[[section]]
title = "Introduction"
icon = "fa-book"
content = "Welcome."
position = 1
"#;

/// A site checkout in a temporary directory: a `.pipsite.toml`, a populated
/// `storage/` tree and a `var/` directory for contact and newsletter output.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let fixture = Self { dir };

        fixture.write(
            ".pipsite.toml",
            &format!(
                r#"[server]
bind = "127.0.0.1:0"
site_name = "Test Site"

[storage]
root = "storage"

[pips]
asset_base = "{ASSET_BASE}"

[contact]
log = "var/contacts.jsonl"
outbox = "var/outbox"
notify = "team@example.org"

[newsletter]
list_file = "var/newsletter.jsonl"
"#
            ),
        );
        fixture.write("storage/PIP/index.toml", INDEX);
        fixture.write("storage/PIP/pip-1.md", PIP_1);
        fixture.write("storage/PIP/pip-2.md", PIP_2);
        fixture.write("storage/RPC.md", RPC);
        fixture.write("storage/projects.toml", PROJECTS);
        fixture.write("storage/whitepaper.toml", WHITEPAPER);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn storage(&self) -> PathBuf {
        self.root().join("storage")
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write fixture file");
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root().join(relative)).expect("remove fixture file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).expect("read fixture file")
    }

    /// Configuration resolved from the fixture's `.pipsite.toml`.
    pub fn config(&self) -> Config {
        Config::load(LoadOptions::default().with_working_dir(self.root())).expect("load config")
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

type RecordedRequests = Arc<Mutex<Vec<Value>>>;

/// Local stand-in for the Mailchimp members endpoint.
///
/// The answer depends on the subscribed address: `member@...` gets the
/// "Member Exists" problem, `broken@...` a 500, anything else is accepted.
pub struct FakeMailchimp {
    base_url: String,
    requests: RecordedRequests,
}

impl FakeMailchimp {
    pub async fn start() -> Self {
        let requests = RecordedRequests::default();
        let app = Router::new()
            .route("/3.0/lists/:list_id/members", post(members))
            .with_state(Arc::clone(&requests));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake mailchimp");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve fake mailchimp") });
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests received so far, as `{list_id, authorized, body}`.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("requests lock").clone()
    }
}

async fn members(
    State(requests): State<RecordedRequests>,
    UrlPath(list_id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));
    let email = body["email_address"].as_str().unwrap_or_default().to_owned();
    requests
        .lock()
        .expect("requests lock")
        .push(json!({ "list_id": list_id, "authorized": authorized, "body": body }));

    if email.starts_with("member@") {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "title": "Member Exists",
                "detail": format!("{email} is already a list member."),
            })),
        )
    } else if email.starts_with("broken@") {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "title": "Internal Server Error", "detail": "try again" })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "email_address": email, "status": "subscribed" })),
        )
    }
}
