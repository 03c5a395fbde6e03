use std::net::SocketAddr;
use std::sync::Arc;

use pipsite_core::PipSite;
use pipsite_forms::MailchimpList;
use pipsite_server::{build_router, AppState};
use pipsite_test_support::{FakeMailchimp, SiteFixture, ASSET_BASE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn start(fixture: &SiteFixture) -> SocketAddr {
    start_site(PipSite::bootstrap(fixture.config()).expect("bootstrap")).await
}

async fn start_site(site: PipSite) -> SocketAddr {
    let app = build_router(AppState::new(site));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if !body.is_empty() {
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    req.push_str(body);
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

async fn get(addr: SocketAddr, path: &str) -> (u16, String, String) {
    send_raw(addr, "GET", path, &[], "").await
}

async fn post_form(addr: SocketAddr, path: &str, body: &str) -> (u16, String, String) {
    send_raw(
        addr,
        "POST",
        path,
        &[("Content-Type", "application/x-www-form-urlencoded")],
        body,
    )
    .await
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle} not found in response"))
}

#[tokio::test]
async fn pip_listing_is_most_recent_first() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, head, body) = get(addr, "/pips").await;
    assert_eq!(status, 200);
    assert!(head.to_ascii_lowercase().contains("content-type: text/html"));
    assert!(position(&body, "href=\"/pips/2\"") < position(&body, "href=\"/pips/1\""));
    assert!(body.contains("Block Rewards"));
}

#[tokio::test]
async fn pip_page_rewrites_resource_links() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = get(addr, "/pips/1").await;
    assert_eq!(status, 200);
    assert!(body.contains(&format!("{ASSET_BASE}PIP-1-fig.png")));
    assert!(!body.contains("resources/PIP-"));
    assert!(body.contains("<dt>Author</dt><dd>Core Team</dd>"));

    let (_, _, again) = get(addr, "/pips/1").await;
    assert_eq!(body, again);
}

#[tokio::test]
async fn unknown_pips_are_404_pages() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    for path in ["/pips/999", "/pips/abc", "/pips/-1", "/no-such-page"] {
        let (status, _, body) = get(addr, path).await;
        assert_eq!(status, 404, "{path}");
        assert!(body.contains("404 Not Found"), "{path}");
    }
}

#[tokio::test]
async fn unreadable_index_is_a_500_without_details() {
    let fixture = SiteFixture::new();
    fixture.remove("storage/PIP/index.toml");
    let addr = start(&fixture).await;

    let (status, _, body) = get(addr, "/pips").await;
    assert_eq!(status, 500);
    assert!(body.contains("500 Internal Server Error"));
    assert!(!body.contains("index.toml"));

    let (status, _, _) = get(addr, "/pips/1").await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn missing_body_is_a_500() {
    let fixture = SiteFixture::new();
    fixture.remove("storage/PIP/pip-2.md");
    let addr = start(&fixture).await;

    let (status, _, _) = get(addr, "/pips/2").await;
    assert_eq!(status, 500);
    let (status, _, _) = get(addr, "/pips/1").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn rpc_page_renders_fixed_document() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = get(addr, "/rpc").await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>JSON-RPC API</h1>"));
    assert!(body.contains("<h2>getblock</h2>"));
}

#[tokio::test]
async fn static_pages_render() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    for path in [
        "/",
        "/get-started",
        "/voting",
        "/funding-transparency",
        "/contact",
    ] {
        let (status, _, body) = get(addr, path).await;
        assert_eq!(status, 200, "{path}");
        assert!(body.contains("Test Site"), "{path}");
    }
}

#[tokio::test]
async fn whitepaper_sections_follow_position() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = get(addr, "/whitepapers").await;
    assert_eq!(status, 200);
    assert!(position(&body, "Introduction") < position(&body, "Consensus"));
    assert!(body.contains("<i class=\"fa-book\"></i>"));
}

#[tokio::test]
async fn projects_are_listed_by_title_and_rendered() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = get(addr, "/projects").await;
    assert_eq!(status, 200);
    assert!(position(&body, "Explorer") < position(&body, "Wallet"));

    let (status, _, body) = get(addr, "/projects/1").await;
    assert_eq!(status, 200);
    assert!(body.contains("<strong>desktop</strong>"));

    let (status, _, _) = get(addr, "/projects/42").await;
    assert_eq!(status, 404);
    let (status, _, _) = get(addr, "/projects/wallet").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn contact_form_reports_success_and_errors() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = post_form(
        addr,
        "/contact",
        "name=Alice&email=alice%40example.org&phone=&message=Hello",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"success":true}"#);
    assert!(fixture.read("var/contacts.jsonl").contains("\"name\":\"Alice\""));

    let (status, _, body) = post_form(addr, "/contact", "name=Alice&email=nope").await;
    assert_eq!(status, 200);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["success"], false);
    assert_eq!(
        value["errors"]["email"][0],
        "The email must be a valid email address."
    );
    assert_eq!(value["errors"]["message"][0], "The message field is required.");
}

#[tokio::test]
async fn newsletter_signup_reports_success() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) =
        post_form(addr, "/newsletter", "email=dave%40example.org&name=Dave").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"success":true}"#);
    assert!(fixture.read("var/newsletter.jsonl").contains("dave@example.org"));

    let (status, _, body) = post_form(addr, "/newsletter", "name=Dave").await;
    assert_eq!(status, 200);
    assert!(body.contains(r#""success":false"#));
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (_, head, _) = send_raw(addr, "GET", "/", &[("x-request-id", "req-test")], "").await;
    assert!(head.contains("x-request-id: req-test"));

    let (_, head, _) = get(addr, "/").await;
    assert!(head.contains("x-request-id: req-"));
}

async fn post_json(addr: SocketAddr, path: &str, body: &str) -> (u16, String, String) {
    send_raw(
        addr,
        "POST",
        path,
        &[("Content-Type", "application/json")],
        body,
    )
    .await
}

#[tokio::test]
async fn contact_form_accepts_json_bodies() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = post_json(
        addr,
        "/contact",
        r#"{"name":"Bea","email":"bea@example.org","message":"Hi"}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"success":true}"#);
    assert!(fixture.read("var/contacts.jsonl").contains("\"name\":\"Bea\""));
}

#[tokio::test]
async fn unreadable_form_bodies_keep_the_json_shape() {
    let fixture = SiteFixture::new();
    let addr = start(&fixture).await;

    let (status, _, body) = send_raw(
        addr,
        "POST",
        "/contact",
        &[("Content-Type", "text/plain")],
        "hello",
    )
    .await;
    assert_eq!(status, 415);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["success"], false);
    assert_eq!(value["errors"]["form"][0], "The submitted form could not be read.");

    let (status, _, body) = post_form(
        addr,
        "/contact",
        "name=A&name=B&email=a%40example.org&message=Hi",
    )
    .await;
    assert_eq!(status, 422);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["success"], false);

    let (status, _, body) = post_json(addr, "/newsletter", "{not json").await;
    assert_eq!(status, 400);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["success"], false);
    assert!(!fixture.root().join("var/contacts.jsonl").exists());
}

#[tokio::test]
async fn newsletter_provider_results_map_to_responses() {
    let fixture = SiteFixture::new();
    let mailchimp = FakeMailchimp::start().await;
    let list = MailchimpList::new("key-us1".into(), "list42".into(), mailchimp.base_url().into())
        .expect("mailchimp client");
    let site = PipSite::bootstrap(fixture.config())
        .expect("bootstrap")
        .with_mailing_list(Arc::new(list));
    let addr = start_site(site).await;

    let (status, _, body) = post_form(addr, "/newsletter", "email=member%40example.org").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"success":true}"#);

    let (status, _, body) = post_form(addr, "/newsletter", "email=broken%40example.org").await;
    assert_eq!(status, 502);
    let value: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(value["success"], false);
    assert_eq!(
        value["errors"]["email"][0],
        "The mailing list is unavailable. Please try again later."
    );
    assert_eq!(mailchimp.requests().len(), 2);
}
