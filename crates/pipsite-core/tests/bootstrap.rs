use std::sync::Arc;

use pipsite_core::PipSite;
use pipsite_store::MemoryStore;
use pipsite_test_support::{SiteFixture, ASSET_BASE};

#[test]
fn bootstrap_wires_catalogs_to_storage_root() {
    let fixture = SiteFixture::new();
    let site = PipSite::bootstrap(fixture.config()).expect("bootstrap");

    assert_eq!(site.config().server.site_name, "Test Site");
    let numbers: Vec<u32> = site
        .documents()
        .list_documents()
        .unwrap()
        .iter()
        .map(|record| record.number)
        .collect();
    assert_eq!(numbers, vec![2, 1]);

    let rendered = site.documents().get_document(1).unwrap();
    assert!(rendered.html.contains(&format!("{ASSET_BASE}PIP-1-fig.png")));

    assert_eq!(site.content().projects().unwrap().len(), 2);
}

#[test]
fn custom_store_replaces_local_storage() {
    let fixture = SiteFixture::new();
    let store = MemoryStore::new().with(
        "PIP/index.toml",
        "[[pip]]\nnumber = 7\nslug = \"pip-7\"\ntitle = \"Seven\"\n",
    );
    let site = PipSite::with_store(fixture.config(), Arc::new(store)).expect("bootstrap");

    let listing = site.documents().list_documents().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].title, "Seven");
    assert!(site.content().projects().unwrap().is_empty());
}
