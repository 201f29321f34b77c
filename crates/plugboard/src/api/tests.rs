//! Unit tests for the plugin API facade.

use std::sync::atomic::{AtomicUsize, Ordering};

use mockall::mock;
use plugboard_store::{MemoryStore, RetryPolicy, Snapshot, StoreError, Version, document};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::factory::ClassCatalogue;

mock! {
    Store {}
    impl CoordinationStore for Store {
        fn get(&self, path: &str) -> Result<Snapshot, StoreError>;
        fn compare_and_set(
            &self,
            path: &str,
            expected: Version,
            data: &[u8],
        ) -> Result<Version, StoreError>;
    }
}

/// Commits a rival edit to a sibling key just before the first CAS call
/// made while armed, so that call loses its race.
#[derive(Debug, Default)]
struct RivalStore {
    inner: MemoryStore,
    armed: AtomicUsize,
    cas_calls: AtomicUsize,
}

impl RivalStore {
    fn arm(&self) {
        self.armed.store(1, Ordering::SeqCst);
        self.cas_calls.store(0, Ordering::SeqCst);
    }
}

impl CoordinationStore for RivalStore {
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        self.inner.get(path)
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        if self.armed.swap(0, Ordering::SeqCst) > 0 {
            let current = self.inner.get(path)?;
            let mut rival = document::decode(current.data()).expect("decode");
            rival.insert("urlScheme".into(), json!("https"));
            let bytes = document::encode(&rival).expect("encode");
            self.inner
                .compare_and_set(path, current.version(), &bytes)
                .expect("rival write");
        }
        self.inner.compare_and_set(path, expected, data)
    }
}

type MemoryApi = PluginsApi<MemoryStore, ClassCatalogue>;

#[fixture]
fn api() -> MemoryApi {
    PluginsApi::new(
        AtomicUpdater::new(MemoryStore::new(), RetryPolicy::without_backoff(4)),
        ClassCatalogue::permissive(),
    )
}

fn p1() -> PluginDescriptor {
    PluginDescriptor::named("p1", "com.foo.P1").with_version("1")
}

fn stored(store: &MemoryStore) -> Value {
    let bytes = store.data(CLUSTER_PROPS_PATH).expect("document exists");
    serde_json::from_slice(&bytes).expect("stored JSON")
}

fn mock_api(store: MockStore) -> PluginsApi<MockStore, ClassCatalogue> {
    PluginsApi::new(
        AtomicUpdater::new(store, RetryPolicy::without_backoff(4)),
        ClassCatalogue::permissive(),
    )
}

// ----------------------------------------------------------------------------
// Read path
// ----------------------------------------------------------------------------

#[rstest]
fn list_of_missing_document_is_empty(api: MemoryApi) {
    assert!(api.list().expect("list").is_empty());
}

#[test]
fn list_ignores_sibling_keys() {
    let store = MemoryStore::with_node(CLUSTER_PROPS_PATH, r#"{"urlScheme":"https"}"#);
    let api = PluginsApi::new(
        AtomicUpdater::new(store, RetryPolicy::default()),
        ClassCatalogue::permissive(),
    );
    assert!(api.list().expect("list").is_empty());
}

#[test]
fn list_surfaces_store_failure() {
    let mut store = MockStore::new();
    store.expect_get().returning(|path| {
        Err(StoreError::Unavailable {
            path: path.to_owned(),
            message: "connection refused".into(),
        })
    });
    let error = mock_api(store).list().expect_err("unavailable");
    assert!(matches!(error, PluginApiError::Store(StoreError::Unavailable { .. })));
}

#[test]
fn list_maps_interruption_to_cancellation() {
    let mut store = MockStore::new();
    store.expect_get().returning(|path| {
        Err(StoreError::Interrupted {
            path: path.to_owned(),
        })
    });
    let error = mock_api(store).list().expect_err("interrupted");
    assert!(matches!(error, PluginApiError::Cancelled));
}

#[rstest]
fn handle_get_wraps_registry(api: MemoryApi) {
    api.add(p1()).expect("add");
    assert_eq!(
        api.handle_get().expect("get"),
        json!({"plugin": {"p1": {"name": "p1", "class": "com.foo.P1", "version": "1"}}})
    );
}

// ----------------------------------------------------------------------------
// Edits
// ----------------------------------------------------------------------------

#[test]
fn invalid_descriptor_never_reaches_the_store() {
    let mut store = MockStore::new();
    store.expect_get().never();
    store.expect_compare_and_set().never();
    let api = mock_api(store);

    let error = api
        .add(PluginDescriptor::named("p1", "pkg:Foo"))
        .expect_err("missing version");

    assert_eq!(error.messages(), vec!["must provide version"]);
}

#[test]
fn identical_update_performs_no_write() {
    let current = json!({"plugin": {"p1": {"name": "p1", "class": "com.foo.P1", "version": "1"}}});
    let mut store = MockStore::new();
    store
        .expect_get()
        .times(1)
        .returning(move |_| Ok(Snapshot::present(current.to_string(), 3)));
    store.expect_compare_and_set().never();

    let outcome = mock_api(store).update(p1()).expect("update");

    assert_eq!(outcome, UpdateOutcome::Unchanged { attempts: 1 });
}

#[rstest]
fn duplicate_add_keeps_original(api: MemoryApi) {
    api.add(p1()).expect("first add");
    let error = api
        .add(PluginDescriptor::named("p1", "com.foo.Other"))
        .expect_err("duplicate");

    assert_eq!(error.messages(), vec!["p1 already exists"]);
    assert_eq!(api.list().expect("list").get("p1"), Some(&p1()));
    assert_eq!(api.updater().store().write_count(), 1);
}

#[rstest]
fn remove_of_missing_plugin_writes_nothing(api: MemoryApi) {
    let error = api.remove("missing").expect_err("missing");
    assert_eq!(error.messages(), vec!["No such plugin: missing"]);
    assert_eq!(api.updater().store().write_count(), 0);
}

#[rstest]
fn changed_update_is_committed(api: MemoryApi) {
    api.add(p1()).expect("add");
    let changed = p1().with_field("config", json!({"threads": 2}));
    api.update(changed.clone()).expect("update");
    assert_eq!(api.list().expect("list").get("p1"), Some(&changed));
}

#[test]
fn edits_preserve_sibling_keys() {
    let store = MemoryStore::with_node(
        CLUSTER_PROPS_PATH,
        r#"{"urlScheme":"https","collectionDefaults":{"nrtReplicas":2}}"#,
    );
    let api = PluginsApi::new(
        AtomicUpdater::new(store, RetryPolicy::default()),
        ClassCatalogue::permissive(),
    );
    api.add(p1()).expect("add");
    api.remove("p1").expect("remove");

    assert_eq!(
        stored(api.updater().store()),
        json!({"urlScheme": "https", "collectionDefaults": {"nrtReplicas": 2}, "plugin": {}})
    );
}

#[test]
fn malformed_registry_is_reported() {
    let store = MemoryStore::with_node(CLUSTER_PROPS_PATH, r#"{"plugin":["p1"]}"#);
    let api = PluginsApi::new(
        AtomicUpdater::new(store, RetryPolicy::default()),
        ClassCatalogue::permissive(),
    );
    assert!(matches!(
        api.add(p1()),
        Err(PluginApiError::MalformedDocument { .. })
    ));
    assert!(matches!(
        api.list(),
        Err(PluginApiError::MalformedDocument { .. })
    ));
}

#[test]
fn custom_path_is_used() {
    let api = PluginsApi::new(
        AtomicUpdater::new(MemoryStore::new(), RetryPolicy::default()),
        ClassCatalogue::permissive(),
    )
    .with_path("/other.json");
    api.add(p1()).expect("add");
    assert_eq!(api.path(), "/other.json");
    assert!(api.updater().store().data("/other.json").is_some());
    assert!(api.updater().store().data(CLUSTER_PROPS_PATH).is_none());
}

// ----------------------------------------------------------------------------
// Wire binding
// ----------------------------------------------------------------------------

#[rstest]
fn handle_post_reports_success_with_no_errors(api: MemoryApi) {
    let response = api.handle_post(br#"{"add": {"name": "p1", "class": "com.foo.P1"}}"#);
    assert!(response.is_success());
    assert_eq!(serde_json::to_value(&response).expect("serialise"), json!({}));
}

#[rstest]
#[case::unknown(r#"{"rename": "p1"}"#, "Unknown command: rename")]
#[case::missing(r#"{"remove": "ghost"}"#, "No such plugin: ghost")]
#[case::version(r#"{"add": {"name": "p", "class": "pkg:Foo"}}"#, "must provide version")]
fn handle_post_reports_errors(api: MemoryApi, #[case] body: &str, #[case] expected: &str) {
    let response = api.handle_post(body.as_bytes());
    assert_eq!(response.errors, vec![expected.to_owned()]);
    assert_eq!(
        serde_json::to_value(&response).expect("serialise"),
        json!({"errors": [expected]})
    );
}

// ----------------------------------------------------------------------------
// End to end under contention
// ----------------------------------------------------------------------------

#[test]
fn add_then_contended_remove_leaves_registry_empty() {
    let api = PluginsApi::new(
        AtomicUpdater::new(RivalStore::default(), RetryPolicy::without_backoff(4)),
        ClassCatalogue::permissive(),
    );
    let store = api.updater().store();

    let added = api.add(p1()).expect("add");
    assert_eq!(added.attempts(), 1);
    assert_eq!(store.cas_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        stored(&store.inner),
        json!({"plugin": {"p1": {"name": "p1", "class": "com.foo.P1", "version": "1"}}})
    );

    store.arm();
    let removed = api.remove("p1").expect("remove");

    assert_eq!(removed.attempts(), 2);
    assert_eq!(store.cas_calls.load(Ordering::SeqCst), 2);
    assert!(api.list().expect("list").is_empty());
    assert_eq!(
        stored(&store.inner),
        json!({"urlScheme": "https", "plugin": {}})
    );
}
