//! Crate-level integration and BDD tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use plugboard_store::{
    AtomicUpdater, CoordinationStore, FileStore, MemoryStore, RetryPolicy, Snapshot, StoreError,
    Version, document,
};
use serde_json::json;

use crate::api::{CLUSTER_PROPS_PATH, PluginsApi};
use crate::descriptor::PluginDescriptor;
use crate::factory::ClassCatalogue;


/// Memory store that counts calls and can let a rival writer win the next
/// compare-and-set race.
#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    writes: AtomicUsize,
    rival_pending: AtomicUsize,
}

impl CountingStore {
    fn reset(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.writes.store(0, Ordering::SeqCst);
    }

    fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn arm_rival(&self) {
        self.rival_pending.store(1, Ordering::SeqCst);
    }
}

impl CoordinationStore for CountingStore {
    fn get(&self, path: &str) -> Result<Snapshot, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(path)
    }

    fn compare_and_set(
        &self,
        path: &str,
        expected: Version,
        data: &[u8],
    ) -> Result<Version, StoreError> {
        if self.rival_pending.swap(0, Ordering::SeqCst) > 0 {
            let current = self.inner.get(path)?;
            let mut rival = document::decode(current.data()).expect("decode");
            rival.insert("rival".into(), json!(true));
            let bytes = document::encode(&rival).expect("encode");
            self.inner
                .compare_and_set(path, current.version(), &bytes)
                .expect("rival write");
        }
        let result = self.inner.compare_and_set(path, expected, data);
        if result.is_ok() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

type CountingApi = PluginsApi<Arc<CountingStore>, ClassCatalogue>;

fn counting_api(store: &Arc<CountingStore>) -> CountingApi {
    PluginsApi::new(
        AtomicUpdater::new(Arc::clone(store), RetryPolicy::without_backoff(8)),
        ClassCatalogue::permissive(),
    )
}

#[test]
fn file_backed_registry_round_trip() {
    let root = tempfile::tempdir().expect("tempdir");
    let api = PluginsApi::new(
        AtomicUpdater::new(FileStore::new(root.path()), RetryPolicy::default()),
        ClassCatalogue::permissive(),
    );

    api.add(PluginDescriptor::named("p1", "com.foo.P1").with_version("1"))
        .expect("add");
    api.add(PluginDescriptor::named("p2", "pkg:com.foo.P2").with_version("2.1"))
        .expect("add packaged");
    api.remove("p1").expect("remove");

    let reopened = PluginsApi::new(
        AtomicUpdater::new(FileStore::new(root.path()), RetryPolicy::default()),
        ClassCatalogue::permissive(),
    );
    assert_eq!(reopened.list().expect("list").names(), vec!["p2"]);
    assert_eq!(
        reopened.handle_get().expect("get"),
        json!({"plugin": {"p2": {"name": "p2", "class": "pkg:com.foo.P2", "version": "2.1"}}})
    );
}

#[test]
fn rival_write_is_retried_transparently() {
    let store = Arc::new(CountingStore::default());
    let api = counting_api(&store);
    api.add(PluginDescriptor::named("p1", "C")).expect("add");
    store.reset();
    store.arm_rival();

    let outcome = api
        .add(PluginDescriptor::named("p2", "C"))
        .expect("add under contention");

    assert_eq!(outcome.attempts(), 2);
    assert_eq!(store.gets(), 2);
    assert_eq!(store.writes(), 1);
    assert_eq!(api.list().expect("list").names(), vec!["p1", "p2"]);
    assert!(
        store
            .inner
            .data(CLUSTER_PROPS_PATH)
            .is_some_and(|bytes| bytes.windows(7).any(|w| w == b"\"rival\""))
    );
}
