//! Fetch-and-cache provider

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use ahash::AHashMap;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use taco_core::{
    DatasetMetadata, DatasetRequest, FetchError, RequestState, Row, TacoSpec, TacoState,
    UnknownDatasetId,
};

use crate::config::TacoConfig;
use crate::fetcher::{DatasetFetcher, HttpFetcher};
use crate::subscriber::{DatasetChange, DatasetSubscriber};
use crate::DataError;

/// Current request of every declared dataset, keyed by dataset id
pub type DatasetRequestById = AHashMap<String, DatasetRequest>;

/// Fetches every dataset of a spec once and caches the outcome.
///
/// Cloning a provider yields another handle to the same cache. Fetch tasks
/// only hold a weak reference: once every handle is dropped, or after
/// [`TacoProvider::unmount`], late results are discarded.
#[derive(Clone)]
pub struct TacoProvider {
    pub(crate) inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) spec: Arc<TacoSpec>,
    /// Replaced wholesale on every transition, never mutated in place
    requests: RwLock<Arc<DatasetRequestById>>,
    mounted: AtomicBool,
    subscribers: RwLock<Vec<Weak<dyn DatasetSubscriber>>>,
    snapshots: watch::Sender<Arc<DatasetRequestById>>,
}

impl TacoProvider {
    /// Mount with an HTTP fetcher using the default [`FetchConfig`].
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// [`FetchConfig`]: crate::config::FetchConfig
    pub fn mount(state: &TacoState) -> Result<Self, DataError> {
        Ok(Self::mount_with(state, Arc::new(HttpFetcher::new()?)))
    }

    /// Mount with the fetch settings of a configuration file
    pub fn from_config(config: &TacoConfig) -> Result<Self, DataError> {
        let fetcher = HttpFetcher::from_config(&config.fetch)?;
        Ok(Self::mount_with(&config.state(), Arc::new(fetcher)))
    }

    /// Mount with a custom fetcher: mark every dataset pending and start
    /// one fetch per dataset, all concurrently.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount_with(state: &TacoState, fetcher: Arc<dyn DatasetFetcher>) -> Self {
        let spec = state.spec().clone();
        let inner = Arc::new(ProviderInner::new(spec.clone()));

        info!(
            "Mounting provider for {} datasets at {}",
            spec.len(),
            state.base_url()
        );

        for metadata in spec.iter() {
            let provider = Arc::downgrade(&inner);
            let fetcher = fetcher.clone();
            let metadata = metadata.clone();
            let base_url = state.base_url().to_string();

            tokio::spawn(async move {
                let outcome = fetch_rows(fetcher.as_ref(), &base_url, &metadata).await;
                match provider.upgrade() {
                    Some(inner) => inner.settle(&metadata.id, outcome),
                    None => debug!(
                        "Provider dropped before dataset '{}' settled, discarding result",
                        metadata.id
                    ),
                }
            });
        }

        Self { inner }
    }

    /// The `TacoSpec` this provider was mounted with
    pub fn spec(&self) -> &TacoSpec {
        &self.inner.spec
    }

    /// Current requests of all datasets
    pub fn snapshot(&self) -> Arc<DatasetRequestById> {
        self.inner.requests.read().clone()
    }

    /// Channel carrying a fresh snapshot after every transition
    pub fn watch(&self) -> watch::Receiver<Arc<DatasetRequestById>> {
        self.inner.snapshots.subscribe()
    }

    /// Wait until no dataset is pending and return that snapshot.
    ///
    /// Returns immediately with the current snapshot once unmounted, since
    /// pending datasets can no longer settle.
    pub async fn settled(&self) -> Arc<DatasetRequestById> {
        let mut rx = self.watch();
        let inner = &self.inner;
        let result = rx
            .wait_for(|requests| {
                !inner.is_mounted() || requests.values().all(DatasetRequest::is_settled)
            })
            .await
            .map(|snapshot| (*snapshot).clone());

        match result {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    /// Wait until dataset `id` has settled and return its request.
    ///
    /// Returns the request as it stands if the provider is unmounted first,
    /// which may still be pending.
    pub async fn settled_dataset(&self, id: &str) -> Result<DatasetRequest, UnknownDatasetId> {
        self.spec().require(id)?;

        let mut rx = self.watch();
        let inner = &self.inner;
        let result = rx
            .wait_for(|requests| {
                !inner.is_mounted() || requests.get(id).is_some_and(DatasetRequest::is_settled)
            })
            .await
            .map(|snapshot| snapshot.get(id).cloned());

        let request = match result {
            Ok(request) => request,
            Err(_) => self.snapshot().get(id).cloned(),
        };
        request.ok_or_else(|| self.spec().unknown(id))
    }

    /// Add a subscriber notified on every transition
    pub fn add_subscriber(&self, subscriber: Arc<dyn DatasetSubscriber>) {
        self.inner.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    /// Tear the provider down. In-flight fetches still run to completion but
    /// their results are no longer applied.
    pub fn unmount(&self) {
        {
            // Taken so no settlement is halfway through applying
            let requests = self.inner.requests.write();
            self.inner.mounted.store(false, Ordering::Release);
            self.inner.snapshots.send_replace(requests.clone());
        }
        info!("Provider unmounted");
    }
}

impl ProviderInner {
    /// Every declared dataset starts out pending
    fn new(spec: Arc<TacoSpec>) -> Self {
        let initial: DatasetRequestById = spec
            .iter()
            .map(|metadata| (metadata.id.clone(), DatasetRequest::pending(&metadata.id)))
            .collect();
        let initial = Arc::new(initial);
        let (snapshots, _) = watch::channel(initial.clone());

        Self {
            spec,
            requests: RwLock::new(initial),
            mounted: AtomicBool::new(true),
            subscribers: RwLock::new(Vec::new()),
            snapshots,
        }
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Apply the outcome of one dataset's fetch
    fn settle(&self, id: &str, outcome: Result<Vec<Row>, FetchError>) {
        let request = match outcome {
            Ok(rows) => DatasetRequest::loaded(id, rows),
            Err(error) => DatasetRequest::failed(id, error),
        };
        let summary = request.to_string();
        let change = DatasetChange {
            id: id.to_string(),
            state: request.state(),
        };

        let applied = self.update(|previous| match previous.get(id) {
            Some(current) if current.is_pending() => {
                let mut next = previous.clone();
                next.insert(id.to_string(), request);
                Some(next)
            }
            _ => None,
        });
        if !applied {
            return;
        }

        match change.state {
            RequestState::Error => warn!("Dataset {}", summary),
            _ => info!("Dataset {}", summary),
        }
        self.notify_subscribers(&change);
    }

    /// Derive a new mapping from the latest one and swap it in.
    ///
    /// Returns whether anything changed. Nothing is applied once unmounted.
    fn update<F>(&self, derive: F) -> bool
    where
        F: FnOnce(&DatasetRequestById) -> Option<DatasetRequestById>,
    {
        let mut requests = self.requests.write();
        if !self.is_mounted() {
            debug!("Provider unmounted, discarding update");
            return false;
        }

        let Some(next) = derive(&**requests) else {
            return false;
        };
        let next = Arc::new(next);
        *requests = next.clone();
        self.snapshots.send_replace(next);
        true
    }

    fn notify_subscribers(&self, change: &DatasetChange) {
        let live: Vec<Arc<dyn DatasetSubscriber>> = {
            let mut subscribers = self.subscribers.write();

            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            subscriber.on_dataset_change(change);
        }
    }
}

async fn fetch_rows(
    fetcher: &dyn DatasetFetcher,
    base_url: &str,
    metadata: &DatasetMetadata,
) -> Result<Vec<Row>, FetchError> {
    let body = fetcher.fetch(base_url, metadata).await?;
    Ok(metadata.dataset_schema.decode_rows(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use taco_core::{ColumnSchema, DatasetSchema};

    struct Counter(AtomicUsize);

    impl DatasetSubscriber for Counter {
        fn on_dataset_change(&self, _change: &DatasetChange) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn inner() -> ProviderInner {
        let schema = DatasetSchema::new(vec![ColumnSchema::string("Beverage")]);
        let spec = TacoSpec::new(vec![DatasetMetadata::new("dataset-1", "/dataset-1", schema)])
            .unwrap();
        ProviderInner::new(Arc::new(spec))
    }

    fn coffee() -> Vec<Row> {
        let mut row = Row::new();
        row.insert("Beverage", "Coffee");
        vec![row]
    }

    #[test]
    fn test_starts_pending() {
        let inner = inner();
        let requests = inner.requests.read().clone();
        assert_eq!(requests.len(), 1);
        assert!(requests["dataset-1"].is_pending());
        assert!(inner.is_mounted());
    }

    #[test]
    fn test_second_settlement_is_ignored() {
        let inner = inner();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        inner.subscribers.write().push(Arc::downgrade(&counter) as Weak<dyn DatasetSubscriber>);

        inner.settle("dataset-1", Ok(coffee()));
        let first = inner.requests.read().clone();

        inner.settle(
            "dataset-1",
            Err(FetchError::Transport("connection reset".to_string())),
        );
        let second = inner.requests.read().clone();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second["dataset-1"].state(), RequestState::Loaded);
        assert_eq!(second["dataset-1"].source().map(<[Row]>::len), Some(1));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_settle_after_unmount_is_ignored() {
        let inner = inner();
        inner.mounted.store(false, Ordering::Release);

        inner.settle("dataset-1", Ok(coffee()));
        assert!(inner.requests.read()["dataset-1"].is_pending());
    }

    #[test]
    fn test_undeclared_id_is_ignored() {
        let inner = inner();
        inner.settle("dataset-9", Ok(coffee()));

        let requests = inner.requests.read().clone();
        assert_eq!(requests.len(), 1);
        assert!(!requests.contains_key("dataset-9"));
    }
}
