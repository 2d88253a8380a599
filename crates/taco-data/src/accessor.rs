//! Ordered lookups against the provider's cache
//!
//! Lookups are pure: they read the latest snapshot and never trigger a fetch.
//! Consumers re-run them when notified through
//! [`TacoProvider::add_subscriber`] or [`TacoProvider::watch`].

use taco_core::{Dataset, DatasetRequest, DatasetSet, TypedRequest, UnknownDatasetId};

use crate::provider::{DatasetRequestById, TacoProvider};

impl TacoProvider {
    /// Requests for `ids`, in the same order and with the same length.
    ///
    /// Duplicated ids yield independent copies of the same request; an empty
    /// list yields an empty list. Any id the `TacoSpec` does not declare fails the
    /// whole lookup.
    pub fn use_datasets<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<DatasetRequest>, UnknownDatasetId> {
        let snapshot = self.snapshot();
        ids.iter()
            .map(|id| self.lookup(&snapshot, id.as_ref()))
            .collect()
    }

    /// Request of a single typed dataset, rows decoded into `D::Row`
    pub fn use_dataset<D: Dataset>(&self) -> Result<TypedRequest<D>, UnknownDatasetId> {
        let snapshot = self.snapshot();
        self.lookup(&snapshot, D::ID).map(TypedRequest::from_request)
    }

    /// Requests of a tuple of typed datasets, in tuple order
    pub fn use_typed<S: DatasetSet>(&self) -> Result<S::Requests, UnknownDatasetId> {
        let snapshot = self.snapshot();
        S::resolve(|id| self.lookup(&snapshot, id))
    }

    fn lookup(
        &self,
        snapshot: &DatasetRequestById,
        id: &str,
    ) -> Result<DatasetRequest, UnknownDatasetId> {
        snapshot
            .get(id)
            .cloned()
            .ok_or_else(|| self.spec().unknown(id))
    }
}
