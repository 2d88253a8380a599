//! Dataset change subscriber trait

use taco_core::RequestState;

/// A dataset settling into its final state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetChange {
    pub id: String,
    pub state: RequestState,
}

/// Trait for components that need to re-read datasets when they change.
///
/// The provider holds subscribers weakly; dropping the last `Arc` to a
/// subscriber unsubscribes it.
pub trait DatasetSubscriber: Send + Sync {
    /// Called after the change has been applied, so lookups made from here
    /// already see it
    fn on_dataset_change(&self, change: &DatasetChange);
}
