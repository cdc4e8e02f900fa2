//! Sources of work intervals.
//!
//! Each adapter declares the order it discovers intervals in; callers
//! normalise with [`Timeline::into_chronological`] before folding.

pub mod log_archive;
pub mod steps;

use async_trait::async_trait;

use crate::error::IdleResult;
use crate::model::{DiscoveryOrder, SourceKind, Timeline};

pub use log_archive::LogArchiveAdapter;
pub use steps::StepSourceAdapter;

#[async_trait]
pub trait IntervalSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Native order of [`IntervalSource::list_work_intervals`].
    fn discovery_order(&self) -> DiscoveryOrder;

    async fn list_work_intervals(&self, cluster_id: &str) -> IdleResult<Timeline>;
}
