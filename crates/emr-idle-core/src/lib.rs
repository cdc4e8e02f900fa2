pub mod adapters;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod pipeline;
pub mod store;

// Convenience re-exports
pub use adapters::{IntervalSource, LogArchiveAdapter, StepSourceAdapter};
pub use cluster::{
    AwsCliClusterApi, ClusterApi, ClusterDescription, InMemoryClusterApi, SnapshotClusterApi,
    StepSummary,
};
pub use config::{load_config, IdleConfig};
pub use engine::{compute_idle_time, idle_breakdown, Gap, IdleBreakdown, IdleReport};
pub use error::{IdleError, IdleResult};
pub use history::UnsetTimestampPolicy;
pub use model::{ClusterReadyTime, DiscoveryOrder, SourceKind, Timeline, WorkInterval};
pub use pipeline::{cluster_api_from_config, compute_cluster_idle, interval_source};
pub use store::{LogArchive, ObjectRef, StoreError, StoreOptions, StoreSpec};
