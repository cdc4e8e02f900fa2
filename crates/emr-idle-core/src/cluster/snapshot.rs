//! [`ClusterApi`] over saved AWS CLI responses.
//!
//! ```text
//! {root}/{cluster_id}/describe-cluster.json   # aws emr describe-cluster --output json
//! {root}/{cluster_id}/list-steps.json         # aws emr list-steps --output json
//! ```
//!
//! A missing `list-steps.json` means the cluster ran no steps.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{wire, ClusterApi, ClusterDescription, StepSummary};
use crate::error::{IdleError, IdleResult};

pub const DESCRIBE_CLUSTER_FILE: &str = "describe-cluster.json";
pub const LIST_STEPS_FILE: &str = "list-steps.json";

#[derive(Debug, Clone)]
pub struct SnapshotClusterApi {
    root: PathBuf,
}

impl SnapshotClusterApi {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, cluster_id: &str, file: &str) -> PathBuf {
        self.root.join(cluster_id).join(file)
    }
}

#[async_trait]
impl ClusterApi for SnapshotClusterApi {
    async fn describe_cluster(&self, cluster_id: &str) -> IdleResult<ClusterDescription> {
        let path = self.path(cluster_id, DESCRIBE_CLUSTER_FILE);
        let json = tokio::fs::read_to_string(&path).await.map_err(|e| {
            IdleError::cluster_api(
                "describe-cluster",
                cluster_id,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;
        wire::parse_describe_cluster(cluster_id, &json)
    }

    async fn list_steps(&self, cluster_id: &str) -> IdleResult<Vec<StepSummary>> {
        let path = self.path(cluster_id, LIST_STEPS_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => wire::parse_list_steps(cluster_id, &json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no step snapshot, assuming no steps");
                Ok(Vec::new())
            }
            Err(e) => Err(IdleError::cluster_api(
                "list-steps",
                cluster_id,
                format!("failed to read {}: {}", path.display(), e),
            )),
        }
    }
}
