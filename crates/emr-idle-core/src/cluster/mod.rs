//! Cluster metadata collaborators.
//!
//! The idle computation needs two calls from the cluster orchestration
//! API: one describe (log URI, ready time) and one step listing. Both sit
//! behind [`ClusterApi`] so the adapters can run against the AWS CLI, a
//! directory of saved responses, or in-memory fixtures.

pub mod aws_cli;
pub mod snapshot;
mod wire;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{IdleError, IdleResult};

pub use aws_cli::AwsCliClusterApi;
pub use snapshot::SnapshotClusterApi;

/// Result of a describe-cluster call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescription {
    pub id: String,
    pub name: String,
    /// Base URI the cluster writes its logs under, if logging is enabled.
    pub log_uri: Option<String>,
    /// Epoch millis the cluster became ready; absent while still starting.
    pub ready_at: Option<i64>,
}

impl ClusterDescription {
    /// The ready timestamp, or a fatal error if the cluster never got there.
    pub fn require_ready_at(&self) -> IdleResult<i64> {
        self.ready_at.ok_or_else(|| IdleError::MissingReadyTime {
            cluster_id: self.id.clone(),
        })
    }

    pub fn require_log_uri(&self) -> IdleResult<&str> {
        self.log_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| IdleError::MissingLogUri {
                cluster_id: self.id.clone(),
            })
    }
}

/// One entry of a step listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub id: String,
    pub name: String,
    pub args: Vec<String>,
    pub state: String,
    pub created_at: Option<i64>,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

/// The cluster orchestration API.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn describe_cluster(&self, cluster_id: &str) -> IdleResult<ClusterDescription>;

    /// Every step of the cluster, newest first.
    async fn list_steps(&self, cluster_id: &str) -> IdleResult<Vec<StepSummary>>;
}

/// Fixture-backed API for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClusterApi {
    clusters: HashMap<String, ClusterDescription>,
    steps: HashMap<String, Vec<StepSummary>>,
}

impl InMemoryClusterApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, cluster: ClusterDescription) -> Self {
        self.clusters.insert(cluster.id.clone(), cluster);
        self
    }

    /// Steps for `cluster_id`, newest first.
    pub fn with_steps(mut self, cluster_id: &str, steps: Vec<StepSummary>) -> Self {
        self.steps.insert(cluster_id.to_string(), steps);
        self
    }
}

#[async_trait]
impl ClusterApi for InMemoryClusterApi {
    async fn describe_cluster(&self, cluster_id: &str) -> IdleResult<ClusterDescription> {
        self.clusters
            .get(cluster_id)
            .cloned()
            .ok_or_else(|| IdleError::cluster_api("describe-cluster", cluster_id, "cluster not found"))
    }

    async fn list_steps(&self, cluster_id: &str) -> IdleResult<Vec<StepSummary>> {
        if !self.clusters.contains_key(cluster_id) && !self.steps.contains_key(cluster_id) {
            return Err(IdleError::cluster_api(
                "list-steps",
                cluster_id,
                "cluster not found",
            ));
        }
        Ok(self.steps.get(cluster_id).cloned().unwrap_or_default())
    }
}
