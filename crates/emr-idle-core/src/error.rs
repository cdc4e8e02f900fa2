//! Error types for idle-time computation.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for idle-time operations.
pub type IdleResult<T> = Result<T, IdleError>;

/// Errors that abort an idle-time computation.
///
/// Recoverable conditions (a malformed history line, a step without a
/// marker token) never surface here; adapters log and skip them.
#[derive(Debug, Error)]
pub enum IdleError {
    /// The cluster API could not be reached or returned a failure.
    #[error("cluster API call '{call}' failed for {cluster_id}: {message}")]
    ClusterApi {
        call: &'static str,
        cluster_id: String,
        message: String,
    },

    /// The cluster API answered with a document we cannot interpret.
    #[error("malformed {call} response for {cluster_id}: {reason}")]
    MalformedResponse {
        call: &'static str,
        cluster_id: String,
        reason: String,
    },

    /// The cluster description carries no ready timestamp.
    #[error("cluster {cluster_id} has no ready timestamp")]
    MissingReadyTime { cluster_id: String },

    /// The cluster description carries no log URI (history source only).
    #[error("cluster {cluster_id} has no log URI; job history is unavailable")]
    MissingLogUri { cluster_id: String },

    /// A step that carries user work is missing a timeline field.
    #[error("step {step_id} is missing its {field} timestamp")]
    MalformedStep { step_id: String, field: &'static str },

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// Log archive failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdleError {
    pub(crate) fn cluster_api(
        call: &'static str,
        cluster_id: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::ClusterApi {
            call,
            cluster_id: cluster_id.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(call: &'static str, cluster_id: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            call,
            cluster_id: cluster_id.to_string(),
            reason: reason.into(),
        }
    }
}
