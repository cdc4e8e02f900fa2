//! JSON shapes of `aws emr describe-cluster` and `aws emr list-steps`.
//!
//! Only the fields the idle computation reads are modelled. Timestamps
//! come out of AWS CLI v1 as epoch seconds (`1577836800.123`) and out of
//! v2 as RFC 3339 strings (`2020-01-01T00:00:00.123000+00:00`); both are
//! accepted.

use chrono::DateTime;
use serde::Deserialize;

use super::{ClusterDescription, StepSummary};
use crate::error::{IdleError, IdleResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTimestamp {
    Seconds(f64),
    Text(String),
}

impl RawTimestamp {
    fn to_millis(&self) -> Result<i64, String> {
        match self {
            Self::Seconds(secs) => Ok((secs * 1000.0).round() as i64),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| format!("invalid timestamp '{}': {}", text, e)),
        }
    }
}

fn millis(raw: &Option<RawTimestamp>) -> Result<Option<i64>, String> {
    raw.as_ref().map(RawTimestamp::to_millis).transpose()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeClusterOutput {
    pub cluster: WireCluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireCluster {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub log_uri: Option<String>,
    pub status: WireClusterStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireClusterStatus {
    #[serde(default)]
    pub timeline: WireClusterTimeline,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireClusterTimeline {
    pub ready_date_time: Option<RawTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ListStepsOutput {
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireStep {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: WireStepConfig,
    pub status: WireStepStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireStepConfig {
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireStepStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub timeline: WireStepTimeline,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireStepTimeline {
    pub creation_date_time: Option<RawTimestamp>,
    pub start_date_time: Option<RawTimestamp>,
    pub end_date_time: Option<RawTimestamp>,
}

/// Decode `describe-cluster` output.
pub(crate) fn parse_describe_cluster(cluster_id: &str, json: &str) -> IdleResult<ClusterDescription> {
    let out: DescribeClusterOutput = serde_json::from_str(json)
        .map_err(|e| IdleError::malformed("describe-cluster", cluster_id, e.to_string()))?;
    let cluster = out.cluster;

    let ready_at = millis(&cluster.status.timeline.ready_date_time)
        .map_err(|e| IdleError::malformed("describe-cluster", cluster_id, e))?;

    Ok(ClusterDescription {
        id: cluster.id.unwrap_or_else(|| cluster_id.to_string()),
        name: cluster.name,
        log_uri: cluster.log_uri,
        ready_at,
    })
}

/// Decode `list-steps` output, keeping the API's newest-first order.
pub(crate) fn parse_list_steps(cluster_id: &str, json: &str) -> IdleResult<Vec<StepSummary>> {
    let out: ListStepsOutput = serde_json::from_str(json)
        .map_err(|e| IdleError::malformed("list-steps", cluster_id, e.to_string()))?;

    out.steps
        .into_iter()
        .map(|step| {
            let timeline = &step.status.timeline;
            let convert = |raw: &Option<RawTimestamp>| {
                millis(raw).map_err(|e| IdleError::malformed("list-steps", cluster_id, e))
            };
            Ok(StepSummary {
                created_at: convert(&timeline.creation_date_time)?,
                started_at: convert(&timeline.start_date_time)?,
                ended_at: convert(&timeline.end_date_time)?,
                id: step.id,
                name: step.name,
                args: step.config.args,
                state: step.status.state,
            })
        })
        .collect()
}
