//! Wiring: pick collaborators from config, run one computation.

use std::sync::Arc;

use crate::adapters::{IntervalSource, LogArchiveAdapter, StepSourceAdapter};
use crate::cluster::{AwsCliClusterApi, ClusterApi, SnapshotClusterApi};
use crate::config::{AwsConfig, IdleConfig};
use crate::engine::IdleReport;
use crate::error::IdleResult;
use crate::model::SourceKind;
use crate::store::StoreOptions;

/// Saved responses when a snapshot directory is configured, the AWS CLI
/// otherwise.
pub fn cluster_api_from_config(aws: &AwsConfig) -> Arc<dyn ClusterApi> {
    match &aws.snapshot_dir {
        Some(dir) => Arc::new(SnapshotClusterApi::new(dir)),
        None => Arc::new(
            AwsCliClusterApi::new()
                .with_binary(aws.binary.clone())
                .with_region(aws.region.clone())
                .with_profile(aws.profile.clone()),
        ),
    }
}

pub fn interval_source(
    kind: SourceKind,
    api: Arc<dyn ClusterApi>,
    config: &IdleConfig,
) -> Box<dyn IntervalSource> {
    match kind {
        SourceKind::Steps => Box::new(StepSourceAdapter::new(api, &config.steps)),
        SourceKind::History => {
            let options = StoreOptions {
                region: config.aws.region.clone(),
                endpoint: config.history.endpoint.clone(),
            };
            Box::new(LogArchiveAdapter::new(api, config.history.clone(), options))
        }
    }
}

/// Ready time from the cluster API, intervals from `source`, folded.
pub async fn compute_cluster_idle(
    api: &dyn ClusterApi,
    source: &dyn IntervalSource,
    cluster_id: &str,
) -> IdleResult<IdleReport> {
    let cluster = api.describe_cluster(cluster_id).await?;
    let ready_at = cluster.require_ready_at()?;

    let timeline = source.list_work_intervals(cluster_id).await?;
    let intervals = timeline.into_chronological();

    let report = IdleReport::new(cluster_id, source.kind(), ready_at, intervals);

    let overlaps = report.idle.overlaps().count();
    if overlaps > 0 {
        tracing::warn!(
            cluster_id,
            overlaps,
            "work intervals overlap; idle time includes negative gaps"
        );
    }
    tracing::info!(
        cluster_id,
        source = %report.source,
        intervals = report.intervals.len(),
        idle_ms = report.idle_millis(),
        "idle time computed"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterDescription, InMemoryClusterApi, StepSummary};
    use crate::error::IdleError;

    fn step(id: &str, start: i64, end: i64) -> StepSummary {
        StepSummary {
            id: id.into(),
            name: id.into(),
            args: vec!["spark-submit".into(), "--class".into(), format!("{id}.Main")],
            state: "COMPLETED".into(),
            created_at: Some(start),
            started_at: Some(start),
            ended_at: Some(end),
        }
    }

    fn api(ready_at: Option<i64>, steps: Vec<StepSummary>) -> Arc<dyn ClusterApi> {
        Arc::new(
            InMemoryClusterApi::new()
                .with_cluster(ClusterDescription {
                    id: "j-1".into(),
                    name: "c".into(),
                    log_uri: None,
                    ready_at,
                })
                .with_steps("j-1", steps),
        )
    }

    #[tokio::test]
    async fn test_steps_are_folded_oldest_first() {
        // newest first, as the API returns them
        let api = api(Some(1_000), vec![step("b", 5_000, 6_000), step("a", 2_000, 3_000)]);
        let source = interval_source(SourceKind::Steps, api.clone(), &IdleConfig::default());

        let report = compute_cluster_idle(api.as_ref(), source.as_ref(), "j-1")
            .await
            .unwrap();
        assert_eq!(report.idle_millis(), 3_000);
        assert_eq!(report.intervals[0].id, "a");
        assert_eq!(report.source, SourceKind::Steps);
    }

    #[tokio::test]
    async fn test_overlap_surfaces_as_negative_total() {
        let api = api(Some(1_000), vec![step("b", 2_500, 4_000), step("a", 2_000, 3_000)]);
        let source = interval_source(SourceKind::Steps, api.clone(), &IdleConfig::default());

        let report = compute_cluster_idle(api.as_ref(), source.as_ref(), "j-1")
            .await
            .unwrap();
        // (2000 - 1000) + (2500 - 3000)
        assert_eq!(report.idle_millis(), 500);
        assert_eq!(report.idle.overlaps().count(), 1);
    }

    #[tokio::test]
    async fn test_no_steps_is_zero() {
        let api = api(Some(1_000), vec![]);
        let source = interval_source(SourceKind::Steps, api.clone(), &IdleConfig::default());
        let report = compute_cluster_idle(api.as_ref(), source.as_ref(), "j-1")
            .await
            .unwrap();
        assert_eq!(report.idle_millis(), 0);
    }

    #[tokio::test]
    async fn test_cluster_never_ready_is_fatal() {
        let api = api(None, vec![]);
        let source = interval_source(SourceKind::Steps, api.clone(), &IdleConfig::default());
        let err = compute_cluster_idle(api.as_ref(), source.as_ref(), "j-1")
            .await
            .unwrap_err();
        assert!(matches!(err, IdleError::MissingReadyTime { .. }));
    }

    #[test]
    fn test_source_kinds() {
        let api = api(Some(0), vec![]);
        let cfg = IdleConfig::default();
        assert_eq!(
            interval_source(SourceKind::History, api.clone(), &cfg).kind(),
            SourceKind::History
        );
        assert_eq!(
            interval_source(SourceKind::Steps, api, &cfg).kind(),
            SourceKind::Steps
        );
    }
}
