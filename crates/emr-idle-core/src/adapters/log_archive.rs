//! Work intervals from MapReduce job history files.
//!
//! For clusters used as a plain YARN cluster (spark-submit or hadoop jar
//! from the master node) nothing shows up as a step; the job history
//! server's "done" files in the log archive are the only record:
//!
//! ```text
//! {log_uri}/{cluster_id}/hadoop-mapreduce/history/{YYYY}/{MM}/{DD}/000000/*.jhist.gz
//! ```
//!
//! Only the partition of the day the cluster became ready is read, and each
//! history file contributes exactly one interval.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::IntervalSource;
use crate::cluster::{ClusterApi, ClusterDescription};
use crate::config::HistoryConfig;
use crate::error::{IdleError, IdleResult};
use crate::history::reduce_history;
use crate::model::{DiscoveryOrder, SourceKind, Timeline};
use crate::store::{LogArchive, StoreOptions};

/// Partition path relative to the log URI.
pub fn history_partition(cluster_id: &str, ready_at: DateTime<Utc>) -> String {
    format!(
        "{}/hadoop-mapreduce/history/{}/000000",
        cluster_id.trim_matches('/'),
        ready_at.format("%Y/%m/%d")
    )
}

pub struct LogArchiveAdapter {
    api: Arc<dyn ClusterApi>,
    config: HistoryConfig,
    store_options: StoreOptions,
    archive: Option<LogArchive>,
}

impl LogArchiveAdapter {
    pub fn new(api: Arc<dyn ClusterApi>, config: HistoryConfig, store_options: StoreOptions) -> Self {
        Self {
            api,
            config,
            store_options,
            archive: None,
        }
    }

    /// Read from `archive` instead of opening the cluster's log URI.
    pub fn with_archive(mut self, archive: LogArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Intervals for an already described cluster, oldest first.
    pub async fn intervals_for(&self, cluster: &ClusterDescription) -> IdleResult<Timeline> {
        let ready_ms = cluster.require_ready_at()?;
        let ready_at = DateTime::<Utc>::from_timestamp_millis(ready_ms).ok_or_else(|| {
            IdleError::malformed(
                "describe-cluster",
                &cluster.id,
                format!("ready timestamp {} is out of range", ready_ms),
            )
        })?;

        let opened;
        let archive = match &self.archive {
            Some(archive) => archive,
            None => {
                let log_uri = cluster.require_log_uri()?;
                opened = LogArchive::from_uri(log_uri, &self.store_options)?;
                &opened
            }
        };

        let throttle = self.config.throttle();
        if !throttle.is_zero() {
            tracing::debug!(delay_ms = self.config.throttle_ms, "throttling before log archive access");
            tokio::time::sleep(throttle).await;
        }

        let prefix = archive
            .spec()
            .key(&history_partition(&cluster.id, ready_at));
        tracing::info!(cluster_id = %cluster.id, prefix = %prefix, "reading job history partition");

        let objects = archive.list_leaf_objects(&prefix).await?;
        let mut intervals = Vec::new();

        for object in objects
            .iter()
            .filter(|o| o.key.ends_with(&self.config.file_suffix))
        {
            let acc = {
                let reader = archive.open_decompressed(&object.key).await?;
                reduce_history(reader, &object.key)
            };

            if !acc.is_complete() {
                tracing::warn!(
                    file = %object.key,
                    submitted = acc.start.is_some(),
                    finished = acc.end.is_some(),
                    policy = ?self.config.unset_timestamps,
                    "job history file lacks a submit or finish time"
                );
            }

            match acc.into_interval(self.config.unset_timestamps) {
                Some(interval) => {
                    tracing::info!(
                        cluster_id = %cluster.id,
                        job_id = %interval.id,
                        label = %interval.label,
                        start = interval.start,
                        end = interval.end,
                        "found job"
                    );
                    intervals.push(interval);
                }
                None => tracing::debug!(file = %object.key, "skipping incomplete job"),
            }
        }

        Ok(Timeline::new(self.discovery_order(), intervals))
    }
}

#[async_trait]
impl IntervalSource for LogArchiveAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::History
    }

    fn discovery_order(&self) -> DiscoveryOrder {
        DiscoveryOrder::OldestFirst
    }

    async fn list_work_intervals(&self, cluster_id: &str) -> IdleResult<Timeline> {
        tracing::info!(cluster_id, "querying job history logs");
        let cluster = self.api.describe_cluster(cluster_id).await?;
        self.intervals_for(&cluster).await
    }
}
