//! Work intervals from the cluster's step listing.
//!
//! Only steps that name an executable count as user work: the argument
//! following a marker token (`--class` for `spark-submit`, `-i` for
//! interactive scripts) becomes the label. Bootstrap and debugging steps
//! carry no marker and are dropped.

use std::sync::Arc;

use async_trait::async_trait;

use super::IntervalSource;
use crate::cluster::{ClusterApi, StepSummary};
use crate::config::StepsConfig;
use crate::error::{IdleError, IdleResult};
use crate::model::{DiscoveryOrder, SourceKind, Timeline, WorkInterval};

pub struct StepSourceAdapter {
    api: Arc<dyn ClusterApi>,
    markers: Vec<String>,
}

impl StepSourceAdapter {
    pub fn new(api: Arc<dyn ClusterApi>, config: &StepsConfig) -> Self {
        Self {
            api,
            markers: config.markers.clone(),
        }
    }

    /// Token after the first marker, if there is one.
    pub fn find_label<'a>(&self, args: &'a [String]) -> Option<&'a str> {
        let marker_at = args
            .iter()
            .position(|arg| self.markers.iter().any(|m| m == arg))?;
        args.get(marker_at + 1).map(String::as_str)
    }

    /// Project a step into a work interval; `None` for non-user steps.
    pub fn project(&self, step: &StepSummary) -> IdleResult<Option<WorkInterval>> {
        let Some(label) = self.find_label(&step.args) else {
            tracing::debug!(step_id = %step.id, name = %step.name, "dropping step without executable marker");
            return Ok(None);
        };

        let require = |value: Option<i64>, field: &'static str| {
            value.ok_or_else(|| IdleError::MalformedStep {
                step_id: step.id.clone(),
                field,
            })
        };
        let created_at = require(step.created_at, "creation")?;
        let start = require(step.started_at, "start")?;
        let end = require(step.ended_at, "end")?;

        Ok(Some(WorkInterval::accepted_at(
            step.id.clone(),
            label,
            created_at,
            start,
            end,
        )))
    }
}

#[async_trait]
impl IntervalSource for StepSourceAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Steps
    }

    fn discovery_order(&self) -> DiscoveryOrder {
        DiscoveryOrder::NewestFirst
    }

    async fn list_work_intervals(&self, cluster_id: &str) -> IdleResult<Timeline> {
        tracing::info!(cluster_id, "querying cluster steps");

        let steps = self.api.list_steps(cluster_id).await?;
        let mut intervals = Vec::with_capacity(steps.len());

        for step in &steps {
            if let Some(interval) = self.project(step)? {
                tracing::info!(
                    cluster_id,
                    step_id = %interval.id,
                    label = %interval.label,
                    start = interval.start,
                    end = interval.end,
                    duration_ms = interval.duration,
                    "found step"
                );
                intervals.push(interval);
            }
        }

        tracing::debug!(
            cluster_id,
            listed = steps.len(),
            kept = intervals.len(),
            "step listing reduced"
        );
        Ok(Timeline::new(self.discovery_order(), intervals))
    }
}
