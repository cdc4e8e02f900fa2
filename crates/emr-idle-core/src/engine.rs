//! Idle-time fold.
//!
//! Idle time is the sum of the gaps between "previous work finished" (or
//! the cluster became ready, for the first gap) and "next work started".
//! The fold is unconditional: overlapping or out-of-order work yields
//! negative gaps, and those are summed as-is so the data-quality problem
//! stays visible in the total. Arithmetic wraps rather than panics, so a
//! nonsensical timestamp in one record cannot abort the computation.

use serde::Serialize;

use crate::model::{ClusterReadyTime, SourceKind, WorkInterval};

/// Total idle milliseconds for `intervals`, which must be oldest-first.
pub fn compute_idle_time(ready: ClusterReadyTime, intervals: &[WorkInterval]) -> i64 {
    let mut previous_end = ready;
    let mut idle = 0i64;
    for interval in intervals {
        idle = idle.wrapping_add(interval.start.wrapping_sub(previous_end));
        previous_end = interval.end;
    }
    idle
}

/// One term of the idle fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gap {
    /// Interval that ended the previous busy period; `None` for the gap
    /// that starts at cluster readiness.
    pub before_id: Option<String>,
    pub after_id: String,
    pub from: i64,
    pub to: i64,
    pub millis: i64,
}

impl Gap {
    pub fn is_overlap(&self) -> bool {
        self.millis < 0
    }
}

/// The idle fold with every gap kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdleBreakdown {
    pub total: i64,
    pub gaps: Vec<Gap>,
}

impl IdleBreakdown {
    /// Gaps with negative duration: overlapping or out-of-order records.
    pub fn overlaps(&self) -> impl Iterator<Item = &Gap> {
        self.gaps.iter().filter(|g| g.is_overlap())
    }
}

/// Same fold as [`compute_idle_time`], keeping each gap.
pub fn idle_breakdown(ready: ClusterReadyTime, intervals: &[WorkInterval]) -> IdleBreakdown {
    let mut previous_end = ready;
    let mut previous_id: Option<&str> = None;
    let mut gaps = Vec::with_capacity(intervals.len());

    for interval in intervals {
        gaps.push(Gap {
            before_id: previous_id.map(str::to_string),
            after_id: interval.id.clone(),
            from: previous_end,
            to: interval.start,
            millis: interval.start.wrapping_sub(previous_end),
        });
        previous_end = interval.end;
        previous_id = Some(interval.id.as_str());
    }

    IdleBreakdown {
        total: gaps.iter().fold(0i64, |acc, g| acc.wrapping_add(g.millis)),
        gaps,
    }
}

/// Everything one computation produced.
#[derive(Debug, Clone, Serialize)]
pub struct IdleReport {
    pub cluster_id: String,
    pub source: SourceKind,
    pub ready_at: ClusterReadyTime,
    /// Oldest-first.
    pub intervals: Vec<WorkInterval>,
    pub idle: IdleBreakdown,
}

impl IdleReport {
    pub fn new(
        cluster_id: impl Into<String>,
        source: SourceKind,
        ready_at: ClusterReadyTime,
        intervals: Vec<WorkInterval>,
    ) -> Self {
        let idle = idle_breakdown(ready_at, &intervals);
        Self {
            cluster_id: cluster_id.into(),
            source,
            ready_at,
            intervals,
            idle,
        }
    }

    pub fn idle_millis(&self) -> i64 {
        self.idle.total
    }
}
