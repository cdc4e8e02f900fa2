//! Shared data model: work intervals and the timelines adapters produce.

use serde::{Deserialize, Serialize};

/// Epoch milliseconds at which a cluster became ready to run work.
pub type ClusterReadyTime = i64;

/// One unit of executed work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Unique within its source, not globally.
    pub id: String,
    /// Executable, class or job name. Empty when unrecoverable.
    pub label: String,
    /// Epoch millis.
    pub start: i64,
    /// Epoch millis. Expected to be `>= start` but never enforced.
    pub end: i64,
    /// `end - start` for job history, `end - created_at` for steps.
    /// Wraps on overflow, like every other subtraction on timestamps.
    pub duration: i64,
}

impl WorkInterval {
    /// Interval whose duration is simply `end - start`.
    pub fn new(id: impl Into<String>, label: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start,
            end,
            duration: end.wrapping_sub(start),
        }
    }

    /// Interval whose duration is measured from when the work was accepted,
    /// so queueing delay is counted.
    pub fn accepted_at(
        id: impl Into<String>,
        label: impl Into<String>,
        created_at: i64,
        start: i64,
        end: i64,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start,
            end,
            duration: end.wrapping_sub(created_at),
        }
    }
}

/// Order in which a source hands back its intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryOrder {
    OldestFirst,
    NewestFirst,
}

/// Intervals as discovered, tagged with their native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub order: DiscoveryOrder,
    pub intervals: Vec<WorkInterval>,
}

impl Timeline {
    pub fn new(order: DiscoveryOrder, intervals: Vec<WorkInterval>) -> Self {
        Self { order, intervals }
    }

    /// Intervals oldest-first, which is what the idle fold consumes.
    pub fn into_chronological(self) -> Vec<WorkInterval> {
        let mut intervals = self.intervals;
        if self.order == DiscoveryOrder::NewestFirst {
            intervals.reverse();
        }
        intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Which source the intervals were reconstructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Steps submitted through the cluster API.
    #[default]
    Steps,
    /// MapReduce job history files in the cluster's log archive.
    History,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Steps => f.write_str("steps"),
            Self::History => f.write_str("history"),
        }
    }
}
