//! Object key planning: time partitions and leaf file names

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Time window a stream's files are partitioned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPolicy {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl PartitionPolicy {
    /// Resolve a policy from its reference-table name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Hourly" => Some(Self::Hourly),
            "Daily" => Some(Self::Daily),
            "Weekly" => Some(Self::Weekly),
            "Monthly" => Some(Self::Monthly),
            "Quarterly" => Some(Self::Quarterly),
            _ => None,
        }
    }
}

/// Computes partition sub-paths and unique leaf file names
///
/// Leaf names embed the wall-clock nanosecond plus a per-planner sequence
/// number, so two files planned within the same nanosecond still differ.
#[derive(Debug, Default)]
pub struct PathPlanner {
    sequence: AtomicU64,
}

impl PathPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// The time-bucket segment of the object key
    pub fn partition_bucket(policy: PartitionPolicy, at: DateTime<Utc>) -> String {
        match policy {
            PartitionPolicy::Hourly => at.format("%Y-%m-%d-%H").to_string(),
            PartitionPolicy::Daily => at.format("%Y-%m-%d").to_string(),
            PartitionPolicy::Weekly => {
                let iso = at.iso_week();
                format!("{}-W{}", iso.year(), iso.week())
            }
            PartitionPolicy::Monthly => at.format("%Y-%m").to_string(),
            PartitionPolicy::Quarterly => {
                let quarter = (at.month() + 2) / 3;
                format!("{}-Q{}", at.year(), quarter)
            }
        }
    }

    /// Unique leaf file name: `YYYYMMDD_HHMMSS<nanos><seq>.parquet`
    pub fn leaf_file_name(&self, at: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) % 10_000;
        format!(
            "{}_{}{:09}{:04}.parquet",
            at.format("%Y%m%d"),
            at.format("%H%M%S"),
            at.nanosecond() % 1_000_000_000,
            seq
        )
    }

    /// Full object key: `[folder/]<messageType>/<bucket>/<leaf>`
    pub fn object_key(
        &self,
        message_type: &str,
        folder_name: &str,
        policy: PartitionPolicy,
        at: DateTime<Utc>,
    ) -> String {
        let bucket = Self::partition_bucket(policy, at);
        let leaf = self.leaf_file_name(at);
        if folder_name.is_empty() {
            format!("{message_type}/{bucket}/{leaf}")
        } else {
            format!("{folder_name}/{message_type}/{bucket}/{leaf}")
        }
    }
}
