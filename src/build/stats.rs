//! Aggregate statistics for dispatch runs

use serde::{Deserialize, Serialize};

use crate::build::dispatcher::EntryOutcome;

/// Summary of one dispatch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStatistics {
    /// Number of mapping entries attempted
    pub entry_count: usize,
    /// Entries whose tool invocation succeeded
    pub succeeded: usize,
    /// Entries whose tool invocation failed
    pub failed: usize,
    /// Total wall time across all invocations in milliseconds
    pub total_time_ms: u64,
    /// Average wall time per entry in milliseconds
    pub avg_time_per_entry_ms: f32,
    /// External compiler command used for the run
    pub tool: String,
    /// Timestamp of when statistics were collected
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

impl BuildStatistics {
    /// Collect statistics over a run's per-entry outcomes
    pub fn for_outcomes(tool: String, outcomes: &[EntryOutcome]) -> Self {
        let entry_count = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        let failed = entry_count - succeeded;
        let total_time_ms: u64 = outcomes
            .iter()
            .map(|o| o.duration.as_millis() as u64)
            .sum();
        let avg_time_per_entry_ms = if entry_count > 0 {
            total_time_ms as f32 / entry_count as f32
        } else {
            0.0
        };

        Self {
            entry_count,
            succeeded,
            failed,
            total_time_ms,
            avg_time_per_entry_ms,
            tool,
            collected_at: chrono::Utc::now(),
        }
    }
}
