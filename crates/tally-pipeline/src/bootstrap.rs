//! Process roles and which half of the pipeline each one runs.
//!
//! - `Coordinator`: binds the IPC socket, owns the aggregator, serves
//!   `/metrics`, and may emit its own deltas through a large buffer.
//! - `Worker`: emits only, through small buffers drained by a single task.

use std::str::FromStr;

use serde::Deserialize;
use tally_core::error::MetricsError;

/// Environment variable that overrides the configured role.
pub const ROLE_ENV: &str = "TALLY_ROLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessRole {
    #[default]
    Coordinator,
    Worker,
}

impl ProcessRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessRole::Coordinator => "coordinator",
            ProcessRole::Worker => "worker",
        }
    }

    /// Drain tasks per buffer lane.
    pub fn worker_count(self) -> usize {
        match self {
            ProcessRole::Coordinator => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                (cpus / 2).max(1)
            }
            ProcessRole::Worker => 1,
        }
    }

    /// Whether this role binds the IPC socket and serves scrapes.
    pub fn runs_collector(self) -> bool {
        matches!(self, ProcessRole::Coordinator)
    }

    /// Resolve the role: `TALLY_ROLE` wins over the config file.
    pub fn resolve(configured: ProcessRole) -> Result<ProcessRole, MetricsError> {
        match std::env::var(ROLE_ENV) {
            Ok(v) if !v.trim().is_empty() => v.parse(),
            _ => Ok(configured),
        }
    }
}

impl FromStr for ProcessRole {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coordinator" => Ok(ProcessRole::Coordinator),
            "worker" => Ok(ProcessRole::Worker),
            other => Err(MetricsError::BadConfig(format!("unknown process role: {other}"))),
        }
    }
}
