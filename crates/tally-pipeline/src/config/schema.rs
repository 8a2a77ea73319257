use serde::Deserialize;
use tally_core::error::{MetricsError, Result};

use crate::bootstrap::ProcessRole;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub version: u32,

    #[serde(default)]
    pub role: ProcessRole,

    #[serde(default)]
    pub ipc: IpcSection,

    #[serde(default)]
    pub buffers: BufferSection,

    #[serde(default)]
    pub scrape: ScrapeSection,

    #[serde(default)]
    pub app: AppSection,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }

        self.ipc.validate()?;
        self.buffers.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpcSection {
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

impl Default for IpcSection {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

impl IpcSection {
    pub fn validate(&self) -> Result<()> {
        if self.socket_path.trim().is_empty() {
            return Err(MetricsError::BadConfig("ipc.socket_path must not be empty".into()));
        }
        Ok(())
    }
}

/// Buffer capacities for one process role.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaneCapacities {
    pub priority: usize,
    pub important: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BufferSection {
    #[serde(default = "default_coordinator_lanes")]
    pub coordinator: LaneCapacities,

    #[serde(default = "default_worker_lanes")]
    pub worker: LaneCapacities,

    #[serde(default = "default_important_fallback_timeout_ms")]
    pub important_fallback_timeout_ms: u64,
}

impl Default for BufferSection {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator_lanes(),
            worker: default_worker_lanes(),
            important_fallback_timeout_ms: default_important_fallback_timeout_ms(),
        }
    }
}

impl BufferSection {
    pub fn validate(&self) -> Result<()> {
        for (name, lanes) in [("coordinator", self.coordinator), ("worker", self.worker)] {
            if lanes.priority == 0 || lanes.important == 0 {
                return Err(MetricsError::BadConfig(format!(
                    "buffers.{name} capacities must be >= 1"
                )));
            }
        }
        if !(1..=60000).contains(&self.important_fallback_timeout_ms) {
            return Err(MetricsError::BadConfig(
                "buffers.important_fallback_timeout_ms must be between 1 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn for_role(&self, role: ProcessRole) -> LaneCapacities {
        match role {
            ProcessRole::Coordinator => self.coordinator,
            ProcessRole::Worker => self.worker,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScrapeSection {
    #[serde(default = "default_scrape_listen")]
    pub listen: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            listen: default_scrape_listen(),
        }
    }
}

/// Optional instrumented application surface.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    #[serde(default)]
    pub listen: Option<String>,
}

fn default_socket_path() -> String {
    "/tmp/metrics.sock".into()
}
fn default_coordinator_lanes() -> LaneCapacities {
    LaneCapacities {
        priority: 200,
        important: 400,
    }
}
fn default_worker_lanes() -> LaneCapacities {
    LaneCapacities {
        priority: 20,
        important: 40,
    }
}
fn default_important_fallback_timeout_ms() -> u64 {
    5000
}
fn default_scrape_listen() -> String {
    "0.0.0.0:9000".into()
}
