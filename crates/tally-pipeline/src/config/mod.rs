//! Pipeline config loader (strict parsing).

pub mod schema;

use std::fs;

use tally_core::error::{MetricsError, Result};

pub use schema::{
    AppSection, BufferSection, IpcSection, LaneCapacities, PipelineConfig, ScrapeSection,
};

pub fn load_from_file(path: &str) -> Result<PipelineConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::BadConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<PipelineConfig> {
    let cfg: PipelineConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
