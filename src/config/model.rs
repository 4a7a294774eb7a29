// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::readiness::WaitSpec;
use crate::types::{HumanDuration, DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT};

/// Pipeline file exactly as deserialized from TOML.
///
/// ```toml
/// [config]
/// wait_timeout = "30s"
/// wait_interval = "500ms"
///
/// [[stage]]
/// name = "start solr"
/// shell = "bash"
/// commands = ["./bin/solr start"]
/// wait_for_after = "host=localhost port=8983 state=ready"
/// ```
///
/// Turn it into a [`PipelineFile`] with `PipelineFile::try_from`, which
/// validates every stage.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPipelineFile {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Stages from `[[stage]]`, in execution order.
    #[serde(default)]
    pub stage: Vec<RawStageConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Default readiness time budget for every stage.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: HumanDuration,

    /// Default pause between readiness probes.
    #[serde(default = "default_wait_interval")]
    pub wait_interval: HumanDuration,
}

fn default_wait_timeout() -> HumanDuration {
    HumanDuration(DEFAULT_WAIT_TIMEOUT)
}

fn default_wait_interval() -> HumanDuration {
    HumanDuration(DEFAULT_WAIT_INTERVAL)
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            wait_timeout: default_wait_timeout(),
            wait_interval: default_wait_interval(),
        }
    }
}

/// One `[[stage]]` entry.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStageConfig {
    pub name: String,

    /// Working directory. Relative paths are resolved against the directory
    /// holding the pipeline file.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Shell name (e.g. `"bash"`); unknown shells fall back to `sh`.
    #[serde(default)]
    pub shell: Option<String>,

    #[serde(default)]
    pub commands: Vec<String>,

    /// Readiness spec to wait for before running the commands.
    #[serde(default)]
    pub wait_for: Option<String>,

    /// Readiness spec to wait for after the commands succeeded.
    #[serde(default)]
    pub wait_for_after: Option<String>,

    /// Per-stage override of `[config].wait_timeout`.
    #[serde(default)]
    pub wait_timeout: Option<HumanDuration>,

    /// Per-stage override of `[config].wait_interval`.
    #[serde(default)]
    pub wait_interval: Option<HumanDuration>,
}

/// A validated pipeline file.
#[derive(Debug, Clone)]
pub struct PipelineFile {
    pub config: ConfigSection,
    pub stages: Vec<StageConfig>,
}

impl PipelineFile {
    pub(crate) fn new_unchecked(config: ConfigSection, stages: Vec<StageConfig>) -> Self {
        Self { config, stages }
    }

    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// A validated stage with its readiness specs already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub name: String,
    pub directory: Option<PathBuf>,
    pub shell: Option<String>,
    pub commands: Vec<String>,
    pub wait_before: Option<WaitSpec>,
    pub wait_after: Option<WaitSpec>,
}
