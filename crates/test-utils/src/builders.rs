#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use cmdstage::config::{ConfigSection, PipelineFile, RawPipelineFile, RawStageConfig};
use cmdstage::errors::Result;
use cmdstage::types::HumanDuration;

/// Builder for `RawPipelineFile` to simplify test setup.
pub struct PipelineBuilder {
    config: RawPipelineFile,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: RawPipelineFile {
                config: ConfigSection::default(),
                stage: Vec::new(),
            },
        }
    }

    pub fn with_stage(mut self, stage: RawStageConfig) -> Self {
        self.config.stage.push(stage);
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.config.wait_timeout = HumanDuration(timeout);
        self
    }

    pub fn with_wait_interval(mut self, interval: Duration) -> Self {
        self.config.config.wait_interval = HumanDuration(interval);
        self
    }

    pub fn raw(self) -> RawPipelineFile {
        self.config
    }

    pub fn try_build(self) -> Result<PipelineFile> {
        PipelineFile::try_from(self.config)
    }

    pub fn build(self) -> PipelineFile {
        self.try_build()
            .expect("Failed to build valid pipeline from builder")
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RawStageConfig`.
pub struct StageBuilder {
    stage: RawStageConfig,
}

impl StageBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            stage: RawStageConfig {
                name: name.to_string(),
                ..RawStageConfig::default()
            },
        }
    }

    pub fn command(mut self, cmd: &str) -> Self {
        self.stage.commands.push(cmd.to_string());
        self
    }

    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stage.directory = Some(dir.into());
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.stage.shell = Some(shell.to_string());
        self
    }

    pub fn wait_for(mut self, spec: &str) -> Self {
        self.stage.wait_for = Some(spec.to_string());
        self
    }

    pub fn wait_for_after(mut self, spec: &str) -> Self {
        self.stage.wait_for_after = Some(spec.to_string());
        self
    }

    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.stage.wait_timeout = Some(HumanDuration(timeout));
        self
    }

    pub fn wait_interval(mut self, interval: Duration) -> Self {
        self.stage.wait_interval = Some(HumanDuration(interval));
        self
    }

    pub fn build(self) -> RawStageConfig {
        self.stage
    }
}
