// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigSection, PipelineFile, RawPipelineFile, RawStageConfig, StageConfig};
use crate::errors::{CmdStageError, Result};
use crate::readiness::{ReadinessCondition, WaitSpec};

impl TryFrom<RawPipelineFile> for PipelineFile {
    type Error = crate::errors::CmdStageError;

    fn try_from(raw: RawPipelineFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_stages(&raw)?;
        validate_global_config(&raw.config)?;
        validate_stage_names(&raw)?;

        let stages = raw
            .stage
            .iter()
            .map(|stage| validate_stage(&raw.config, stage))
            .collect::<Result<Vec<_>>>()?;

        Ok(PipelineFile::new_unchecked(raw.config, stages))
    }
}

fn ensure_has_stages(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.stage.is_empty() {
        return Err(CmdStageError::ConfigError(
            "pipeline must contain at least one [[stage]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &ConfigSection) -> Result<()> {
    if cfg.wait_timeout.as_duration().is_zero() {
        return Err(CmdStageError::ConfigError(
            "[config].wait_timeout must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_stage_names(cfg: &RawPipelineFile) -> Result<()> {
    let mut seen = HashSet::new();
    for stage in cfg.stage.iter() {
        if stage.name.trim().is_empty() {
            return Err(CmdStageError::ConfigError(
                "every [[stage]] needs a non-empty `name`".to_string(),
            ));
        }
        if !seen.insert(stage.name.as_str()) {
            return Err(CmdStageError::ConfigError(format!(
                "duplicate stage name '{}'",
                stage.name
            )));
        }
    }
    Ok(())
}

fn validate_stage(global: &ConfigSection, stage: &RawStageConfig) -> Result<StageConfig> {
    if stage.commands.is_empty() && stage.wait_for.is_none() && stage.wait_for_after.is_none() {
        return Err(CmdStageError::ConfigError(format!(
            "stage '{}' has neither `commands` nor a `wait_for` condition",
            stage.name
        )));
    }

    let timeout = stage.wait_timeout.unwrap_or(global.wait_timeout).as_duration();
    let interval = stage.wait_interval.unwrap_or(global.wait_interval).as_duration();
    if timeout.is_zero() {
        return Err(CmdStageError::ConfigError(format!(
            "stage '{}': wait_timeout must be greater than 0",
            stage.name
        )));
    }

    let wait_spec = |field: &str, raw: Option<&String>| -> Result<Option<WaitSpec>> {
        raw.map(|spec| {
            ReadinessCondition::parse(spec)
                .map(|condition| {
                    WaitSpec::new(condition)
                        .with_timeout(timeout)
                        .with_interval(interval)
                })
                .map_err(|e| {
                    CmdStageError::ConfigError(format!(
                        "stage '{}': invalid `{}` condition '{}': {}",
                        stage.name, field, spec, e
                    ))
                })
        })
        .transpose()
    };

    Ok(StageConfig {
        name: stage.name.clone(),
        directory: stage.directory.clone(),
        shell: stage.shell.clone(),
        commands: stage.commands.clone(),
        wait_before: wait_spec("wait_for", stage.wait_for.as_ref())?,
        wait_after: wait_spec("wait_for_after", stage.wait_for_after.as_ref())?,
    })
}
