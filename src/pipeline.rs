// src/pipeline.rs

//! Minimal sequential runner over the stages of a pipeline file.
//!
//! Stages run in file order; the first failing stage stops the pipeline.

use std::path::Path;

use tracing::{info, warn};

use crate::config::{PipelineFile, StageConfig};
use crate::errors::{CmdStageError, Result, WaitError};
use crate::stage::CommandStage;

/// What one stage produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Raw stdout bytes of the stage's commands.
    pub stdout: Vec<u8>,
}

/// Reports of every stage that ran, in order. The last one is the failing
/// stage if the pipeline stopped early.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub reports: Vec<StageReport>,
    /// Set when the last stage stopped on a readiness timeout.
    pub wait_error: Option<WaitError>,
}

impl PipelineOutcome {
    pub fn failed_stage(&self) -> Option<&StageReport> {
        self.reports.iter().find(|r| !r.success)
    }

    /// `Ok` if every stage succeeded. A readiness timeout becomes
    /// [`CmdStageError::Wait`], failed commands [`CmdStageError::StageFailed`].
    pub fn into_result(self) -> Result<Vec<StageReport>> {
        if let Some(err) = self.wait_error {
            return Err(err.into());
        }
        match self.failed_stage() {
            Some(failed) => Err(CmdStageError::StageFailed {
                stage: failed.name.clone(),
                exit_code: failed.exit_code,
            }),
            None => Ok(self.reports),
        }
    }
}

/// Build a [`CommandStage`] from its config. Relative directories are
/// resolved against `base_dir`.
pub fn build_stage(cfg: &StageConfig, base_dir: &Path) -> CommandStage {
    let mut stage = CommandStage::new();
    stage.set_directory(match &cfg.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => base_dir.join(dir),
        None => base_dir.to_path_buf(),
    });
    if let Some(shell) = &cfg.shell {
        stage.set_command_shell(shell.clone());
    }
    for command in &cfg.commands {
        stage.add_command(command.clone());
    }
    if let Some(spec) = &cfg.wait_before {
        stage.set_wait_before(spec.clone());
    }
    if let Some(spec) = &cfg.wait_after {
        stage.set_wait_after(spec.clone());
    }
    stage
}

/// Run the pipeline's stages (or only the stage named `only`).
///
/// A stage whose commands fail, or whose readiness wait times out, ends the
/// run and is the last report. Earlier reports are kept either way.
pub async fn run_pipeline(
    pipeline: &PipelineFile,
    base_dir: &Path,
    only: Option<&str>,
) -> Result<PipelineOutcome> {
    let selected: Vec<&StageConfig> = match only {
        Some(name) => vec![pipeline.stage(name).ok_or_else(|| {
            CmdStageError::ConfigError(format!("no stage named '{name}' in pipeline"))
        })?],
        None => pipeline.stages.iter().collect(),
    };

    let mut outcome = PipelineOutcome::default();
    for cfg in selected {
        info!(stage = %cfg.name, commands = cfg.commands.len(), "running stage");

        let mut stage = build_stage(cfg, base_dir);
        let (success, wait_error) = match stage.run().await {
            Ok(success) => (success, None),
            Err(CmdStageError::Wait(err)) => (false, Some(err)),
            Err(other) => return Err(other),
        };
        let exit_code = stage.last_result().and_then(|r| r.exit_code);

        outcome.reports.push(StageReport {
            name: cfg.name.clone(),
            success,
            exit_code,
            stdout: stage.stdout_bytes().to_vec(),
        });

        if let Some(err) = wait_error {
            warn!(stage = %cfg.name, error = %err, "readiness wait failed; stopping pipeline");
            outcome.wait_error = Some(err);
            break;
        }
        if !success {
            warn!(stage = %cfg.name, exit_code = ?exit_code, "stage failed; stopping pipeline");
            break;
        }
        info!(stage = %cfg.name, "stage finished");
    }

    Ok(outcome)
}
