// src/stage.rs

//! The command stage: the unit a pipeline runner configures and runs.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{execute, ExecutionRequest, ExecutionResult};
use crate::readiness::{wait, WaitSpec};

/// Accumulates configuration, then runs it with [`CommandStage::run`].
///
/// ```no_run
/// # async fn demo() -> cmdstage::errors::Result<()> {
/// use cmdstage::stage::CommandStage;
///
/// let mut stage = CommandStage::new();
/// stage.set_command_shell("bash").add_command("echo foobar");
/// assert!(stage.run().await?);
/// assert_eq!(stage.stdout_result(), "foobar\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandStage {
    directory: PathBuf,
    shell: Option<String>,
    commands: Vec<String>,
    wait_before: Option<WaitSpec>,
    wait_after: Option<WaitSpec>,
    last: Option<ExecutionResult>,
}

impl Default for CommandStage {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStage {
    /// Empty stage running in the process's current directory with the
    /// default shell.
    pub fn new() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            shell: None,
            commands: Vec::new(),
            wait_before: None,
            wait_after: None,
            last: None,
        }
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        self.directory = directory.into();
        self
    }

    /// Request a shell by name. Unavailable shells fall back to the default
    /// when the stage runs.
    pub fn set_command_shell(&mut self, shell: impl Into<String>) -> &mut Self {
        self.shell = Some(shell.into());
        self
    }

    pub fn add_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.commands.push(command.into());
        self
    }

    /// Wait for a condition before any command runs.
    pub fn set_wait_before(&mut self, spec: WaitSpec) -> &mut Self {
        self.wait_before = Some(spec);
        self
    }

    /// Wait for a condition after the commands succeeded.
    pub fn set_wait_after(&mut self, spec: WaitSpec) -> &mut Self {
        self.wait_after = Some(spec);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn command_shell(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Snapshot of the current configuration for the executor.
    pub fn request(&self) -> ExecutionRequest {
        ExecutionRequest {
            directory: self.directory.clone(),
            shell: self.shell.clone(),
            commands: self.commands.clone(),
        }
    }

    /// Run the stage and return whether the commands succeeded.
    ///
    /// A failing command is `Ok(false)`; only readiness timeouts are errors.
    /// The result of any earlier run is discarded first.
    pub async fn run(&mut self) -> Result<bool> {
        self.last = None;

        if let Some(spec) = &self.wait_before {
            wait(&spec.condition, spec.timeout, spec.interval).await?;
        }

        let result = execute(&self.request()).await;
        let success = result.success;
        self.last = Some(result);

        if !success {
            info!(directory = %self.directory.display(), "stage commands failed");
            return Ok(false);
        }

        if let Some(spec) = &self.wait_after {
            wait(&spec.condition, spec.timeout, spec.interval).await?;
        } else {
            debug!("no post-run readiness condition");
        }

        Ok(true)
    }

    /// Captured stdout of the most recent run as text; empty before the
    /// first run. Use [`CommandStage::stdout_bytes`] for the exact bytes.
    pub fn stdout_result(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.stdout_bytes())
    }

    pub fn stdout_bytes(&self) -> &[u8] {
        self.last.as_ref().map(|r| r.stdout.as_slice()).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.last.as_ref().is_some_and(|r| r.success)
    }

    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last.as_ref()
    }
}
