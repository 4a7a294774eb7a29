// src/exec/executor.rs

//! Stateless command executor.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::exec::shell::{resolve_shell, ResolvedShell};
use crate::fs::{FileSystem, RealFileSystem};

/// Everything needed to run a stage's commands. Built by
/// [`crate::stage::CommandStage`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub directory: PathBuf,
    /// Requested shell name; `None` means the default shell.
    pub shell: Option<String>,
    /// Commands in execution order.
    pub commands: Vec<String>,
}

impl ExecutionRequest {
    /// Join the commands into the single script handed to the shell.
    ///
    /// Operators such as `&&` and trailing `\` continuations are kept as
    /// written. The first command that exits non-zero ends the script: POSIX
    /// shells get `set -e` ahead of the newline-joined lines, `cmd` chains
    /// with `&&`.
    pub fn script_for(&self, shell: &ResolvedShell) -> String {
        if shell.flag == "/C" {
            return self.commands.join(" && ");
        }
        let mut script = String::from("set -e\n");
        script.push_str(&self.commands.join("\n"));
        script
    }
}

/// Outcome of one run. Only stdout is kept; stderr goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// Exactly the bytes the shell wrote to stdout.
    pub stdout: Vec<u8>,
    pub success: bool,
    /// `None` if the shell never started or was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    fn noop() -> Self {
        Self {
            stdout: Vec::new(),
            success: true,
            exit_code: Some(0),
        }
    }

    fn not_started() -> Self {
        Self {
            stdout: Vec::new(),
            success: false,
            exit_code: None,
        }
    }
}

/// Run the request against the real filesystem and the process's `PATH`.
pub async fn execute(request: &ExecutionRequest) -> ExecutionResult {
    let path_env = std::env::var_os("PATH");
    execute_with(&RealFileSystem, request, path_env.as_deref()).await
}

/// Run the request, resolving the shell against `path_env` through `fs`.
///
/// Never returns an error: anything that prevents the shell from running is
/// logged and reported as a failed result.
pub async fn execute_with(
    fs: &dyn FileSystem,
    request: &ExecutionRequest,
    path_env: Option<&OsStr>,
) -> ExecutionResult {
    if request.commands.is_empty() {
        debug!("no commands configured; nothing to run");
        return ExecutionResult::noop();
    }

    if !fs.is_dir(&request.directory) {
        warn!(
            directory = %request.directory.display(),
            "working directory does not exist; not running commands"
        );
        return ExecutionResult::not_started();
    }

    let shell = resolve_shell(request.shell.as_deref(), path_env, fs);
    match run_script(request, &shell).await {
        Ok(result) => result,
        Err(err) => {
            error!(
                shell = %shell.program.display(),
                error = %err,
                "command execution error"
            );
            ExecutionResult::not_started()
        }
    }
}

async fn run_script(request: &ExecutionRequest, shell: &ResolvedShell) -> Result<ExecutionResult> {
    let script = request.script_for(shell);
    info!(
        shell = %shell.program.display(),
        fell_back = shell.fell_back,
        directory = %request.directory.display(),
        commands = request.commands.len(),
        "starting shell process"
    );

    let mut cmd = Command::new(&shell.program);
    cmd.arg(shell.flag)
        .arg(&script)
        .current_dir(&request.directory)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("running shell {:?}", shell.program))?;

    // stderr is never part of the result; keep it visible at debug.
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!(line, "stderr");
    }

    let code = output.status.code();
    let success = output.status.success();
    info!(
        exit_code = code.unwrap_or(-1),
        success,
        "shell process exited"
    );

    Ok(ExecutionResult {
        stdout: output.stdout,
        success,
        exit_code: code,
    })
}
