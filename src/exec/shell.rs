// src/exec/shell.rs

//! Shell interpreter resolution.
//!
//! A requested shell that cannot be found is silently replaced by the default
//! one; a misconfigured shell never aborts a stage.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;

/// Shell used when none is requested or the requested one is unavailable.
pub const DEFAULT_SHELL: &str = if cfg!(windows) { "cmd" } else { "sh" };

/// Last resort when even [`DEFAULT_SHELL`] is not on `PATH`.
const DEFAULT_SHELL_PATH: &str = if cfg!(windows) { "cmd.exe" } else { "/bin/sh" };

/// The interpreter a stage will actually run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedShell {
    pub program: PathBuf,
    /// Flag that makes the interpreter read the script from its next argument.
    pub flag: &'static str,
    /// True when the requested shell was unavailable and the default was used.
    pub fell_back: bool,
}

/// Map a requested shell name to an interpreter path.
///
/// - `None` or an empty name selects [`DEFAULT_SHELL`].
/// - Names containing a path separator are used as-is if executable.
/// - Bare names are searched for in `path_env` (a `PATH`-style list).
pub fn resolve_shell(
    requested: Option<&str>,
    path_env: Option<&OsStr>,
    fs: &dyn FileSystem,
) -> ResolvedShell {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());

    if let Some(name) = requested {
        if let Some(program) = locate(name, path_env, fs) {
            return shell_at(program, false);
        }
        debug!(
            requested = name,
            default = DEFAULT_SHELL,
            "requested shell not available; falling back to default"
        );
    }

    let program = locate(DEFAULT_SHELL, path_env, fs)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SHELL_PATH));
    shell_at(program, requested.is_some())
}

fn shell_at(program: PathBuf, fell_back: bool) -> ResolvedShell {
    let flag = if is_cmd(&program) { "/C" } else { "-c" };
    ResolvedShell {
        program,
        flag,
        fell_back,
    }
}

fn is_cmd(program: &Path) -> bool {
    program
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("cmd"))
}

fn locate(name: &str, path_env: Option<&OsStr>, fs: &dyn FileSystem) -> Option<PathBuf> {
    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(name);
        return fs.is_executable(&path).then_some(path);
    }

    let path_env = path_env?;
    std::env::split_paths(path_env)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| fs.is_executable(candidate))
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(name), dir.join(format!("{name}.exe"))]
    } else {
        vec![dir.join(name)]
    }
}
