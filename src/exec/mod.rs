// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`shell`] resolves the requested interpreter, falling back to the
//!   default one.
//! - [`executor`] runs an [`ExecutionRequest`] through that interpreter with
//!   `tokio::process::Command` and captures stdout.

pub mod executor;
pub mod shell;

pub use executor::{execute, execute_with, ExecutionRequest, ExecutionResult};
pub use shell::{resolve_shell, ResolvedShell, DEFAULT_SHELL};
