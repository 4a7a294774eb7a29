// src/errors.rs

//! Crate-wide error types.
//!
//! Parse and wait errors are hard failures returned to the immediate caller.
//! A command that exits non-zero is *not* an error here: it is reported as
//! `success = false` in [`crate::exec::ExecutionResult`].

use std::time::Duration;

use thiserror::Error;

/// A readiness spec string that is malformed or semantically invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("condition targets both host/port and File; exactly one is allowed")]
    ConflictingTargets,

    #[error("condition has no target; expected `host=.. port=..` or `File=..`")]
    MissingTarget,

    #[error("condition is missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("condition key `{0}` given more than once")]
    DuplicateKey(String),

    #[error("invalid port `{0}` (expected an integer in 0..=65535)")]
    InvalidPort(String),

    #[error("invalid state `{state}` for {target} target")]
    InvalidState { target: &'static str, state: String },
}

/// The readiness poller gave up.
#[derive(Error, Debug, Clone)]
pub enum WaitError {
    #[error(
        "timed out after {timeout:?} waiting for `{condition}` ({attempts} attempts{})",
        last_error_suffix(.last_error)
    )]
    Timeout {
        condition: String,
        timeout: Duration,
        attempts: u32,
        last_error: Option<String>,
    },
}

#[derive(Error, Debug)]
pub enum CmdStageError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid readiness condition: {0}")]
    Condition(#[from] ConditionError),

    #[error("Readiness wait failed: {0}")]
    Wait(#[from] WaitError),

    #[error("Stage '{stage}' failed (exit code: {})", exit_code_text(.exit_code))]
    StageFailed {
        stage: String,
        exit_code: Option<i32>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(", last error: {e}"),
        None => String::new(),
    }
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdStageError>;
