// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{PipelineFile, RawPipelineFile};
use crate::errors::Result;

/// Load a pipeline file from a given path and return the raw `RawPipelineFile`.
///
/// This only performs TOML deserialization; it does **not** validate stages
/// or parse readiness conditions. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawPipelineFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a pipeline file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - at least one stage, unique non-empty names,
///   - parseable `wait_for` / `wait_for_after` conditions,
///   - non-zero wait timeouts.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineFile> {
    let raw_config = load_from_path(&path)?;
    let config = PipelineFile::try_from(raw_config)?;
    Ok(config)
}

/// `Pipeline.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Pipeline.toml")
}
