// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod readiness;
pub mod stage;
pub mod types;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, PipelineFile};
use crate::errors::Result;
use crate::pipeline::run_pipeline;
use crate::readiness::WaitSpec;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the pipeline file, then either prints it (`--dry-run`)
/// or runs its stages in order, writing each stage's captured stdout to our
/// stdout. A failing stage is reported as [`errors::CmdStageError::StageFailed`].
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let pipeline = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&pipeline);
        return Ok(());
    }

    let base_dir = config_root_dir(&config_path);
    info!(
        config = %config_path.display(),
        stages = pipeline.stages.len(),
        "running pipeline"
    );

    let outcome = run_pipeline(&pipeline, &base_dir, args.stage.as_deref()).await?;

    let mut stdout = std::io::stdout().lock();
    for report in &outcome.reports {
        stdout.write_all(&report.stdout)?;
    }
    stdout.flush()?;

    outcome.into_result()?;
    Ok(())
}

/// Directory stage paths are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "ci/Pipeline.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Pipeline.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print stages, shells, commands and conditions.
fn print_dry_run(pipeline: &PipelineFile) {
    println!("cmdstage dry-run");
    println!("  config.wait_timeout = {}", pipeline.config.wait_timeout);
    println!("  config.wait_interval = {}", pipeline.config.wait_interval);
    println!();

    println!("stages ({}):", pipeline.stages.len());
    for stage in pipeline.stages.iter() {
        println!("  - {}", stage.name);
        if let Some(ref dir) = stage.directory {
            println!("      directory: {}", dir.display());
        }
        if let Some(ref shell) = stage.shell {
            println!("      shell: {shell}");
        }
        if let Some(ref spec) = stage.wait_before {
            println!("      wait_for: {}", describe_wait(spec));
        }
        for cmd in stage.commands.iter() {
            println!("      cmd: {cmd}");
        }
        if let Some(ref spec) = stage.wait_after {
            println!("      wait_for_after: {}", describe_wait(spec));
        }
    }

    debug!("dry-run complete (no execution)");
}

fn describe_wait(spec: &WaitSpec) -> String {
    format!(
        "{} (timeout {:?}, every {:?})",
        spec.condition, spec.timeout, spec.interval
    )
}
