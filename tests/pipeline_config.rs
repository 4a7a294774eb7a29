// tests/pipeline_config.rs

mod common;
use crate::common::builders::{PipelineBuilder, StageBuilder};
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use cmdstage::cli::CliArgs;
use cmdstage::config::load_and_validate;
use cmdstage::errors::CmdStageError;
use cmdstage::pipeline::{build_stage, run_pipeline};
use cmdstage::readiness::ReadinessState;
use cmdstage::types::{HumanDuration, DEFAULT_WAIT_INTERVAL};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn loads_stages_with_conditions_and_durations() -> TestResult {
    let file = write_config(
        r#"
[config]
wait_timeout = "10s"

[[stage]]
name = "start"
shell = "bash"
directory = "services"
commands = ["./start.sh", "echo started"]
wait_for = "host=localhost port=8983 state=ready"

[[stage]]
name = "check"
commands = ["test -f out.txt"]
wait_for_after = "File=out.txt state=present"
wait_timeout = "250ms"
wait_interval = "50ms"
"#,
    );

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.config.wait_timeout, HumanDuration(Duration::from_secs(10)));
    assert_eq!(cfg.stages.len(), 2);

    let start = &cfg.stages[0];
    assert_eq!(start.name, "start");
    assert_eq!(start.shell.as_deref(), Some("bash"));
    assert_eq!(start.directory, Some(PathBuf::from("services")));
    assert_eq!(start.commands, vec!["./start.sh", "echo started"]);
    let before = start.wait_before.as_ref().expect("wait_for parsed");
    assert_eq!(before.condition.port(), Some(8983));
    assert_eq!(before.timeout, Duration::from_secs(10));
    assert_eq!(before.interval, DEFAULT_WAIT_INTERVAL);
    assert!(start.wait_after.is_none());

    let check = cfg.stage("check").expect("stage by name");
    let after = check.wait_after.as_ref().expect("wait_for_after parsed");
    assert_eq!(after.condition.state(), ReadinessState::Present);
    assert_eq!(after.timeout, Duration::from_millis(250));
    assert_eq!(after.interval, Duration::from_millis(50));
    Ok(())
}

#[test]
fn invalid_condition_is_a_config_error() {
    let file = write_config(
        r#"
[[stage]]
name = "db"
commands = ["echo hi"]
wait_for = "host=localhost port=-1 state=ready"
"#,
    );

    match load_and_validate(file.path()) {
        Err(CmdStageError::ConfigError(msg)) => {
            assert!(msg.contains("db"));
            assert!(msg.contains("wait_for"));
            assert!(msg.contains("-1"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_duration_is_a_toml_error() {
    let file = write_config(
        r#"
[config]
wait_timeout = "3 fortnights"

[[stage]]
name = "a"
commands = ["true"]
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(CmdStageError::TomlError(_))
    ));
}

#[test]
fn duplicate_stage_names_are_rejected() {
    let result = PipelineBuilder::new()
        .with_stage(StageBuilder::new("build").command("true").build())
        .with_stage(StageBuilder::new("build").command("false").build())
        .try_build();

    match result {
        Err(CmdStageError::ConfigError(msg)) => assert!(msg.contains("duplicate stage name 'build'")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn empty_pipeline_and_empty_stage_are_rejected() {
    assert!(matches!(
        PipelineBuilder::new().try_build(),
        Err(CmdStageError::ConfigError(_))
    ));
    assert!(matches!(
        PipelineBuilder::new()
            .with_stage(StageBuilder::new("nothing").build())
            .try_build(),
        Err(CmdStageError::ConfigError(_))
    ));
    assert!(matches!(
        PipelineBuilder::new()
            .with_stage(StageBuilder::new(" ").command("true").build())
            .try_build(),
        Err(CmdStageError::ConfigError(_))
    ));
}

#[test]
fn wait_only_stage_is_allowed() {
    let cfg = PipelineBuilder::new()
        .with_stage(
            StageBuilder::new("wait for db")
                .wait_for("host=db port=5432 state=ready")
                .build(),
        )
        .build();
    assert!(cfg.stages[0].commands.is_empty());
}

#[test]
fn zero_timeout_is_rejected() {
    let result = PipelineBuilder::new()
        .with_stage(
            StageBuilder::new("a")
                .command("true")
                .wait_timeout(Duration::ZERO)
                .build(),
        )
        .try_build();
    assert!(matches!(result, Err(CmdStageError::ConfigError(_))));
}

#[test]
fn human_durations_parse_and_display() {
    assert_eq!("250ms".parse(), Ok(HumanDuration(Duration::from_millis(250))));
    assert_eq!("3s".parse(), Ok(HumanDuration(Duration::from_secs(3))));
    assert_eq!("1m".parse(), Ok(HumanDuration(Duration::from_secs(60))));
    assert_eq!("2h".parse(), Ok(HumanDuration(Duration::from_secs(7200))));
    assert!("5".parse::<HumanDuration>().is_err());
    assert!("5d".parse::<HumanDuration>().is_err());
    assert!("".parse::<HumanDuration>().is_err());

    let huge = "9999999999999999999h".parse::<HumanDuration>();
    assert!(matches!(huge, Err(ref msg) if msg.contains("out of range")));
    assert!("18446744073709551615m".parse::<HumanDuration>().is_err());
    assert_eq!(
        "18446744073709551615s".parse(),
        Ok(HumanDuration(Duration::from_secs(u64::MAX)))
    );

    assert_eq!(HumanDuration(Duration::from_millis(1500)).to_string(), "1500ms");
    assert_eq!(HumanDuration(Duration::from_secs(30)).to_string(), "30s");
}

#[test]
fn relative_stage_directory_is_resolved_against_base() {
    let cfg = PipelineBuilder::new()
        .with_stage(StageBuilder::new("rel").directory("sub").command("true").build())
        .with_stage(StageBuilder::new("abs").directory("/srv").command("true").build())
        .with_stage(StageBuilder::new("none").command("true").build())
        .build();

    let base = Path::new("/work/pipeline");
    assert_eq!(build_stage(&cfg.stages[0], base).directory(), Path::new("/work/pipeline/sub"));
    assert_eq!(build_stage(&cfg.stages[1], base).directory(), Path::new("/srv"));
    assert_eq!(build_stage(&cfg.stages[2], base).directory(), base);
}

#[tokio::test]
async fn pipeline_stops_at_first_failing_stage() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let cfg = PipelineBuilder::new()
        .with_stage(StageBuilder::new("first").command("echo one").build())
        .with_stage(StageBuilder::new("second").command("exit 3").build())
        .with_stage(StageBuilder::new("third").command("echo three > third.txt").build())
        .build();

    let outcome = with_timeout(run_pipeline(&cfg, dir.path(), None)).await?;
    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.reports[0].stdout, b"one\n");
    assert!(outcome.reports[0].success);

    let failed = outcome.failed_stage().expect("second stage failed");
    assert_eq!(failed.name, "second");
    assert_eq!(failed.exit_code, Some(3));
    assert!(!dir.path().join("third.txt").exists());

    match outcome.into_result() {
        Err(CmdStageError::StageFailed { stage, exit_code }) => {
            assert_eq!(stage, "second");
            assert_eq!(exit_code, Some(3));
        }
        other => panic!("Expected StageFailed, got: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn single_stage_can_be_selected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = PipelineBuilder::new()
        .with_stage(StageBuilder::new("first").command("exit 1").build())
        .with_stage(StageBuilder::new("second").command("pwd").build())
        .build();

    let outcome = with_timeout(run_pipeline(&cfg, dir.path(), Some("second"))).await?;
    let reports = outcome.into_result()?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "second");

    let expected = std::fs::canonicalize(dir.path())?;
    let reported = std::fs::canonicalize(String::from_utf8(reports[0].stdout.clone())?.trim_end())?;
    assert_eq!(reported, expected);

    let missing = run_pipeline(&cfg, dir.path(), Some("nope")).await;
    assert!(matches!(missing, Err(CmdStageError::ConfigError(_))));
    Ok(())
}

#[tokio::test]
async fn readiness_timeout_aborts_pipeline_but_keeps_earlier_output() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = PipelineBuilder::new()
        .with_wait_timeout(Duration::from_millis(150))
        .with_wait_interval(Duration::from_millis(25))
        .with_stage(StageBuilder::new("setup").command("echo a").build())
        .with_stage(
            StageBuilder::new("gate")
                .wait_for("File=missing.flag state=present")
                .command("echo never")
                .build(),
        )
        .with_stage(StageBuilder::new("after").command("echo later").build())
        .build();

    let outcome = with_timeout(run_pipeline(&cfg, dir.path(), None)).await?;
    assert_eq!(outcome.reports.len(), 2);
    assert!(outcome.reports[0].success);
    assert_eq!(outcome.reports[0].stdout, b"a\n");

    let gate = &outcome.reports[1];
    assert_eq!(gate.name, "gate");
    assert!(!gate.success);
    assert!(gate.stdout.is_empty());
    assert_eq!(gate.exit_code, None);
    assert!(outcome.wait_error.is_some());

    assert!(matches!(outcome.into_result(), Err(CmdStageError::Wait(_))));
    Ok(())
}

#[tokio::test]
async fn dry_run_does_not_execute() -> TestResult {
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("marker");
    let config_path = dir.path().join("Pipeline.toml");
    std::fs::write(
        &config_path,
        format!(
            "[[stage]]\nname = \"touch\"\ncommands = [\"touch {}\"]\n",
            marker.display()
        ),
    )?;

    let args = CliArgs {
        config: config_path.display().to_string(),
        stage: None,
        log_level: None,
        dry_run: true,
    };
    cmdstage::run(args).await?;
    assert!(!marker.exists());
    Ok(())
}
