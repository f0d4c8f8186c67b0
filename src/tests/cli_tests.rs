use crate::{exit_status, Args};
use clap::Parser;
use iss_observer_lib::phase::ClassificationMode;
use std::io::Write;
use std::process::ExitCode;
use tempfile::NamedTempFile;

#[test]
fn defaults_without_flags() {
    let args = Args::try_parse_from(["iss-observer"]).unwrap();
    assert!(args.config.is_none());
    assert!(args.mode.is_none());
    assert!(!args.json);
    assert!(!args.verbose);
}

#[test]
fn mode_flag_parses_kebab_case_names() {
    let args =
        Args::try_parse_from(["iss-observer", "--mode", "single-day", "--json", "-v"]).unwrap();
    assert_eq!(args.mode, Some(ClassificationMode::SingleDay));
    assert!(args.json);
    assert!(args.verbose);

    assert!(Args::try_parse_from(["iss-observer", "--mode", "hourly"]).is_err());
}

#[test]
fn mode_flag_overrides_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[observation]\nmode = \"single-day\"\nideal_min_minutes = 30").unwrap();
    let path = file.path().to_str().unwrap();

    let args = Args::try_parse_from(["iss-observer", "--config", path]).unwrap();
    let config = args.load_config().unwrap();
    assert_eq!(config.observation.mode, ClassificationMode::SingleDay);
    assert_eq!(config.observation.ideal_min_minutes, 30);

    let args =
        Args::try_parse_from(["iss-observer", "--config", path, "--mode", "midpoint"]).unwrap();
    let config = args.load_config().unwrap();
    assert_eq!(config.observation.mode, ClassificationMode::Midpoint);
}

#[test]
fn explicit_config_must_exist_and_validate() {
    let args = Args::try_parse_from(["iss-observer", "--config", "/nonexistent/iss.toml"]).unwrap();
    assert!(args.load_config().is_err());

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[observation]\nideal_min_minutes = 200").unwrap();
    let path = file.path().to_str().unwrap();

    let args = Args::try_parse_from(["iss-observer", "--config", path]).unwrap();
    assert!(args.load_config().is_err());
}

#[test]
fn failed_run_maps_to_failure_status() {
    assert_eq!(exit_status(Ok(())), ExitCode::SUCCESS);
    assert_eq!(
        exit_status(Err(anyhow::anyhow!("cannot fetch ISS position"))),
        ExitCode::FAILURE
    );
}
