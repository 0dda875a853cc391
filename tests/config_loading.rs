// tests/config_loading.rs

mod common;
use crate::common::ConfigFileBuilder;

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use batchfleet::config::{
    ConfigFile, RawConfigFile, default_config_path, load_and_validate, load_or_default,
    validate_config,
};
use batchfleet::errors::FleetError;
use batchfleet::types::Operation;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_error(contents: &str) -> String {
    let file = write_config(contents);
    match load_and_validate(file.path()) {
        Err(FleetError::ConfigError(msg)) => msg,
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.scheduler.root, "home");
    assert_eq!(cfg.scheduler.home_margin, 0.9);
    assert!(cfg.scheduler.include_root);
    assert_eq!(cfg.scheduler.safety_gap, Duration::from_millis(200));
    assert_eq!(cfg.scheduler.reallocation_interval, Duration::from_secs(3600));
    assert_eq!(cfg.scheduler.retry_delay, Duration::from_secs(1));
    assert_eq!(cfg.planner.hack_fraction, 0.1);
    assert_eq!(cfg.planner.prepare_value_ratio, 0.9);
    assert_eq!(cfg.programs.designated(), "weaken.js");
}

#[test]
fn full_file_is_parsed() {
    let file = write_config(
        r#"
[scheduler]
root = "base"
home_margin = 0.75
include_root = false
safety_gap = "50ms"
reallocation_interval = "5m"
retry_delay = "2s"
margin_step = 0.05

[planner]
hack_fraction = 0.25
rank_fraction = 0.2
prepare_value_ratio = 0.75

[programs]
weaken = "w.js"
grow = "g.js"
hack = "h.js"
designated = "g.js"
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.scheduler.root, "base");
    assert!(!cfg.scheduler.include_root);
    assert_eq!(cfg.scheduler.safety_gap, Duration::from_millis(50));
    assert_eq!(cfg.scheduler.reallocation_interval, Duration::from_secs(300));
    assert_eq!(cfg.scheduler.margin_step, 0.05);
    assert_eq!(cfg.planner.hack_fraction, 0.25);
    assert_eq!(cfg.programs.program_for(Operation::Hack), "h.js");
    assert_eq!(cfg.programs.designated(), "g.js");
}

#[test]
fn out_of_range_values_name_the_key() {
    let msg = config_error("[scheduler]\nhome_margin = 1.5\n");
    assert!(msg.contains("scheduler.home_margin"), "{msg}");

    let msg = config_error("[planner]\nhack_fraction = 1.0\n");
    assert!(msg.contains("planner.hack_fraction"), "{msg}");

    let msg = config_error("[scheduler]\nmargin_step = -0.1\n");
    assert!(msg.contains("margin_step"), "{msg}");

    let msg = config_error("[programs]\nhack = \"  \"\n");
    assert!(msg.contains("programs.hack"), "{msg}");
}

#[test]
fn bad_durations_are_rejected() {
    let msg = config_error("[scheduler]\nsafety_gap = \"soon\"\n");
    assert!(msg.contains("scheduler.safety_gap"), "{msg}");

    let msg = config_error("[scheduler]\nsafety_gap = \"0ms\"\n");
    assert!(msg.contains("must be > 0"), "{msg}");

    let msg = config_error("[scheduler]\nreallocation_interval = \"10d\"\n");
    assert!(msg.contains("unsupported duration unit"), "{msg}");
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[scheduler\nroot = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(FleetError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    assert!(matches!(
        load_and_validate(&path),
        Err(FleetError::IoError(_))
    ));
    assert!(load_or_default(&path).is_err());
}

#[test]
fn builder_configs_pass_validation() {
    let cfg: ConfigFile = ConfigFileBuilder::new().home_margin(0.5).build();
    validate_config(&cfg).unwrap();

    let raw: RawConfigFile = ConfigFileBuilder::new().hack_fraction(2.0).raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn missing_default_file_means_defaults() {
    let path = default_config_path();
    if path.exists() {
        return;
    }
    let cfg = load_or_default(&path).unwrap();
    assert_eq!(cfg.scheduler.root, "home");
}
