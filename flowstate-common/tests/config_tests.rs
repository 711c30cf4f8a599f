//! Configuration resolution tests
//!
//! Covers the resolution order (command line, environment, platform file,
//! compiled defaults) and graceful degradation when the platform file is
//! missing or broken.
//!
//! Note: tests that set FLOWSTATE_CONFIG are marked #[serial] so they never
//! race with each other on the process environment.

use flowstate_common::config::{
    load_config, load_config_with, ConfigSource, TomlConfig, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_no_candidates_uses_compiled_defaults() {
    let (config, source) = load_config_with(None, None, None).unwrap();
    assert_eq!(source, ConfigSource::CompiledDefaults);
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_missing_platform_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("config.toml");

    let (config, source) = load_config_with(None, None, Some(missing)).unwrap();
    assert_eq!(source, ConfigSource::CompiledDefaults);
    assert_eq!(config.scheduler.lookahead_window_ms, 5000);
}

#[test]
fn test_platform_file_is_used_when_present() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "config.toml", "[logging]\nlevel = \"debug\"\n");

    let (config, source) = load_config_with(None, None, Some(path.clone())).unwrap();
    assert_eq!(source, ConfigSource::PlatformDefault(path));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_broken_platform_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "config.toml", "this is not toml = = =");

    let (config, source) = load_config_with(None, None, Some(path)).unwrap();
    assert_eq!(source, ConfigSource::CompiledDefaults);
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_invalid_platform_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "config.toml", "[scheduler]\nlookahead_window_ms = 0\n");

    let (_, source) = load_config_with(None, None, Some(path)).unwrap();
    assert_eq!(source, ConfigSource::CompiledDefaults);
}

#[test]
fn test_command_line_beats_environment_and_platform() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[scheduler]\nlookahead_window_ms = 2000\ntick_interval_ms = 100\n");
    let env_file = write_config(&dir, "env.toml", "[scheduler]\nlookahead_window_ms = 3000\n");
    let platform = write_config(&dir, "platform.toml", "[scheduler]\nlookahead_window_ms = 4000\n");

    let (config, source) =
        load_config_with(Some(cli.as_path()), Some(env_file), Some(platform)).unwrap();
    assert_eq!(source, ConfigSource::CommandLine(cli));
    assert_eq!(config.scheduler.lookahead_window_ms, 2000);
    assert_eq!(config.scheduler.tick_interval_ms, 100);
}

#[test]
fn test_environment_beats_platform() {
    let dir = TempDir::new().unwrap();
    let env_file = write_config(&dir, "env.toml", "[workout]\nprep_seconds = 10\n");
    let platform = write_config(&dir, "platform.toml", "[workout]\nprep_seconds = 20\n");

    let (config, source) = load_config_with(None, Some(env_file.clone()), Some(platform)).unwrap();
    assert_eq!(source, ConfigSource::Environment(env_file));
    assert_eq!(config.workout.prep_seconds, Some(10.0));
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(load_config_with(Some(missing.as_path()), None, None).is_err());
    assert!(load_config_with(None, Some(missing), None).is_err());
}

#[test]
fn test_explicit_invalid_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[scheduler]\ntick_interval_ms = 9000\n");

    assert!(load_config_with(Some(path.as_path()), None, None).is_err());
}

#[test]
#[serial]
fn test_load_config_reads_env_var() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "env.toml", "[scheduler]\nlookahead_window_ms = 7000\n");
    env::set_var(CONFIG_ENV_VAR, &path);

    let result = load_config(None);
    env::remove_var(CONFIG_ENV_VAR);

    let (config, source) = result.unwrap();
    assert_eq!(source, ConfigSource::Environment(path));
    assert_eq!(config.scheduler.lookahead_window_ms, 7000);
}

#[test]
#[serial]
fn test_load_config_cli_overrides_env_var() {
    let dir = TempDir::new().unwrap();
    let env_file = write_config(&dir, "env.toml", "[logging]\nlevel = \"warn\"\n");
    let cli = write_config(&dir, "cli.toml", "[logging]\nlevel = \"trace\"\n");
    env::set_var(CONFIG_ENV_VAR, &env_file);

    let result = load_config(Some(cli.as_path()));
    env::remove_var(CONFIG_ENV_VAR);

    let (config, _) = result.unwrap();
    assert_eq!(config.logging.level, "trace");
}
