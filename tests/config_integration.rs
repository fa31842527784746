//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.
//! Env vars are process-wide, so every test here runs serially.

use arplay::config::AppConfig;
use arplay_session::ArMode;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("ARPLAY_GAME__DURATION_MS", "30000");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.game.duration_ms, 30000.0);
    std::env::remove_var("ARPLAY_GAME__DURATION_MS");
}

#[test]
#[serial]
fn test_env_force_mode() {
    std::env::set_var("ARPLAY_SESSION__FORCE_MODE", "real");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.session.force_mode, Some(ArMode::Real));
    std::env::remove_var("ARPLAY_SESSION__FORCE_MODE");
}

#[test]
#[serial]
fn test_default_file_matches_defaults() {
    std::env::remove_var("ARPLAY_GAME__DURATION_MS");
    std::env::remove_var("ARPLAY_SESSION__FORCE_MODE");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let loaded = AppConfig::load_from(cwd.join("config")).unwrap();
    let defaults = AppConfig::default();
    assert_eq!(loaded.game.spawn_interval_ms, defaults.game.spawn_interval_ms);
    assert_eq!(loaded.game.rng_seed, defaults.game.rng_seed);
    assert_eq!(loaded.viewport.fov_degrees, defaults.viewport.fov_degrees);
    assert_eq!(loaded.input.long_press_ms, defaults.input.long_press_ms);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.viewport.width, 1280.0);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_bad_env_value_is_config_error() {
    std::env::set_var("ARPLAY_GAME__MAX_ACTIVE_TARGETS", "lots");
    let err = AppConfig::load().unwrap_err();
    assert!(err.to_string().starts_with("Configuration error:"));
    std::env::remove_var("ARPLAY_GAME__MAX_ACTIVE_TARGETS");
}
