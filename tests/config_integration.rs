//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;

use serial_test::serial;
use softgl::config::AppConfig;
use softgl_render::RasterMode;

fn scratch_config_dir(name: &str, default_toml: &str, user_toml: Option<&str>) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("softgl_config_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("default.toml"), default_toml).unwrap();
    if let Some(user) = user_toml {
        fs::write(dir.join("user.toml"), user).unwrap();
    }
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("SGL_IMAGE__WIDTH", "320");
    std::env::set_var("SGL_RENDERING__RASTER_MODE", "scanline");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.image.width, 320);
    assert_eq!(config.rendering.raster_mode, RasterMode::Scanline);
    std::env::remove_var("SGL_IMAGE__WIDTH");
    std::env::remove_var("SGL_RENDERING__RASTER_MODE");
}

#[test]
#[serial]
fn test_shipped_default_config_loads() {
    std::env::remove_var("SGL_IMAGE__WIDTH");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.scene.path.as_deref(), Some("scenes/default.ron"));
    assert!(config.run.frames > 0);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = scratch_config_dir(
        "user_override",
        "[image]\nwidth = 100\nheight = 100\n[debug]\nlog_level = \"warn\"\n",
        Some("[image]\nwidth = 200\n"),
    );

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.image.width, 200);
    assert_eq!(config.image.height, 100);
    assert_eq!(config.debug.log_level, "warn");

    fs::remove_dir_all(&dir).ok();
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("/nonexistent/config").unwrap();
    assert_eq!(config.image.width, AppConfig::default().image.width);
    assert!(config.scene.path.is_none());
}

#[test]
#[serial]
fn test_invalid_value_is_an_error() {
    let dir = scratch_config_dir("invalid", "[rendering]\nraster_mode = \"spiral\"\n", None);
    assert!(AppConfig::load_from(&dir).is_err());
    fs::remove_dir_all(&dir).ok();
}
