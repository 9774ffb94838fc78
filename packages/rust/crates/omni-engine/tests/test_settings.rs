//! Tests for layered settings loading.

use std::path::Path;
use std::time::Duration;

use omni_ast::QuoteStyle;
use omni_engine::EngineConfig;
use omni_engine::settings::load_runtime_settings_from_paths;

fn write(path: &Path, content: &str) {
    std::fs::write(path, content).expect("write settings");
}

#[test]
fn test_missing_files_use_defaults() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(&dir.path().join("none.yaml"), &dir.path().join("also-none.yaml"));
    assert_eq!(settings.canvas.engine_config(), EngineConfig::default());
}

#[test]
fn test_user_overrides_system() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let system = dir.path().join("system.yaml");
    let user = dir.path().join("user.yaml");
    write(
        &system,
        r"
canvas:
  history:
    limit: 20
  fuzzy:
    threshold: 0.9
  writer:
    timeout_ms: 5000
  format:
    quote_style: double
",
    );
    write(
        &user,
        r#"
canvas:
  fuzzy:
    threshold: 0.7
    refuse_tied_matches: true
  format:
    quote_style: single
    indent_unit: "    "
"#,
    );

    let config = load_runtime_settings_from_paths(&system, &user).canvas.engine_config();
    assert_eq!(config.history_limit, 20);
    assert_eq!(config.writer_timeout, Some(Duration::from_millis(5000)));
    assert!((config.edit.fuzzy_threshold - 0.7).abs() < f64::EPSILON);
    assert!(config.edit.refuse_tied_matches);
    assert_eq!(config.edit.quote, QuoteStyle::Single);
    assert_eq!(config.edit.indent_unit, "    ");
}

#[test]
fn test_invalid_yaml_is_ignored() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let system = dir.path().join("system.yaml");
    let user = dir.path().join("user.yaml");
    write(&system, "canvas:\n  history:\n    limit: 7\n");
    write(&user, "canvas: [unterminated\n");

    let config = load_runtime_settings_from_paths(&system, &user).canvas.engine_config();
    assert_eq!(config.history_limit, 7);
}

#[test]
fn test_out_of_range_values_fall_back() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let system = dir.path().join("system.yaml");
    write(
        &system,
        r#"
canvas:
  fuzzy:
    threshold: 1.5
  writer:
    timeout_ms: 0
  format:
    indent_unit: "ab"
"#,
    );

    let config = load_runtime_settings_from_paths(&system, &dir.path().join("user.yaml"))
        .canvas
        .engine_config();
    let defaults = EngineConfig::default();
    assert!((config.edit.fuzzy_threshold - defaults.edit.fuzzy_threshold).abs() < f64::EPSILON);
    assert_eq!(config.writer_timeout, None);
    assert_eq!(config.edit.indent_unit, defaults.edit.indent_unit);
}
