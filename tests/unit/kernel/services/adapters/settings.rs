use super::*;
use crate::models::ViewId;
use std::io::Write;

#[test]
fn test_parse_partial_config_keeps_defaults() {
    let config = parse_config(
        r#"{ "old_file_view": "sub", "wrap_around": true, "timing": { "update_delay_ms": 25 } }"#,
    )
    .unwrap();

    assert_eq!(config.old_file_view, ViewId::Sub);
    assert!(config.wrap_around);
    assert!(config.recompare_on_save);
    assert_eq!(config.timing.update_delay_ms, 25);
    assert_eq!(config.timing.line_replace_window_ms, 40);
}

#[test]
fn test_parse_invalid_config() {
    let err = parse_config("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("invalid settings"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_from(&dir.path().join("setting.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "ignore_case": true, "detect_moves": false }}"#).unwrap();

    let config = load_config_from(file.path()).unwrap();

    assert!(config.ignore_case);
    assert!(!config.detect_moves);
    assert_eq!(config.old_file_view, ViewId::Main);
}

#[test]
fn test_settings_path_layout() {
    if let Some(path) = get_settings_path() {
        assert!(path.ends_with(".zcompare/setting.json"));
    }
    if let Some(dir) = get_log_dir() {
        assert!(dir.ends_with("zcompare/logs"));
    }
}
