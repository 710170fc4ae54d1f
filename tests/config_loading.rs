use std::io::Write;

use indoc::indoc;
use tempfile::NamedTempFile;

use mediation_flow_debugger::config::{ConfigError, ConfigOverrides, DebuggerConfig};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_file_then_override() {
    let file = config_file(indoc! {r#"
        {
          "log-level": "debug",
          "file-logging": true,
          "pretty": false
        }
    "#});

    let loaded = DebuggerConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap();
    assert_eq!(loaded.log_level.as_deref(), Some("debug"));
    assert!(loaded.file_logging);
    assert!(!loaded.pretty);
    assert!(!loaded.no_color);

    let overrides = ConfigOverrides {
        log_level: Some("trace".to_string()),
        no_color: Some(true),
        ..ConfigOverrides::default()
    };
    let loaded = DebuggerConfig::load(Some(file.path()), overrides).unwrap();
    assert_eq!(loaded.log_level.as_deref(), Some("trace"));
    assert!(loaded.no_color);
    // Untouched by the overrides.
    assert!(loaded.file_logging);
    assert!(!loaded.pretty);
}

#[test]
fn test_load_without_file_uses_defaults() {
    let loaded = DebuggerConfig::load(None, ConfigOverrides::default()).unwrap();
    assert_eq!(loaded, DebuggerConfig::default());
    assert!(loaded.pretty);
}

#[test]
fn test_invalid_file_is_a_parse_error() {
    let file = config_file("{ \"pretty\": \"yes\" }");
    let err = DebuggerConfig::load(Some(file.path()), ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == file.path()));
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let err = DebuggerConfig::from_file(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.json"));
}
