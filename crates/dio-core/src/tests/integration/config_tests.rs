#![cfg(test)]

use std::fs;

use serde::Deserialize;
use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::property::{ConfigFormat, PropertyError};
use crate::tests::integration::common::quiet_dio;

#[derive(Debug, Deserialize, PartialEq)]
struct WebConfig {
    host: String,
    port: u16,
}

fn io(e: std::io::Error) -> Error {
    Error::Other(e.to_string())
}

#[test]
fn test_config_file_overrides_embedded_defaults() -> Result<()> {
    let dir = tempdir().map_err(io)?;
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{ "web": { "port": 9090 } }"#).map_err(io)?;

    let (mut dio, _memory) = quiet_dio();
    dio.load_default_config_str(r#"{ "web": { "host": "0.0.0.0", "port": 8080 } }"#, ConfigFormat::Json)?
        .load_config(&path)?;

    let web: WebConfig = dio.get_properties("web")?.expect("web section");
    assert_eq!(
        web,
        WebConfig {
            host: "0.0.0.0".to_string(),
            port: 9090
        }
    );
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_default_config_file() -> Result<()> {
    let dir = tempdir().map_err(io)?;
    let path = dir.path().join("defaults.yml");
    fs::write(&path, "app:\n  env: prod\n  name: orders\n").map_err(io)?;

    let (mut dio, _memory) = quiet_dio();
    dio.load_default_config(&path)?.set_property("app.env", "dev")?;

    assert_eq!(dio.get_property_string("app.env").as_deref(), Some("dev"));
    assert_eq!(dio.get_property_string("app.name").as_deref(), Some("orders"));
    Ok(())
}

#[test]
fn test_unreadable_or_unknown_config_is_an_error() -> Result<()> {
    let dir = tempdir().map_err(io)?;
    let (mut dio, _memory) = quiet_dio();

    let missing = dio.load_config(dir.path().join("missing.json")).err().expect("missing file");
    assert!(matches!(missing, Error::Property(PropertyError::Io { .. })));

    let unknown = dio.load_config(dir.path().join("app.ini")).err().expect("unknown format");
    assert!(matches!(unknown, Error::Property(PropertyError::UnsupportedConfigFormat(_))));

    let malformed = dio
        .load_config_str("{ not json", ConfigFormat::Json)
        .err()
        .expect("malformed document");
    assert!(matches!(malformed, Error::Property(PropertyError::DeserializationError { .. })));
    Ok(())
}

#[test]
fn test_environment_overrides_configuration() -> Result<()> {
    let (mut dio, _memory) = quiet_dio();
    dio.load_default_config_str(r#"{ "app": { "env": "prod" } }"#, ConfigFormat::Json)?
        .migrate_env_from(vec![
            ("APP_ENV".to_string(), "dev".to_string()),
            ("LOG_MAX-AGE".to_string(), "3".to_string()),
        ])?;

    assert_eq!(dio.get_property_string("app.env").as_deref(), Some("dev"));
    assert_eq!(dio.get_property_string("log.max-age").as_deref(), Some("3"));
    Ok(())
}
