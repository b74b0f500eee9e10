//! Tests for loading configuration files.

use std::io::Write;
use std::time::Duration;

use serde_json::json;
use sharepoint_drive::{Config, DriveError};
use tempfile::NamedTempFile;

fn write_config(value: serde_json::Value) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(value.to_string().as_bytes()).unwrap();
    temp_file
}

#[test]
fn test_config_from_file() {
    let file = write_config(json!({
        "tenant": "contoso",
        "tenant_domain": "contoso.onmicrosoft.com",
        "client_id": "app-id",
        "client_secret": "app-secret",
        "site": "Finance",
        "drive": "Archive",
        "timeout_secs": 5
    }));

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.tenant(), "contoso");
    assert_eq!(config.site(), "Finance");
    assert_eq!(config.drive(), Some("Archive"));
    assert_eq!(config.timeout(), Duration::from_secs(5));
}

#[test]
fn test_config_from_file_with_defaults() {
    let file = write_config(json!({
        "tenant": "contoso",
        "tenant_domain": "contoso.onmicrosoft.com",
        "client_id": "app-id",
        "client_secret": "app-secret",
        "site": "Finance"
    }));

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.drive().is_none());
    assert_eq!(config.timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_from_missing_file() {
    let err = Config::from_file("/nonexistent/path/sharepoint.json").unwrap_err();
    assert!(matches!(err, DriveError::ConfigFileError(_)));
}

#[test]
fn test_config_from_invalid_json() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"not valid json").unwrap();

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(matches!(err, DriveError::ConfigParseError(_)));
}

#[test]
fn test_config_rejects_unknown_fields() {
    let file = write_config(json!({
        "tenant": "contoso",
        "tenant_domain": "contoso.onmicrosoft.com",
        "client_id": "app-id",
        "client_secret": "app-secret",
        "site": "Finance",
        "sitee": "typo"
    }));

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_config_rejects_empty_secret() {
    let file = write_config(json!({
        "tenant": "contoso",
        "tenant_domain": "contoso.onmicrosoft.com",
        "client_id": "app-id",
        "client_secret": "",
        "site": "Finance"
    }));

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, DriveError::InvalidConfig(_)));
}
