//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ProxyConfig, TenantRecord, TenantsFile};
use crate::config::validation::{validate_config, validate_records, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// A configured tenants file is read and validated too, so a bad file stops
/// startup instead of surfacing on the first lookup.
pub fn load_config(path: &Path) -> Result<ProxyConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    if let Some(tenants) = &config.tenants.file {
        check_tenants(&fs::read_to_string(tenants)?)?;
    }
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, LoadError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(LoadError::Validation)?;
    Ok(config)
}

/// Parse the `[[tenant]]` tables of a tenants file.
pub fn parse_tenants(content: &str) -> Result<Vec<TenantRecord>, toml::de::Error> {
    let file: TenantsFile = toml::from_str(content)?;
    Ok(file.tenants)
}

/// Parse a tenants file and reject it unless every record is valid.
pub fn check_tenants(content: &str) -> Result<Vec<TenantRecord>, LoadError> {
    let records = parse_tenants(content)?;
    let errors = validate_records(&records, "tenant");
    if errors.is_empty() {
        Ok(records)
    } else {
        Err(LoadError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [workflow]
            deadline_ms = 5000
            invoke_timeout_ms = 4000

            [[tenants.records]]
            id = "dev"
            url = "http://127.0.0.1:3000"
            token = "abc123"
            "#,
        )
        .unwrap();
        assert_eq!(config.workflow.deadline_ms, 5000);
    }

    #[test]
    fn test_parse_reports_validation_errors() {
        let err = parse_config(
            r#"
            [workflow]
            path_prefix = "api"
            "#,
        )
        .unwrap_err();

        match err {
            LoadError::Validation(errors) => assert!(errors.len() >= 2),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_parse_syntax_error() {
        assert!(matches!(
            parse_config("[workflow"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_tenants_file() {
        let records = parse_tenants(
            r#"
            [[tenant]]
            id = "dev"
            url = "https://dev.example.com"
            token = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "dev");

        assert!(parse_tenants("").unwrap().is_empty());
    }

    #[test]
    fn test_check_tenants_rejects_bad_records() {
        let err = check_tenants(
            r#"
            [[tenant]]
            id = "dev"
            url = "ftp://first"
            token = ""

            [[tenant]]
            id = "dev"
            url = "https://dev.example.com"
            token = "abc"
            "#,
        )
        .unwrap_err();

        match err {
            LoadError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_load_config_validates_tenants_file() {
        let dir = tempfile::tempdir().unwrap();
        let tenants = dir.path().join("tenants.toml");
        fs::write(&tenants, "[[tenant]]\nid = \"dev\"\nurl = \"ftp://x\"\ntoken = \"t\"\n").unwrap();
        let config = dir.path().join("proxy.toml");
        fs::write(&config, format!("[tenants]\nfile = {:?}\n", tenants)).unwrap();

        assert!(matches!(load_config(&config), Err(LoadError::Validation(_))));

        fs::write(&tenants, "[[tenant]]\nid = \"dev\"\nurl = \"https://x\"\ntoken = \"t\"\n").unwrap();
        let loaded = load_config(&config).unwrap();
        assert_eq!(loaded.tenants.file.as_deref(), Some(tenants.as_path()));
    }
}
