//! Integration tests for omrs-config

use omrs_config::*;
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Deserialize)]
struct CohortFile {
    cohort_name: String,
    exchange_rule: String,
}

impl Validate for CohortFile {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.cohort_name, "cohort_name")?;
        ConfigValidator::one_of(
            &self.exchange_rule.as_str(),
            &["all", "just_type_defs"],
            "exchange_rule",
        )
    }
}

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "cohort_name = \"cocoCohort\"").unwrap();
    writeln!(file, "exchange_rule = \"all\"").unwrap();

    let manager = ConfigManager::new();
    manager.load_file(file.path()).unwrap();

    let cohort: CohortFile = manager.extract().unwrap();
    assert_eq!(cohort.cohort_name, "cocoCohort");
}

#[test]
fn test_load_file_rejects_unknown_extension() {
    let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    let manager = ConfigManager::new();

    assert!(matches!(
        manager.load_file(file.path()),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_invalid_rule_fails_validation() {
    let manager = ConfigManager::new();
    manager
        .load_str(
            r#"{"cohort_name": "cocoCohort", "exchange_rule": "everything"}"#,
            FileFormat::Json,
        )
        .unwrap();

    let result: Result<CohortFile> = manager.extract();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::KeyNotFound("local_server_name".to_string());
    assert!(err.to_string().contains("local_server_name"));
}
