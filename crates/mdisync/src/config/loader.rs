use std::collections::BTreeMap;
use std::path::Path;

use crate::config::schema::{ClassMapping, ProjectConfig};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProjectConfig, ConfigError> {
    let content = read_file(path.as_ref())?;
    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: ProjectConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads a standalone prefix -> class mapping file (the format the MDI
/// mapping export uses: `{"TF1-2A": ["Class 1"], ...}`).
pub fn load_class_map<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, ClassMapping>, ConfigError> {
    let content = read_file(path.as_ref())?;
    let map: BTreeMap<String, ClassMapping> = serde_json::from_str(&content)?;
    Ok(map)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

pub(crate) fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    for (code, entry) in &config.discipline_map {
        if code.chars().count() != 1 {
            return Err(ConfigError::InvalidDiscipline {
                code: code.clone(),
                reason: "Lookup key must be a single character".to_string(),
            });
        }
        if entry.len() != 3 {
            return Err(ConfigError::InvalidDiscipline {
                code: code.clone(),
                reason: format!(
                    "Expected [table, description, discipline], got {} entries",
                    entry.len()
                ),
            });
        }
    }

    if let Err(e) = regex::Regex::new(&config.naming.transmittal_pattern) {
        return Err(ConfigError::InvalidPattern {
            name: "transmittal_pattern".to_string(),
            reason: e.to_string(),
        });
    }

    if config.naming.extensions.is_empty() {
        return Err(ConfigError::Validation {
            message: "At least one file extension must be allowed".to_string(),
        });
    }

    if config.import.batch_size == 0 {
        return Err(ConfigError::Validation {
            message: "import.batch_size must be greater than zero".to_string(),
        });
    }

    Ok(())
}
