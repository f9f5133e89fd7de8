// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format from a path's extension
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("no file extension on {}", path.display()))
            })?;

        Self::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("unsupported format: {}", ext)))
    }
}

/// Parses configuration text into a JSON object tree
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Loader for whatever format the path's extension names
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        FileFormat::detect(path.as_ref()).map(Self::new)
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Value> {
        let value = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => {
                let table: toml::Table = toml::from_str(content)
                    .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
                serde_json::to_value(table)
                    .map_err(|e| ConfigError::SerializationError(e.to_string()))?
            }
            FileFormat::Env => parse_env(content),
        };

        if !value.is_object() {
            return Err(ConfigError::ParseError(
                "configuration root must be a table".to_string(),
            ));
        }
        Ok(value)
    }
}

fn parse_env(content: &str) -> Value {
    let mut map = serde_json::Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(key.trim().to_lowercase(), Value::String(value.to_string()));
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_with_nested_tables() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let parsed = loader
            .parse(
                r#"
                local_server_name = "cocoMDS1"
                exchange_rule = "selected_types"

                [[selected_types]]
                guid = "g1"
                name = "Asset"
                "#,
            )
            .unwrap();

        assert_eq!(parsed["local_server_name"], "cocoMDS1");
        assert_eq!(parsed["selected_types"][0]["guid"], "g1");
    }

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let parsed = loader.parse(r#"{"exchange_rule": "all"}"#).unwrap();
        assert_eq!(parsed["exchange_rule"], "all");
    }

    #[test]
    fn test_json_root_must_be_object() {
        let loader = ConfigLoader::new(FileFormat::Json);
        assert!(matches!(
            loader.parse("[1, 2]"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_env_file() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let parsed = loader
            .parse(
                r#"
                # cohort member settings
                LOCAL_SERVER_NAME=cocoMDS1
                export ORGANIZATION_NAME="Coco Pharmaceuticals"
                "#,
            )
            .unwrap();

        assert_eq!(parsed["local_server_name"], "cocoMDS1");
        assert_eq!(parsed["organization_name"], "Coco Pharmaceuticals");
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(FileFormat::detect(Path::new("cohort")).is_err());
        assert_eq!(
            FileFormat::detect(Path::new("cohort.json")).unwrap(),
            FileFormat::Json
        );
    }
}
