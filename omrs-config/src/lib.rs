// Layered configuration for open metadata repository services
//
// Values are merged in load order: later sources override earlier ones, so the
// usual sequence is file, then `.env`, then the process environment.

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Default environment prefix for cohort settings
pub const DEFAULT_ENV_PREFIX: &str = "OMRS";

/// Main configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, serde_json::Value>> {
        self.config.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, serde_json::Value>> {
        self.config.write()
    }

    /// Merge prefixed variables from the process environment
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.merge_strings(loader.load());
        Ok(())
    }

    /// Merge prefixed variables from an explicit list of pairs
    pub fn load_vars<I>(&self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let loader = EnvLoader::new(self.env_prefix.clone());
        self.merge_strings(loader.collect(vars));
    }

    /// Load a `.env` file into the process environment, then merge the environment
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                // A missing default .env is not an error
                dotenvy::dotenv().ok();
            }
        }
        self.load_env()
    }

    /// Merge a configuration file; the format follows the extension
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::auto(path)?.load_file(path)?;
        self.merge_value(data);
        Ok(())
    }

    /// Merge configuration text of a known format
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.merge_value(data);
        Ok(())
    }

    fn merge_value(&self, data: serde_json::Value) {
        if let serde_json::Value::Object(map) = data {
            let mut config = self.write();
            for (key, value) in map {
                config.insert(key, value);
            }
        }
    }

    fn merge_strings(&self, values: HashMap<String, String>) {
        let mut config = self.write();
        for (key, value) in values {
            config.insert(key, serde_json::Value::String(value));
        }
    }

    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.write().insert(key.to_string(), json_value);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.read();

        let value = config
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(format!("{}: {}", key, e)))
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Deserialize every loaded key into `T` and run its validation
    pub fn extract<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = serde_json::Value::Object(
            self.read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        let extracted: T = serde_json::from_value(json_value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        extracted.validate()?;
        Ok(extracted)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
