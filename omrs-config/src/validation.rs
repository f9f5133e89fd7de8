// Configuration validation

use crate::{ConfigError, Result};

/// Implemented by settings structs extracted through [`crate::ConfigManager::extract`]
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable field checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject empty or whitespace-only values
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Reject values outside `allowed`
    pub fn one_of<T: PartialEq + std::fmt::Debug>(value: &T, allowed: &[T], field: &str) -> Result<()> {
        if !allowed.contains(value) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of {:?}",
                field, allowed
            )));
        }
        Ok(())
    }

    /// Reject duplicate entries, typically GUID lists
    pub fn unique<'a, I>(values: I, field: &str) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = std::collections::HashSet::new();
        for value in values {
            if !seen.insert(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} contains duplicate entry {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}
