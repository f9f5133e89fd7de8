// Environment variable source

use std::collections::HashMap;
use std::env;

/// Reads `PREFIX_SOME_KEY=value` pairs and exposes them as `some_key`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load every variable of the process environment that carries the prefix
    pub fn load(&self) -> HashMap<String, String> {
        self.collect(env::vars())
    }

    /// Same as [`EnvLoader::load`] over an explicit set of pairs
    pub fn collect<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| self.normalize(&key).map(|key| (key, value)))
            .collect()
    }

    /// Look up a single key, applying the prefix
    pub fn load_var(&self, key: &str) -> Option<String> {
        env::var(self.full_key(key)).ok()
    }

    /// Look up a single key, falling back to `default`
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn normalize(&self, key: &str) -> Option<String> {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty())
                .map(str::to_lowercase),
            None => Some(key.to_lowercase()),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
