//! Cohort event settings loaded through `omrs-config`

use crate::error::Result;
use crate::event::EventOriginator;
use crate::lookup::TypeLookup;
use crate::model::TypeDefSummary;
use crate::rule::{ExchangeRule, ExchangeRuleMode};
use omrs_config::{ConfigError, ConfigManager, ConfigValidator, Validate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_exchange_rule() -> ExchangeRuleMode {
    ExchangeRuleMode::All
}

fn default_channel_capacity() -> usize {
    256
}

/// Settings for one cohort member's event handling.
///
/// With the default `OMRS` prefix, `OMRS_LOCAL_METADATA_COLLECTION_ID` and
/// `OMRS_EXCHANGE_RULE=learned_types` are picked up from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEventSettings {
    pub local_metadata_collection_id: String,

    #[serde(default)]
    pub local_server_name: Option<String>,

    #[serde(default)]
    pub local_server_type: Option<String>,

    #[serde(default)]
    pub organization_name: Option<String>,

    #[serde(default = "default_exchange_rule")]
    pub exchange_rule: ExchangeRuleMode,

    /// Types exchanged under `selected_types`, or the seed set under `learned_types`
    #[serde(default)]
    pub selected_types: Vec<TypeDefSummary>,

    /// Capacity of in-process transport channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl CohortEventSettings {
    pub fn new(local_metadata_collection_id: impl Into<String>) -> Self {
        Self {
            local_metadata_collection_id: local_metadata_collection_id.into(),
            local_server_name: None,
            local_server_type: None,
            organization_name: None,
            exchange_rule: default_exchange_rule(),
            selected_types: Vec::new(),
            channel_capacity: default_channel_capacity(),
        }
    }

    /// Extract and validate the settings from everything loaded into `config`
    pub fn load(config: &ConfigManager) -> Result<Self> {
        Ok(config.extract()?)
    }

    /// The originator stamped on events raised by this member
    pub fn originator(&self) -> EventOriginator {
        EventOriginator {
            metadata_collection_id: self.local_metadata_collection_id.clone(),
            server_name: self.local_server_name.clone(),
            server_type: self.local_server_type.clone(),
            organization_name: self.organization_name.clone(),
        }
    }

    pub fn exchange_rule(
        &self,
        source_name: impl Into<String>,
        type_lookup: Arc<dyn TypeLookup>,
    ) -> Result<ExchangeRule> {
        ExchangeRule::builder()
            .source_name(source_name)
            .type_lookup(type_lookup)
            .mode(self.exchange_rule)
            .selected_types(self.selected_types.iter().cloned())
            .build()
    }
}

impl Validate for CohortEventSettings {
    fn validate(&self) -> omrs_config::Result<()> {
        ConfigValidator::not_empty(
            &self.local_metadata_collection_id,
            "local_metadata_collection_id",
        )?;

        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be greater than zero".to_string(),
            ));
        }

        for summary in &self.selected_types {
            ConfigValidator::not_empty(&summary.guid, "selected_types.guid")?;
            ConfigValidator::not_empty(&summary.name, "selected_types.name")?;
        }
        ConfigValidator::unique(
            self.selected_types.iter().map(|t| t.guid.as_str()),
            "selected_types",
        )?;

        if self.exchange_rule == ExchangeRuleMode::SelectedTypes && self.selected_types.is_empty() {
            return Err(ConfigError::ValidationError(
                "selected_types is required when exchange_rule is selected_types".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::lookup::InMemoryTypeLookup;
    use omrs_config::FileFormat;

    #[test]
    fn test_load_from_toml() {
        let config = ConfigManager::new();
        config
            .load_str(
                r#"
local_metadata_collection_id = "A"
local_server_name = "cocoMDS1"
exchange_rule = "selected_types"

[[selected_types]]
guid = "g1"
name = "Asset"
"#,
                FileFormat::Toml,
            )
            .unwrap();

        let settings = CohortEventSettings::load(&config).unwrap();
        assert_eq!(settings.exchange_rule, ExchangeRuleMode::SelectedTypes);
        assert_eq!(settings.selected_types[0].version, 1);
        assert_eq!(settings.channel_capacity, 256);
        assert_eq!(settings.originator().server_name.as_deref(), Some("cocoMDS1"));

        let rule = settings
            .exchange_rule("test", Arc::new(InMemoryTypeLookup::new()))
            .unwrap();
        assert!(rule.is_selected("g1"));
    }

    #[test]
    fn test_load_from_prefixed_environment() {
        let config = ConfigManager::with_prefix(omrs_config::DEFAULT_ENV_PREFIX);
        config.load_vars([
            ("OMRS_LOCAL_METADATA_COLLECTION_ID".to_string(), "A".to_string()),
            ("OMRS_EXCHANGE_RULE".to_string(), "learned_types".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ]);

        let settings = CohortEventSettings::load(&config).unwrap();
        assert_eq!(settings.local_metadata_collection_id, "A");
        assert_eq!(settings.exchange_rule, ExchangeRuleMode::LearnedTypes);
    }

    #[test]
    fn test_selected_types_mode_needs_types() {
        let mut settings = CohortEventSettings::new("A");
        settings.exchange_rule = ExchangeRuleMode::SelectedTypes;
        assert!(settings.validate().is_err());

        settings.selected_types = vec![
            TypeDefSummary::new("g1", "Asset"),
            TypeDefSummary::new("g1", "Asset"),
        ];
        assert!(settings.validate().is_err());

        settings.selected_types.pop();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_collection_id_reported() {
        let config = ConfigManager::new();
        config.set("exchange_rule", "all").unwrap();

        let result = CohortEventSettings::load(&config);
        assert!(matches!(result, Err(EventError::Config(_))));
    }
}
