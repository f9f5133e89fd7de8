//! Exchange rules: which type and instance events a cohort connection cares about

use crate::error::{EventError, Result};
use crate::lookup::TypeLookup;
use crate::model::{InstanceHeader, TypeDefSummary};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeRuleMode {
    /// Every type and instance event
    All,
    /// Registry traffic only
    RegistrationOnly,
    /// Type definition events, no instances
    JustTypeDefs,
    /// Instances of a fixed set of types
    SelectedTypes,
    /// Instances of types added as they are seen
    LearnedTypes,
}

impl ExchangeRuleMode {
    /// Whether this mode consults the selected-type map
    pub fn uses_selected_types(&self) -> bool {
        matches!(self, Self::SelectedTypes | Self::LearnedTypes)
    }
}

/// Exchange rule evaluator
///
/// Under [`ExchangeRuleMode::SelectedTypes`] the type map is fixed when the rule
/// is built. Under [`ExchangeRuleMode::LearnedTypes`] it only ever grows.
pub struct ExchangeRule {
    source_name: String,
    type_lookup: Arc<dyn TypeLookup>,
    mode: ExchangeRuleMode,
    selected_types: DashMap<String, TypeDefSummary>,
}

impl ExchangeRule {
    pub fn builder() -> ExchangeRuleBuilder {
        ExchangeRuleBuilder::new()
    }

    pub fn mode(&self) -> ExchangeRuleMode {
        self.mode
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn selected_type_count(&self) -> usize {
        self.selected_types.len()
    }

    pub fn is_selected(&self, type_def_guid: &str) -> bool {
        self.selected_types.contains_key(type_def_guid)
    }

    /// Whether type definition events are passed on
    pub fn process_type_def_events(&self) -> bool {
        self.mode != ExchangeRuleMode::RegistrationOnly
    }

    /// Whether events about instances of the given type are passed on
    pub fn process_instance_event(&self, type_def_guid: &str, type_def_name: &str) -> bool {
        if matches!(
            self.mode,
            ExchangeRuleMode::RegistrationOnly | ExchangeRuleMode::JustTypeDefs
        ) {
            return false;
        }

        if type_def_guid.is_empty() || type_def_name.is_empty() {
            return false;
        }

        if !self
            .type_lookup
            .is_active_type(&self.source_name, type_def_guid, type_def_name)
        {
            return false;
        }

        match self.mode {
            ExchangeRuleMode::All => true,
            _ => self.selected_types.contains_key(type_def_guid),
        }
    }

    pub fn process_instance_type(&self, summary: Option<&TypeDefSummary>) -> bool {
        summary.is_some_and(|s| self.process_instance_event(&s.guid, &s.name))
    }

    pub fn process_instance_header(&self, header: Option<&InstanceHeader>) -> bool {
        header
            .and_then(|h| h.instance_type.as_ref())
            .is_some_and(|t| self.process_instance_event(&t.type_def_guid, &t.type_def_name))
    }

    /// Add the instance's type to the learned set.
    ///
    /// Returns true when the type is (now) part of the set, meaning the instance
    /// should be kept as a reference copy. Returns false outside learned-types
    /// mode, for untyped or inactive instances, and when the type definition
    /// cannot be fetched right now; the next instance of the type retries.
    pub fn learn_instance_event(&self, header: &InstanceHeader) -> bool {
        if self.mode != ExchangeRuleMode::LearnedTypes {
            return false;
        }

        let Some(instance_type) = &header.instance_type else {
            return false;
        };
        let (guid, name) = (&instance_type.type_def_guid, &instance_type.type_def_name);

        if !self.type_lookup.is_active_type(&self.source_name, guid, name) {
            return false;
        }

        if self.selected_types.contains_key(guid) {
            return true;
        }

        match self.type_lookup.get_type_def(&self.source_name, guid, name) {
            Ok(type_def) => {
                debug!(source = %self.source_name, type_name = %name, "Learned type");
                self.selected_types
                    .entry(guid.clone())
                    .or_insert(type_def.summary);
                true
            }
            Err(e) => {
                debug!(source = %self.source_name, type_name = %name, "Type not learned yet: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ExchangeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRule")
            .field("source_name", &self.source_name)
            .field("mode", &self.mode)
            .field("selected_types", &self.selected_types.len())
            .finish()
    }
}

/// Exchange rule builder
pub struct ExchangeRuleBuilder {
    source_name: Option<String>,
    type_lookup: Option<Arc<dyn TypeLookup>>,
    mode: Option<ExchangeRuleMode>,
    selected_types: Vec<TypeDefSummary>,
}

impl ExchangeRuleBuilder {
    pub fn new() -> Self {
        Self {
            source_name: None,
            type_lookup: None,
            mode: None,
            selected_types: Vec::new(),
        }
    }

    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn type_lookup(mut self, type_lookup: Arc<dyn TypeLookup>) -> Self {
        self.type_lookup = Some(type_lookup);
        self
    }

    pub fn mode(mut self, mode: ExchangeRuleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Initial type set, indexed by GUID
    pub fn selected_types(mut self, types: impl IntoIterator<Item = TypeDefSummary>) -> Self {
        self.selected_types.extend(types);
        self
    }

    pub fn build(self) -> Result<ExchangeRule> {
        let source_name = self
            .source_name
            .filter(|name| !name.is_empty())
            .ok_or(EventError::MissingDependency("exchange rule source name"))?;
        let type_lookup = self
            .type_lookup
            .ok_or(EventError::MissingDependency("exchange rule type lookup"))?;
        let mode = self
            .mode
            .ok_or(EventError::MissingDependency("exchange rule mode"))?;

        let selected_types = DashMap::new();
        for summary in self.selected_types {
            selected_types.insert(summary.guid.clone(), summary);
        }

        Ok(ExchangeRule {
            source_name,
            type_lookup,
            mode,
            selected_types,
        })
    }
}

impl Default for ExchangeRuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeLookupError;
    use crate::lookup::InMemoryTypeLookup;
    use crate::model::{InstanceType, TypeDef, TypeDefCategory};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn lookup() -> Arc<InMemoryTypeLookup> {
        Arc::new(InMemoryTypeLookup::with_types([
            TypeDef::new(TypeDefSummary::new("g1", "Asset"), TypeDefCategory::Entity),
            TypeDef::new(TypeDefSummary::new("g2", "DataSet"), TypeDefCategory::Entity),
        ]))
    }

    fn rule(mode: ExchangeRuleMode, selected: Vec<TypeDefSummary>) -> ExchangeRule {
        ExchangeRule::builder()
            .source_name("test")
            .type_lookup(lookup())
            .mode(mode)
            .selected_types(selected)
            .build()
            .unwrap()
    }

    fn header(guid: &str, name: &str) -> InstanceHeader {
        InstanceHeader::new("e1", InstanceType::new(guid, name, TypeDefCategory::Entity))
    }

    #[test]
    fn test_mode_table() {
        let cases = [
            (ExchangeRuleMode::All, true, true, true),
            (ExchangeRuleMode::RegistrationOnly, false, false, false),
            (ExchangeRuleMode::JustTypeDefs, true, false, false),
            (ExchangeRuleMode::SelectedTypes, true, true, false),
            (ExchangeRuleMode::LearnedTypes, true, true, false),
        ];

        for (mode, type_defs, asset, data_set) in cases {
            let rule = rule(mode, vec![TypeDefSummary::new("g1", "Asset")]);
            assert_eq!(rule.process_type_def_events(), type_defs, "{:?}", mode);
            assert_eq!(rule.process_instance_event("g1", "Asset"), asset, "{:?}", mode);
            assert_eq!(rule.process_instance_event("g2", "DataSet"), data_set, "{:?}", mode);
        }
    }

    #[test]
    fn test_empty_ids_and_inactive_types_rejected() {
        let rule = rule(ExchangeRuleMode::All, vec![]);
        assert!(!rule.process_instance_event("", "Asset"));
        assert!(!rule.process_instance_event("g1", ""));
        assert!(!rule.process_instance_event("g9", "Unknown"));
    }

    #[test]
    fn test_overloads_reject_missing_input() {
        let rule = rule(ExchangeRuleMode::All, vec![]);
        assert!(!rule.process_instance_type(None));
        assert!(!rule.process_instance_header(None));
        assert!(rule.process_instance_type(Some(&TypeDefSummary::new("g1", "Asset"))));

        let mut untyped = header("g1", "Asset");
        assert!(rule.process_instance_header(Some(&untyped)));
        untyped.instance_type = None;
        assert!(!rule.process_instance_header(Some(&untyped)));
    }

    #[test]
    fn test_learned_types_grow_on_first_sight() {
        let rule = rule(ExchangeRuleMode::LearnedTypes, vec![]);
        let instance = header("g2", "DataSet");

        assert!(!rule.process_instance_event("g2", "DataSet"));
        assert!(rule.learn_instance_event(&instance));
        assert!(rule.process_instance_event("g2", "DataSet"));
        assert!(rule.learn_instance_event(&instance));
        assert_eq!(rule.selected_type_count(), 1);
    }

    #[test]
    fn test_selected_types_never_learn() {
        let rule = rule(ExchangeRuleMode::SelectedTypes, vec![TypeDefSummary::new("g1", "Asset")]);
        assert!(!rule.learn_instance_event(&header("g2", "DataSet")));
        assert!(!rule.is_selected("g2"));
        assert_eq!(rule.selected_type_count(), 1);
    }

    #[test]
    fn test_inactive_type_not_learned() {
        let rule = rule(ExchangeRuleMode::LearnedTypes, vec![]);
        assert!(!rule.learn_instance_event(&header("g9", "Unknown")));
        assert_eq!(rule.selected_type_count(), 0);
    }

    struct FlakyLookup {
        available: AtomicBool,
    }

    impl TypeLookup for FlakyLookup {
        fn is_active_type(&self, _: &str, _: &str, _: &str) -> bool {
            true
        }

        fn get_type_def(&self, _: &str, guid: &str, name: &str) -> std::result::Result<TypeDef, TypeLookupError> {
            if self.available.load(Ordering::SeqCst) {
                Ok(TypeDef::new(TypeDefSummary::new(guid, name), TypeDefCategory::Entity))
            } else {
                Err(TypeLookupError::Unavailable("type store restarting".to_string()))
            }
        }
    }

    #[test]
    fn test_lookup_failure_retried_next_time() {
        let flaky = Arc::new(FlakyLookup {
            available: AtomicBool::new(false),
        });
        let rule = ExchangeRule::builder()
            .source_name("test")
            .type_lookup(flaky.clone())
            .mode(ExchangeRuleMode::LearnedTypes)
            .build()
            .unwrap();
        let instance = header("g3", "Process");

        assert!(!rule.learn_instance_event(&instance));
        assert!(!rule.process_instance_event("g3", "Process"));

        flaky.available.store(true, Ordering::SeqCst);
        assert!(rule.learn_instance_event(&instance));
        assert!(rule.process_instance_event("g3", "Process"));
    }

    #[test]
    fn test_missing_dependencies_are_fatal() {
        let no_name = ExchangeRule::builder()
            .type_lookup(lookup())
            .mode(ExchangeRuleMode::All)
            .build();
        assert!(matches!(no_name, Err(EventError::MissingDependency(_))));

        let empty_name = ExchangeRule::builder()
            .source_name("")
            .type_lookup(lookup())
            .mode(ExchangeRuleMode::All)
            .build();
        assert!(matches!(empty_name, Err(EventError::MissingDependency(_))));

        let no_lookup = ExchangeRule::builder()
            .source_name("test")
            .mode(ExchangeRuleMode::All)
            .build();
        assert!(matches!(no_lookup, Err(EventError::MissingDependency(_))));

        let no_mode = ExchangeRule::builder()
            .source_name("test")
            .type_lookup(lookup())
            .build();
        assert!(matches!(no_mode, Err(EventError::MissingDependency(_))));
    }
}
