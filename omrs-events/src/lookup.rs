//! Type lookup collaborator

use crate::error::TypeLookupError;
use crate::model::TypeDef;
use dashmap::DashMap;

/// Answers questions about the types known to the local server
pub trait TypeLookup: Send + Sync {
    /// Whether the type is known and active
    fn is_active_type(&self, source: &str, type_def_guid: &str, type_def_name: &str) -> bool;

    /// Fetch a full type definition
    fn get_type_def(
        &self,
        source: &str,
        type_def_guid: &str,
        type_def_name: &str,
    ) -> Result<TypeDef, TypeLookupError>;
}

/// Type store backed by a concurrent map keyed by type GUID
#[derive(Default)]
pub struct InMemoryTypeLookup {
    types: DashMap<String, TypeDef>,
}

impl InMemoryTypeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(types: impl IntoIterator<Item = TypeDef>) -> Self {
        let lookup = Self::new();
        for type_def in types {
            lookup.add_type_def(type_def);
        }
        lookup
    }

    /// Add or replace a type definition
    pub fn add_type_def(&self, type_def: TypeDef) {
        self.types.insert(type_def.guid().to_string(), type_def);
    }

    pub fn remove_type_def(&self, type_def_guid: &str) -> Option<TypeDef> {
        self.types.remove(type_def_guid).map(|(_, type_def)| type_def)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeLookup for InMemoryTypeLookup {
    fn is_active_type(&self, _source: &str, type_def_guid: &str, type_def_name: &str) -> bool {
        self.types
            .get(type_def_guid)
            .map(|t| t.name() == type_def_name && t.is_active())
            .unwrap_or(false)
    }

    fn get_type_def(
        &self,
        _source: &str,
        type_def_guid: &str,
        type_def_name: &str,
    ) -> Result<TypeDef, TypeLookupError> {
        self.types
            .get(type_def_guid)
            .filter(|t| t.name() == type_def_name)
            .map(|t| t.value().clone())
            .ok_or_else(|| TypeLookupError::NotFound {
                guid: type_def_guid.to_string(),
                name: type_def_name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDefCategory, TypeDefStatus, TypeDefSummary};

    fn asset() -> TypeDef {
        TypeDef::new(TypeDefSummary::new("t-asset", "Asset"), TypeDefCategory::Entity)
    }

    #[test]
    fn test_active_type_requires_matching_name() {
        let lookup = InMemoryTypeLookup::with_types([asset()]);

        assert!(lookup.is_active_type("test", "t-asset", "Asset"));
        assert!(!lookup.is_active_type("test", "t-asset", "DataSet"));
        assert!(!lookup.is_active_type("test", "t-other", "Asset"));
    }

    #[test]
    fn test_deprecated_type_is_not_active() {
        let mut deprecated = asset();
        deprecated.status = TypeDefStatus::Deprecated;
        let lookup = InMemoryTypeLookup::with_types([deprecated]);

        assert!(!lookup.is_active_type("test", "t-asset", "Asset"));
        assert!(lookup.get_type_def("test", "t-asset", "Asset").is_ok());
    }

    #[test]
    fn test_missing_type_is_not_found() {
        let lookup = InMemoryTypeLookup::new();
        assert_eq!(
            lookup.get_type_def("test", "g", "Nope"),
            Err(TypeLookupError::NotFound {
                guid: "g".to_string(),
                name: "Nope".to_string()
            })
        );
        lookup.add_type_def(asset());
        let removed = lookup.remove_type_def("t-asset").map(|t| t.summary.guid);
        assert_eq!(removed.as_deref(), Some("t-asset"));
        assert!(lookup.is_empty());
    }
}
