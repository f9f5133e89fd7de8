//! The slice of the open metadata type and instance model that event routing inspects.
//!
//! Properties are carried as opaque JSON; only identifiers, types and home
//! collections matter for distribution decisions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag for instances and classifications
pub type InstanceProperties = Map<String, Value>;

/// Which kind of instance a type describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefCategory {
    Entity,
    Relationship,
    Classification,
}

/// Identifying header of a type definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDefSummary {
    pub guid: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: i64,
    #[serde(default)]
    pub version_name: String,
}

fn default_version() -> i64 {
    1
}

impl TypeDefSummary {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            version: 1,
            version_name: "1.0".to_string(),
        }
    }

    pub fn with_version(mut self, version: i64, version_name: impl Into<String>) -> Self {
        self.version = version;
        self.version_name = version_name.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefStatus {
    #[default]
    Active,
    Deprecated,
}

/// A full type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(flatten)]
    pub summary: TypeDefSummary,
    pub category: TypeDefCategory,
    #[serde(default)]
    pub status: TypeDefStatus,
    pub super_type: Option<String>,
    pub description: Option<String>,
}

impl TypeDef {
    pub fn new(summary: TypeDefSummary, category: TypeDefCategory) -> Self {
        Self {
            summary,
            category,
            status: TypeDefStatus::Active,
            super_type: None,
            description: None,
        }
    }

    pub fn guid(&self) -> &str {
        &self.summary.guid
    }

    pub fn name(&self) -> &str {
        &self.summary.name
    }

    pub fn is_active(&self) -> bool {
        self.status == TypeDefStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeTypeDefCategory {
    Primitive,
    Collection,
    EnumDef,
}

/// Definition of an attribute type (primitive, collection or enumeration)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTypeDef {
    pub guid: String,
    pub name: String,
    pub category: AttributeTypeDefCategory,
    pub description: Option<String>,
}

/// A change to an existing type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefPatch {
    pub type_def_guid: String,
    pub type_def_name: String,
    pub apply_to_version: i64,
    pub update_to_version: i64,
    pub new_version_name: String,
    pub description: Option<String>,
}

/// The type of an instance as recorded in its header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceType {
    pub type_def_guid: String,
    pub type_def_name: String,
    pub category: TypeDefCategory,
    #[serde(default = "default_version")]
    pub version: i64,
}

impl InstanceType {
    pub fn new(
        type_def_guid: impl Into<String>,
        type_def_name: impl Into<String>,
        category: TypeDefCategory,
    ) -> Self {
        Self {
            type_def_guid: type_def_guid.into(),
            type_def_name: type_def_name.into(),
            category,
            version: 1,
        }
    }

    pub fn summary(&self) -> TypeDefSummary {
        TypeDefSummary {
            guid: self.type_def_guid.clone(),
            name: self.type_def_name.clone(),
            version: self.version,
            version_name: String::new(),
        }
    }
}

/// Where an instance came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceProvenance {
    #[default]
    LocalCohort,
    ExportArchive,
    ContentPack,
    DeregisteredRepository,
    Configuration,
    ExternalSource,
}

/// Common header of entities, relationships and proxies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceHeader {
    pub guid: String,
    pub instance_type: Option<InstanceType>,
    /// Home metadata collection of the instance
    pub metadata_collection_id: Option<String>,
    #[serde(default)]
    pub provenance: InstanceProvenance,
    #[serde(default = "default_version")]
    pub version: i64,
}

impl InstanceHeader {
    pub fn new(guid: impl Into<String>, instance_type: InstanceType) -> Self {
        Self {
            guid: guid.into(),
            instance_type: Some(instance_type),
            metadata_collection_id: None,
            provenance: InstanceProvenance::LocalCohort,
            version: 1,
        }
    }

    pub fn type_def_guid(&self) -> Option<&str> {
        self.instance_type.as_ref().map(|t| t.type_def_guid.as_str())
    }

    pub fn type_def_name(&self) -> Option<&str> {
        self.instance_type.as_ref().map(|t| t.type_def_name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub name: String,
    pub instance_type: Option<InstanceType>,
    #[serde(default)]
    pub properties: InstanceProperties,
}

impl Classification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_type: None,
            properties: InstanceProperties::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    #[serde(flatten)]
    pub header: InstanceHeader,
    #[serde(default)]
    pub properties: InstanceProperties,
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl EntityDetail {
    pub fn new(guid: impl Into<String>, instance_type: InstanceType) -> Self {
        Self {
            header: InstanceHeader::new(guid, instance_type),
            properties: InstanceProperties::new(),
            classifications: Vec::new(),
        }
    }

    pub fn homed_in(mut self, metadata_collection_id: impl Into<String>) -> Self {
        self.header.metadata_collection_id = Some(metadata_collection_id.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn guid(&self) -> &str {
        &self.header.guid
    }

    /// A proxy pointing at this entity
    pub fn proxy(&self) -> EntityProxy {
        EntityProxy {
            header: self.header.clone(),
        }
    }
}

/// Minimal stand-in for an entity at the end of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProxy {
    #[serde(flatten)]
    pub header: InstanceHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(flatten)]
    pub header: InstanceHeader,
    pub entity_one: Option<EntityProxy>,
    pub entity_two: Option<EntityProxy>,
    #[serde(default)]
    pub properties: InstanceProperties,
}

impl Relationship {
    pub fn new(
        guid: impl Into<String>,
        instance_type: InstanceType,
        entity_one: EntityProxy,
        entity_two: EntityProxy,
    ) -> Self {
        Self {
            header: InstanceHeader::new(guid, instance_type),
            entity_one: Some(entity_one),
            entity_two: Some(entity_two),
            properties: InstanceProperties::new(),
        }
    }

    pub fn homed_in(mut self, metadata_collection_id: impl Into<String>) -> Self {
        self.header.metadata_collection_id = Some(metadata_collection_id.into());
        self
    }

    pub fn guid(&self) -> &str {
        &self.header.guid
    }
}

/// Entities and relationships exchanged together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceGraph {
    #[serde(default)]
    pub entities: Vec<EntityDetail>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl InstanceGraph {
    pub fn new(entities: Vec<EntityDetail>, relationships: Vec<Relationship>) -> Self {
        Self {
            entities,
            relationships,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len() + self.relationships.len()
    }
}

/// Identifies an instance without carrying its content (purge and refresh requests)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub type_def_guid: String,
    pub type_def_name: String,
    pub category: TypeDefCategory,
    pub instance_guid: String,
}

impl InstanceRef {
    pub fn new(
        type_def_guid: impl Into<String>,
        type_def_name: impl Into<String>,
        category: TypeDefCategory,
        instance_guid: impl Into<String>,
    ) -> Self {
        Self {
            type_def_guid: type_def_guid.into(),
            type_def_name: type_def_name.into(),
            category,
            instance_guid: instance_guid.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_serializes_flat_header() {
        let entity = EntityDetail::new(
            "e1",
            InstanceType::new("t-asset", "Asset", TypeDefCategory::Entity),
        )
        .homed_in("A")
        .with_property("qualifiedName", "asset-1");

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["guid"], "e1");
        assert_eq!(json["metadata_collection_id"], "A");
        assert_eq!(json["instance_type"]["category"], "ENTITY");
        assert_eq!(json["properties"]["qualifiedName"], "asset-1");
    }

    #[test]
    fn test_summary_defaults_version() {
        let summary: TypeDefSummary =
            serde_json::from_str(r#"{"guid": "g1", "name": "Asset"}"#).unwrap();
        assert_eq!(summary.version, 1);
        assert!(summary.version_name.is_empty());
    }

    #[test]
    fn test_graph_len() {
        let asset = InstanceType::new("t-asset", "Asset", TypeDefCategory::Entity);
        let graph = InstanceGraph::new(vec![EntityDetail::new("e1", asset)], vec![]);
        assert_eq!(graph.len(), 1);
        assert!(!graph.is_empty());
        assert!(InstanceGraph::default().is_empty());
    }
}
