//! Cohort event definitions
//!
//! Every event is an originator plus a tagged body. The body enums hold exactly
//! the fields each kind of notification carries; the flat `*Kind` enums are the
//! tags used on the wire and in logs.

use crate::model::{
    AttributeTypeDef, Classification, EntityDetail, InstanceGraph, InstanceProvenance,
    InstanceRef, Relationship, TypeDef, TypeDefPatch, TypeDefSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the repository that produced an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventOriginator {
    pub metadata_collection_id: String,
    pub server_name: Option<String>,
    pub server_type: Option<String>,
    pub organization_name: Option<String>,
}

impl EventOriginator {
    pub fn new(metadata_collection_id: impl Into<String>) -> Self {
        Self {
            metadata_collection_id: metadata_collection_id.into(),
            server_name: None,
            server_type: None,
            organization_name: None,
        }
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub fn server_type(mut self, server_type: impl Into<String>) -> Self {
        self.server_type = Some(server_type.into());
        self
    }

    pub fn organization_name(mut self, name: impl Into<String>) -> Self {
        self.organization_name = Some(name.into());
        self
    }
}

// ============================================================================
// Type definition events
// ============================================================================

/// Two repositories hold different definitions under the same type identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefConflict {
    pub originator_type_def: TypeDefSummary,
    pub other_metadata_collection_id: String,
    pub conflicting_type_def: TypeDefSummary,
    pub error_message: String,
}

/// A patch could not be applied because the target holds another version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefPatchMismatch {
    pub target_metadata_collection_id: String,
    pub target_type_def: TypeDefSummary,
    pub other_type_def: TypeDef,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefEventBody {
    NewTypeDef {
        type_def: TypeDef,
    },
    NewAttributeTypeDef {
        attribute_type_def: AttributeTypeDef,
    },
    UpdatedTypeDef {
        patch: TypeDefPatch,
    },
    DeletedTypeDef {
        type_def_guid: String,
        type_def_name: String,
    },
    DeletedAttributeTypeDef {
        attribute_type_def_guid: String,
        attribute_type_def_name: String,
    },
    ReIdentifiedTypeDef {
        original: TypeDefSummary,
        type_def: TypeDef,
    },
    ReIdentifiedAttributeTypeDef {
        original_guid: String,
        original_name: String,
        attribute_type_def: AttributeTypeDef,
    },
    Conflict(TypeDefConflict),
    PatchMismatch(TypeDefPatchMismatch),
}

/// Wire tag of a type definition event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefEventKind {
    NewTypeDefEvent,
    NewAttributeTypeDefEvent,
    UpdatedTypeDefEvent,
    DeletedTypeDefEvent,
    DeletedAttributeTypeDefEvent,
    ReIdentifiedTypeDefEvent,
    ReIdentifiedAttributeTypeDefEvent,
    TypeDefErrorEvent,
    /// Tag from a newer protocol revision
    #[serde(other)]
    Unknown,
}

/// Secondary tag of a [`TypeDefEventKind::TypeDefErrorEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefErrorCode {
    ConflictingTypeDefs,
    InvalidTypeDefPatch,
    #[serde(other)]
    Unknown,
}

impl TypeDefEventBody {
    pub fn kind(&self) -> TypeDefEventKind {
        match self {
            Self::NewTypeDef { .. } => TypeDefEventKind::NewTypeDefEvent,
            Self::NewAttributeTypeDef { .. } => TypeDefEventKind::NewAttributeTypeDefEvent,
            Self::UpdatedTypeDef { .. } => TypeDefEventKind::UpdatedTypeDefEvent,
            Self::DeletedTypeDef { .. } => TypeDefEventKind::DeletedTypeDefEvent,
            Self::DeletedAttributeTypeDef { .. } => TypeDefEventKind::DeletedAttributeTypeDefEvent,
            Self::ReIdentifiedTypeDef { .. } => TypeDefEventKind::ReIdentifiedTypeDefEvent,
            Self::ReIdentifiedAttributeTypeDef { .. } => {
                TypeDefEventKind::ReIdentifiedAttributeTypeDefEvent
            }
            Self::Conflict(_) | Self::PatchMismatch(_) => TypeDefEventKind::TypeDefErrorEvent,
        }
    }

    pub fn error_code(&self) -> Option<TypeDefErrorCode> {
        match self {
            Self::Conflict(_) => Some(TypeDefErrorCode::ConflictingTypeDefs),
            Self::PatchMismatch(_) => Some(TypeDefErrorCode::InvalidTypeDefPatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefEvent {
    pub originator: EventOriginator,
    pub body: TypeDefEventBody,
}

impl TypeDefEvent {
    pub fn new(originator: EventOriginator, body: TypeDefEventBody) -> Self {
        Self { originator, body }
    }

    pub fn kind(&self) -> TypeDefEventKind {
        self.body.kind()
    }
}

// ============================================================================
// Instance events
// ============================================================================

/// Two repositories claim the same instance GUID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConflict {
    pub target_metadata_collection_id: String,
    pub target_type_def: TypeDefSummary,
    pub target_instance_guid: String,
    pub other_metadata_collection_id: String,
    pub other_origin: InstanceProvenance,
    pub other_type_def: TypeDefSummary,
    pub other_instance_guid: String,
    pub error_message: String,
}

/// An instance is held with a different type than its home repository uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConflict {
    pub target_metadata_collection_id: String,
    pub target_type_def: TypeDefSummary,
    pub target_instance_guid: String,
    pub other_type_def: TypeDefSummary,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceEventBody {
    NewEntity {
        entity: EntityDetail,
    },
    UpdatedEntity {
        old_entity: Option<EntityDetail>,
        new_entity: EntityDetail,
    },
    UndoneEntity {
        entity: EntityDetail,
    },
    ClassifiedEntity {
        entity: EntityDetail,
        classification: Classification,
    },
    DeclassifiedEntity {
        entity: EntityDetail,
        original_classification: Classification,
    },
    ReclassifiedEntity {
        entity: EntityDetail,
        original_classification: Classification,
        classification: Classification,
    },
    DeletedEntity {
        entity: EntityDetail,
    },
    DeletePurgedEntity {
        entity: EntityDetail,
    },
    PurgedEntity {
        instance: InstanceRef,
    },
    RestoredEntity {
        entity: EntityDetail,
    },
    ReIdentifiedEntity {
        original_guid: String,
        entity: EntityDetail,
    },
    RetypedEntity {
        original_type: TypeDefSummary,
        entity: EntityDetail,
    },
    ReHomedEntity {
        original_home_metadata_collection_id: String,
        entity: EntityDetail,
    },
    RefreshEntityRequest {
        instance: InstanceRef,
        home_metadata_collection_id: String,
    },
    RefreshedEntity {
        entity: EntityDetail,
    },
    NewRelationship {
        relationship: Relationship,
    },
    UpdatedRelationship {
        old_relationship: Option<Relationship>,
        new_relationship: Relationship,
    },
    UndoneRelationship {
        relationship: Relationship,
    },
    DeletedRelationship {
        relationship: Relationship,
    },
    DeletePurgedRelationship {
        relationship: Relationship,
    },
    PurgedRelationship {
        instance: InstanceRef,
    },
    RestoredRelationship {
        relationship: Relationship,
    },
    ReIdentifiedRelationship {
        original_guid: String,
        relationship: Relationship,
    },
    RetypedRelationship {
        original_type: TypeDefSummary,
        relationship: Relationship,
    },
    ReHomedRelationship {
        original_home_metadata_collection_id: String,
        relationship: Relationship,
    },
    RefreshRelationshipRequest {
        instance: InstanceRef,
        home_metadata_collection_id: String,
    },
    RefreshedRelationship {
        relationship: Relationship,
    },
    BatchInstances {
        graph: InstanceGraph,
    },
    ConflictingInstances(InstanceConflict),
    ConflictingType(TypeConflict),
}

/// Wire tag of an instance event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceEventKind {
    NewEntityEvent,
    UpdatedEntityEvent,
    UndoneEntityEvent,
    ClassifiedEntityEvent,
    DeclassifiedEntityEvent,
    ReclassifiedEntityEvent,
    DeletedEntityEvent,
    DeletePurgedEntityEvent,
    PurgedEntityEvent,
    RestoredEntityEvent,
    ReIdentifiedEntityEvent,
    RetypedEntityEvent,
    ReHomedEntityEvent,
    RefreshEntityRequest,
    RefreshedEntityEvent,
    NewRelationshipEvent,
    UpdatedRelationshipEvent,
    UndoneRelationshipEvent,
    DeletedRelationshipEvent,
    DeletePurgedRelationshipEvent,
    PurgedRelationshipEvent,
    RestoredRelationshipEvent,
    ReIdentifiedRelationshipEvent,
    RetypedRelationshipEvent,
    ReHomedRelationshipEvent,
    RefreshRelationshipRequest,
    RefreshedRelationshipEvent,
    BatchInstancesEvent,
    InstanceErrorEvent,
    /// Tag from a newer protocol revision
    #[serde(other)]
    Unknown,
}

/// Secondary tag of an [`InstanceEventKind::InstanceErrorEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceErrorCode {
    ConflictingInstances,
    ConflictingType,
    #[serde(other)]
    Unknown,
}

/// What an instance event is about, as far as filtering is concerned
#[derive(Debug, Clone, Copy)]
pub enum InstanceSubject<'a> {
    Entity(&'a EntityDetail),
    Relationship(&'a Relationship),
    Reference(&'a InstanceRef),
    Batch(&'a InstanceGraph),
    Conflict {
        target: &'a TypeDefSummary,
        other: &'a TypeDefSummary,
    },
}

impl InstanceEventBody {
    pub fn kind(&self) -> InstanceEventKind {
        use InstanceEventKind as K;
        match self {
            Self::NewEntity { .. } => K::NewEntityEvent,
            Self::UpdatedEntity { .. } => K::UpdatedEntityEvent,
            Self::UndoneEntity { .. } => K::UndoneEntityEvent,
            Self::ClassifiedEntity { .. } => K::ClassifiedEntityEvent,
            Self::DeclassifiedEntity { .. } => K::DeclassifiedEntityEvent,
            Self::ReclassifiedEntity { .. } => K::ReclassifiedEntityEvent,
            Self::DeletedEntity { .. } => K::DeletedEntityEvent,
            Self::DeletePurgedEntity { .. } => K::DeletePurgedEntityEvent,
            Self::PurgedEntity { .. } => K::PurgedEntityEvent,
            Self::RestoredEntity { .. } => K::RestoredEntityEvent,
            Self::ReIdentifiedEntity { .. } => K::ReIdentifiedEntityEvent,
            Self::RetypedEntity { .. } => K::RetypedEntityEvent,
            Self::ReHomedEntity { .. } => K::ReHomedEntityEvent,
            Self::RefreshEntityRequest { .. } => K::RefreshEntityRequest,
            Self::RefreshedEntity { .. } => K::RefreshedEntityEvent,
            Self::NewRelationship { .. } => K::NewRelationshipEvent,
            Self::UpdatedRelationship { .. } => K::UpdatedRelationshipEvent,
            Self::UndoneRelationship { .. } => K::UndoneRelationshipEvent,
            Self::DeletedRelationship { .. } => K::DeletedRelationshipEvent,
            Self::DeletePurgedRelationship { .. } => K::DeletePurgedRelationshipEvent,
            Self::PurgedRelationship { .. } => K::PurgedRelationshipEvent,
            Self::RestoredRelationship { .. } => K::RestoredRelationshipEvent,
            Self::ReIdentifiedRelationship { .. } => K::ReIdentifiedRelationshipEvent,
            Self::RetypedRelationship { .. } => K::RetypedRelationshipEvent,
            Self::ReHomedRelationship { .. } => K::ReHomedRelationshipEvent,
            Self::RefreshRelationshipRequest { .. } => K::RefreshRelationshipRequest,
            Self::RefreshedRelationship { .. } => K::RefreshedRelationshipEvent,
            Self::BatchInstances { .. } => K::BatchInstancesEvent,
            Self::ConflictingInstances(_) | Self::ConflictingType(_) => K::InstanceErrorEvent,
        }
    }

    pub fn error_code(&self) -> Option<InstanceErrorCode> {
        match self {
            Self::ConflictingInstances(_) => Some(InstanceErrorCode::ConflictingInstances),
            Self::ConflictingType(_) => Some(InstanceErrorCode::ConflictingType),
            _ => None,
        }
    }

    pub fn subject(&self) -> InstanceSubject<'_> {
        match self {
            Self::NewEntity { entity }
            | Self::UpdatedEntity {
                new_entity: entity, ..
            }
            | Self::UndoneEntity { entity }
            | Self::ClassifiedEntity { entity, .. }
            | Self::DeclassifiedEntity { entity, .. }
            | Self::ReclassifiedEntity { entity, .. }
            | Self::DeletedEntity { entity }
            | Self::DeletePurgedEntity { entity }
            | Self::RestoredEntity { entity }
            | Self::ReIdentifiedEntity { entity, .. }
            | Self::RetypedEntity { entity, .. }
            | Self::ReHomedEntity { entity, .. }
            | Self::RefreshedEntity { entity } => InstanceSubject::Entity(entity),
            Self::NewRelationship { relationship }
            | Self::UpdatedRelationship {
                new_relationship: relationship,
                ..
            }
            | Self::UndoneRelationship { relationship }
            | Self::DeletedRelationship { relationship }
            | Self::DeletePurgedRelationship { relationship }
            | Self::RestoredRelationship { relationship }
            | Self::ReIdentifiedRelationship { relationship, .. }
            | Self::RetypedRelationship { relationship, .. }
            | Self::ReHomedRelationship { relationship, .. }
            | Self::RefreshedRelationship { relationship } => {
                InstanceSubject::Relationship(relationship)
            }
            Self::PurgedEntity { instance }
            | Self::RefreshEntityRequest { instance, .. }
            | Self::PurgedRelationship { instance }
            | Self::RefreshRelationshipRequest { instance, .. } => {
                InstanceSubject::Reference(instance)
            }
            Self::BatchInstances { graph } => InstanceSubject::Batch(graph),
            Self::ConflictingInstances(conflict) => InstanceSubject::Conflict {
                target: &conflict.target_type_def,
                other: &conflict.other_type_def,
            },
            Self::ConflictingType(conflict) => InstanceSubject::Conflict {
                target: &conflict.target_type_def,
                other: &conflict.other_type_def,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEvent {
    pub originator: EventOriginator,
    pub body: InstanceEventBody,
}

impl InstanceEvent {
    pub fn new(originator: EventOriginator, body: InstanceEventBody) -> Self {
        Self { originator, body }
    }

    pub fn kind(&self) -> InstanceEventKind {
        self.body.kind()
    }
}

// ============================================================================
// Registry events
// ============================================================================

/// Membership details announced when a repository joins or rejoins a cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    pub registration_time: DateTime<Utc>,
    pub metadata_collection_name: Option<String>,
    /// Opaque connection description peers use to call back
    pub remote_connection: Option<serde_json::Value>,
}

/// A registry problem reported about another member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryError {
    pub target_metadata_collection_id: String,
    pub target_remote_connection: Option<serde_json::Value>,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEventBody {
    Registration(RegistrationDetails),
    RefreshRegistrationRequest,
    ReRegistration(RegistrationDetails),
    Unregistration {
        metadata_collection_name: Option<String>,
    },
    ConflictingCollectionId(RegistryError),
    BadRemoteConnection(RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistryEventKind {
    RegistrationEvent,
    RefreshRegistrationRequest,
    ReRegistrationEvent,
    UnRegistrationEvent,
    RegistrationErrorEvent,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistryErrorCode {
    ConflictingCollectionId,
    BadRemoteConnection,
    #[serde(other)]
    Unknown,
}

impl RegistryEventBody {
    pub fn kind(&self) -> RegistryEventKind {
        match self {
            Self::Registration(_) => RegistryEventKind::RegistrationEvent,
            Self::RefreshRegistrationRequest => RegistryEventKind::RefreshRegistrationRequest,
            Self::ReRegistration(_) => RegistryEventKind::ReRegistrationEvent,
            Self::Unregistration { .. } => RegistryEventKind::UnRegistrationEvent,
            Self::ConflictingCollectionId(_) | Self::BadRemoteConnection(_) => {
                RegistryEventKind::RegistrationErrorEvent
            }
        }
    }

    pub fn error_code(&self) -> Option<RegistryErrorCode> {
        match self {
            Self::ConflictingCollectionId(_) => Some(RegistryErrorCode::ConflictingCollectionId),
            Self::BadRemoteConnection(_) => Some(RegistryErrorCode::BadRemoteConnection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub originator: EventOriginator,
    pub body: RegistryEventBody,
}

impl RegistryEvent {
    pub fn new(originator: EventOriginator, body: RegistryEventBody) -> Self {
        Self { originator, body }
    }

    pub fn kind(&self) -> RegistryEventKind {
        self.body.kind()
    }
}

macro_rules! display_as_wire_tag {
    ($($kind:ty),*) => {
        $(
            impl fmt::Display for $kind {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    match serde_json::to_value(self) {
                        Ok(serde_json::Value::String(tag)) => f.write_str(&tag),
                        _ => write!(f, "{:?}", self),
                    }
                }
            }
        )*
    };
}

display_as_wire_tag!(
    TypeDefEventKind,
    TypeDefErrorCode,
    InstanceEventKind,
    InstanceErrorCode,
    RegistryEventKind,
    RegistryErrorCode
);
