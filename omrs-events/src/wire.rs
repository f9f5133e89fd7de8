//! Cohort wire record
//!
//! A [`CohortEnvelope`] is the flat, tag-plus-optional-fields form in which
//! events travel between cohort members. Kind and error-code tags from newer
//! peers decode to `Unknown` instead of failing, and [`CohortEnvelope::decode`]
//! turns them into a [`DecodeError`] so the listener can discard them. Turning
//! envelopes into bytes is the transport's business.

use crate::event::{
    EventOriginator, InstanceConflict, InstanceErrorCode, InstanceEvent, InstanceEventBody,
    InstanceEventKind, RegistrationDetails, RegistryError, RegistryErrorCode, RegistryEvent,
    RegistryEventBody, RegistryEventKind, TypeConflict, TypeDefConflict, TypeDefErrorCode,
    TypeDefEvent, TypeDefEventBody, TypeDefEventKind, TypeDefPatchMismatch,
};
use crate::model::{
    AttributeTypeDef, Classification, EntityDetail, InstanceGraph, InstanceRef, Relationship,
    TypeDef, TypeDefPatch, TypeDefSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const PROTOCOL_VERSION: &str = "V1";

/// Event category, one processor slot per category on the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Registry,
    TypeDef,
    Instance,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Registry => f.write_str("registry"),
            EventCategory::TypeDef => f.write_str("type_def"),
            EventCategory::Instance => f.write_str("instance"),
        }
    }
}

/// Why an envelope could not be turned into a typed event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Envelope has no originator")]
    MissingOriginator,

    #[error("{0} envelope has no event kind")]
    MissingKind(EventCategory),

    #[error("Unknown {0} event kind")]
    UnknownKind(EventCategory),

    #[error("Unknown or missing {0} error code")]
    UnknownErrorCode(EventCategory),

    #[error("{kind} is missing field '{field}'")]
    MissingField { kind: String, field: &'static str },
}

/// A decoded envelope
#[derive(Debug, Clone, PartialEq)]
pub enum CohortEvent {
    Registry(RegistryEvent),
    TypeDef(TypeDefEvent),
    Instance(InstanceEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEnvelope {
    pub protocol_version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub originator: Option<EventOriginator>,
    pub section: EnvelopeSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum EnvelopeSection {
    Registry(RegistrySection),
    TypeDef(TypeDefSection),
    Instance(InstanceSection),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<RegistryEventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<RegistryErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_collection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RegistryError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<TypeDefEventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<TypeDefErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_def: Option<TypeDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_type_def: Option<AttributeTypeDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<TypeDefPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_def_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_def_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_type_def: Option<TypeDefSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<TypeDefConflict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch_mismatch: Option<TypeDefPatchMismatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<InstanceEventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<InstanceErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_entity: Option<EntityDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_relationship: Option<Relationship>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_type: Option<TypeDefSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_home_metadata_collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_metadata_collection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<InstanceGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_conflict: Option<InstanceConflict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_conflict: Option<TypeConflict>,
}

impl CohortEnvelope {
    pub fn new(originator: Option<EventOriginator>, section: EnvelopeSection) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            timestamp: Utc::now(),
            originator,
            section,
        }
    }

    pub fn category(&self) -> EventCategory {
        match &self.section {
            EnvelopeSection::Registry(_) => EventCategory::Registry,
            EnvelopeSection::TypeDef(_) => EventCategory::TypeDef,
            EnvelopeSection::Instance(_) => EventCategory::Instance,
        }
    }

    pub fn originator_id(&self) -> Option<&str> {
        self.originator
            .as_ref()
            .map(|o| o.metadata_collection_id.as_str())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Turn the envelope into a typed event
    pub fn decode(self) -> Result<CohortEvent, DecodeError> {
        let originator = self.originator.ok_or(DecodeError::MissingOriginator)?;

        match self.section {
            EnvelopeSection::Registry(section) => {
                Ok(CohortEvent::Registry(RegistryEvent::new(originator, section.decode()?)))
            }
            EnvelopeSection::TypeDef(section) => {
                Ok(CohortEvent::TypeDef(TypeDefEvent::new(originator, section.decode()?)))
            }
            EnvelopeSection::Instance(section) => {
                Ok(CohortEvent::Instance(InstanceEvent::new(originator, section.decode()?)))
            }
        }
    }
}

fn required<T>(value: Option<T>, kind: impl fmt::Display, field: &'static str) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::MissingField {
        kind: kind.to_string(),
        field,
    })
}

impl RegistrySection {
    fn decode(self) -> Result<RegistryEventBody, DecodeError> {
        use RegistryEventKind as K;

        let kind = self
            .event_type
            .ok_or(DecodeError::MissingKind(EventCategory::Registry))?;

        match kind {
            K::RegistrationEvent => Ok(RegistryEventBody::Registration(required(
                self.registration,
                kind,
                "registration",
            )?)),
            K::RefreshRegistrationRequest => Ok(RegistryEventBody::RefreshRegistrationRequest),
            K::ReRegistrationEvent => Ok(RegistryEventBody::ReRegistration(required(
                self.registration,
                kind,
                "registration",
            )?)),
            K::UnRegistrationEvent => Ok(RegistryEventBody::Unregistration {
                metadata_collection_name: self.metadata_collection_name,
            }),
            K::RegistrationErrorEvent => {
                let error = required(self.error, kind, "error");
                match self.error_code {
                    Some(RegistryErrorCode::ConflictingCollectionId) => {
                        Ok(RegistryEventBody::ConflictingCollectionId(error?))
                    }
                    Some(RegistryErrorCode::BadRemoteConnection) => {
                        Ok(RegistryEventBody::BadRemoteConnection(error?))
                    }
                    Some(RegistryErrorCode::Unknown) | None => {
                        Err(DecodeError::UnknownErrorCode(EventCategory::Registry))
                    }
                }
            }
            K::Unknown => Err(DecodeError::UnknownKind(EventCategory::Registry)),
        }
    }
}

impl TypeDefSection {
    fn decode(self) -> Result<TypeDefEventBody, DecodeError> {
        use TypeDefEventKind as K;

        let kind = self
            .event_type
            .ok_or(DecodeError::MissingKind(EventCategory::TypeDef))?;

        match kind {
            K::NewTypeDefEvent => Ok(TypeDefEventBody::NewTypeDef {
                type_def: required(self.type_def, kind, "type_def")?,
            }),
            K::NewAttributeTypeDefEvent => Ok(TypeDefEventBody::NewAttributeTypeDef {
                attribute_type_def: required(self.attribute_type_def, kind, "attribute_type_def")?,
            }),
            K::UpdatedTypeDefEvent => Ok(TypeDefEventBody::UpdatedTypeDef {
                patch: required(self.patch, kind, "patch")?,
            }),
            K::DeletedTypeDefEvent => Ok(TypeDefEventBody::DeletedTypeDef {
                type_def_guid: required(self.type_def_guid, kind, "type_def_guid")?,
                type_def_name: required(self.type_def_name, kind, "type_def_name")?,
            }),
            K::DeletedAttributeTypeDefEvent => Ok(TypeDefEventBody::DeletedAttributeTypeDef {
                attribute_type_def_guid: required(self.type_def_guid, kind, "type_def_guid")?,
                attribute_type_def_name: required(self.type_def_name, kind, "type_def_name")?,
            }),
            K::ReIdentifiedTypeDefEvent => Ok(TypeDefEventBody::ReIdentifiedTypeDef {
                original: required(self.original_type_def, kind, "original_type_def")?,
                type_def: required(self.type_def, kind, "type_def")?,
            }),
            K::ReIdentifiedAttributeTypeDefEvent => {
                let original = required(self.original_type_def, kind, "original_type_def")?;
                Ok(TypeDefEventBody::ReIdentifiedAttributeTypeDef {
                    original_guid: original.guid,
                    original_name: original.name,
                    attribute_type_def: required(
                        self.attribute_type_def,
                        kind,
                        "attribute_type_def",
                    )?,
                })
            }
            K::TypeDefErrorEvent => match self.error_code {
                Some(TypeDefErrorCode::ConflictingTypeDefs) => Ok(TypeDefEventBody::Conflict(
                    required(self.conflict, kind, "conflict")?,
                )),
                Some(TypeDefErrorCode::InvalidTypeDefPatch) => Ok(TypeDefEventBody::PatchMismatch(
                    required(self.patch_mismatch, kind, "patch_mismatch")?,
                )),
                Some(TypeDefErrorCode::Unknown) | None => {
                    Err(DecodeError::UnknownErrorCode(EventCategory::TypeDef))
                }
            },
            K::Unknown => Err(DecodeError::UnknownKind(EventCategory::TypeDef)),
        }
    }
}

impl InstanceSection {
    fn decode(self) -> Result<InstanceEventBody, DecodeError> {
        use InstanceEventBody as B;
        use InstanceEventKind as K;

        let kind = self
            .event_type
            .ok_or(DecodeError::MissingKind(EventCategory::Instance))?;

        let entity = |value: Option<EntityDetail>| required(value, kind, "entity");
        let relationship = |value: Option<Relationship>| required(value, kind, "relationship");

        let body = match kind {
            K::NewEntityEvent => B::NewEntity {
                entity: entity(self.entity)?,
            },
            K::UpdatedEntityEvent => B::UpdatedEntity {
                old_entity: self.original_entity,
                new_entity: entity(self.entity)?,
            },
            K::UndoneEntityEvent => B::UndoneEntity {
                entity: entity(self.entity)?,
            },
            K::ClassifiedEntityEvent => B::ClassifiedEntity {
                entity: entity(self.entity)?,
                classification: required(self.classification, kind, "classification")?,
            },
            K::DeclassifiedEntityEvent => B::DeclassifiedEntity {
                entity: entity(self.entity)?,
                original_classification: required(
                    self.original_classification,
                    kind,
                    "original_classification",
                )?,
            },
            K::ReclassifiedEntityEvent => B::ReclassifiedEntity {
                entity: entity(self.entity)?,
                original_classification: required(
                    self.original_classification,
                    kind,
                    "original_classification",
                )?,
                classification: required(self.classification, kind, "classification")?,
            },
            K::DeletedEntityEvent => B::DeletedEntity {
                entity: entity(self.entity)?,
            },
            K::DeletePurgedEntityEvent => B::DeletePurgedEntity {
                entity: entity(self.entity)?,
            },
            K::PurgedEntityEvent => B::PurgedEntity {
                instance: required(self.instance, kind, "instance")?,
            },
            K::RestoredEntityEvent => B::RestoredEntity {
                entity: entity(self.entity)?,
            },
            K::ReIdentifiedEntityEvent => B::ReIdentifiedEntity {
                original_guid: required(self.original_guid, kind, "original_guid")?,
                entity: entity(self.entity)?,
            },
            K::RetypedEntityEvent => B::RetypedEntity {
                original_type: required(self.original_type, kind, "original_type")?,
                entity: entity(self.entity)?,
            },
            K::ReHomedEntityEvent => B::ReHomedEntity {
                original_home_metadata_collection_id: required(
                    self.original_home_metadata_collection_id,
                    kind,
                    "original_home_metadata_collection_id",
                )?,
                entity: entity(self.entity)?,
            },
            K::RefreshEntityRequest => B::RefreshEntityRequest {
                instance: required(self.instance, kind, "instance")?,
                home_metadata_collection_id: required(
                    self.home_metadata_collection_id,
                    kind,
                    "home_metadata_collection_id",
                )?,
            },
            K::RefreshedEntityEvent => B::RefreshedEntity {
                entity: entity(self.entity)?,
            },
            K::NewRelationshipEvent => B::NewRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::UpdatedRelationshipEvent => B::UpdatedRelationship {
                old_relationship: self.original_relationship,
                new_relationship: relationship(self.relationship)?,
            },
            K::UndoneRelationshipEvent => B::UndoneRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::DeletedRelationshipEvent => B::DeletedRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::DeletePurgedRelationshipEvent => B::DeletePurgedRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::PurgedRelationshipEvent => B::PurgedRelationship {
                instance: required(self.instance, kind, "instance")?,
            },
            K::RestoredRelationshipEvent => B::RestoredRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::ReIdentifiedRelationshipEvent => B::ReIdentifiedRelationship {
                original_guid: required(self.original_guid, kind, "original_guid")?,
                relationship: relationship(self.relationship)?,
            },
            K::RetypedRelationshipEvent => B::RetypedRelationship {
                original_type: required(self.original_type, kind, "original_type")?,
                relationship: relationship(self.relationship)?,
            },
            K::ReHomedRelationshipEvent => B::ReHomedRelationship {
                original_home_metadata_collection_id: required(
                    self.original_home_metadata_collection_id,
                    kind,
                    "original_home_metadata_collection_id",
                )?,
                relationship: relationship(self.relationship)?,
            },
            K::RefreshRelationshipRequest => B::RefreshRelationshipRequest {
                instance: required(self.instance, kind, "instance")?,
                home_metadata_collection_id: required(
                    self.home_metadata_collection_id,
                    kind,
                    "home_metadata_collection_id",
                )?,
            },
            K::RefreshedRelationshipEvent => B::RefreshedRelationship {
                relationship: relationship(self.relationship)?,
            },
            K::BatchInstancesEvent => B::BatchInstances {
                graph: required(self.graph, kind, "graph")?,
            },
            K::InstanceErrorEvent => match self.error_code {
                Some(InstanceErrorCode::ConflictingInstances) => B::ConflictingInstances(
                    required(self.instance_conflict, kind, "instance_conflict")?,
                ),
                Some(InstanceErrorCode::ConflictingType) => {
                    B::ConflictingType(required(self.type_conflict, kind, "type_conflict")?)
                }
                Some(InstanceErrorCode::Unknown) | None => {
                    return Err(DecodeError::UnknownErrorCode(EventCategory::Instance));
                }
            },
            K::Unknown => return Err(DecodeError::UnknownKind(EventCategory::Instance)),
        };

        Ok(body)
    }
}

impl From<&RegistryEvent> for CohortEnvelope {
    fn from(event: &RegistryEvent) -> Self {
        let mut section = RegistrySection {
            event_type: Some(event.kind()),
            error_code: event.body.error_code(),
            ..Default::default()
        };

        match &event.body {
            RegistryEventBody::Registration(details) | RegistryEventBody::ReRegistration(details) => {
                section.registration = Some(details.clone());
            }
            RegistryEventBody::RefreshRegistrationRequest => {}
            RegistryEventBody::Unregistration {
                metadata_collection_name,
            } => {
                section.metadata_collection_name = metadata_collection_name.clone();
            }
            RegistryEventBody::ConflictingCollectionId(error)
            | RegistryEventBody::BadRemoteConnection(error) => {
                section.error = Some(error.clone());
            }
        }

        CohortEnvelope::new(
            Some(event.originator.clone()),
            EnvelopeSection::Registry(section),
        )
    }
}

impl From<&TypeDefEvent> for CohortEnvelope {
    fn from(event: &TypeDefEvent) -> Self {
        let mut section = TypeDefSection {
            event_type: Some(event.kind()),
            error_code: event.body.error_code(),
            ..Default::default()
        };

        match &event.body {
            TypeDefEventBody::NewTypeDef { type_def } => {
                section.type_def = Some(type_def.clone());
            }
            TypeDefEventBody::NewAttributeTypeDef { attribute_type_def } => {
                section.attribute_type_def = Some(attribute_type_def.clone());
            }
            TypeDefEventBody::UpdatedTypeDef { patch } => {
                section.patch = Some(patch.clone());
            }
            TypeDefEventBody::DeletedTypeDef {
                type_def_guid,
                type_def_name,
            } => {
                section.type_def_guid = Some(type_def_guid.clone());
                section.type_def_name = Some(type_def_name.clone());
            }
            TypeDefEventBody::DeletedAttributeTypeDef {
                attribute_type_def_guid,
                attribute_type_def_name,
            } => {
                section.type_def_guid = Some(attribute_type_def_guid.clone());
                section.type_def_name = Some(attribute_type_def_name.clone());
            }
            TypeDefEventBody::ReIdentifiedTypeDef { original, type_def } => {
                section.original_type_def = Some(original.clone());
                section.type_def = Some(type_def.clone());
            }
            TypeDefEventBody::ReIdentifiedAttributeTypeDef {
                original_guid,
                original_name,
                attribute_type_def,
            } => {
                section.original_type_def =
                    Some(TypeDefSummary::new(original_guid.clone(), original_name.clone()));
                section.attribute_type_def = Some(attribute_type_def.clone());
            }
            TypeDefEventBody::Conflict(conflict) => {
                section.conflict = Some(conflict.clone());
            }
            TypeDefEventBody::PatchMismatch(mismatch) => {
                section.patch_mismatch = Some(mismatch.clone());
            }
        }

        CohortEnvelope::new(
            Some(event.originator.clone()),
            EnvelopeSection::TypeDef(section),
        )
    }
}

impl From<&InstanceEvent> for CohortEnvelope {
    fn from(event: &InstanceEvent) -> Self {
        use InstanceEventBody as B;

        let mut s = InstanceSection {
            event_type: Some(event.kind()),
            error_code: event.body.error_code(),
            ..Default::default()
        };

        match &event.body {
            B::NewEntity { entity }
            | B::UndoneEntity { entity }
            | B::DeletedEntity { entity }
            | B::DeletePurgedEntity { entity }
            | B::RestoredEntity { entity }
            | B::RefreshedEntity { entity } => {
                s.entity = Some(entity.clone());
            }
            B::UpdatedEntity {
                old_entity,
                new_entity,
            } => {
                s.original_entity = old_entity.clone();
                s.entity = Some(new_entity.clone());
            }
            B::ClassifiedEntity {
                entity,
                classification,
            } => {
                s.entity = Some(entity.clone());
                s.classification = Some(classification.clone());
            }
            B::DeclassifiedEntity {
                entity,
                original_classification,
            } => {
                s.entity = Some(entity.clone());
                s.original_classification = Some(original_classification.clone());
            }
            B::ReclassifiedEntity {
                entity,
                original_classification,
                classification,
            } => {
                s.entity = Some(entity.clone());
                s.original_classification = Some(original_classification.clone());
                s.classification = Some(classification.clone());
            }
            B::ReIdentifiedEntity {
                original_guid,
                entity,
            } => {
                s.original_guid = Some(original_guid.clone());
                s.entity = Some(entity.clone());
            }
            B::RetypedEntity {
                original_type,
                entity,
            } => {
                s.original_type = Some(original_type.clone());
                s.entity = Some(entity.clone());
            }
            B::ReHomedEntity {
                original_home_metadata_collection_id,
                entity,
            } => {
                s.original_home_metadata_collection_id =
                    Some(original_home_metadata_collection_id.clone());
                s.entity = Some(entity.clone());
            }
            B::PurgedEntity { instance } | B::PurgedRelationship { instance } => {
                s.instance = Some(instance.clone());
            }
            B::RefreshEntityRequest {
                instance,
                home_metadata_collection_id,
            }
            | B::RefreshRelationshipRequest {
                instance,
                home_metadata_collection_id,
            } => {
                s.instance = Some(instance.clone());
                s.home_metadata_collection_id = Some(home_metadata_collection_id.clone());
            }
            B::NewRelationship { relationship }
            | B::UndoneRelationship { relationship }
            | B::DeletedRelationship { relationship }
            | B::DeletePurgedRelationship { relationship }
            | B::RestoredRelationship { relationship }
            | B::RefreshedRelationship { relationship } => {
                s.relationship = Some(relationship.clone());
            }
            B::UpdatedRelationship {
                old_relationship,
                new_relationship,
            } => {
                s.original_relationship = old_relationship.clone();
                s.relationship = Some(new_relationship.clone());
            }
            B::ReIdentifiedRelationship {
                original_guid,
                relationship,
            } => {
                s.original_guid = Some(original_guid.clone());
                s.relationship = Some(relationship.clone());
            }
            B::RetypedRelationship {
                original_type,
                relationship,
            } => {
                s.original_type = Some(original_type.clone());
                s.relationship = Some(relationship.clone());
            }
            B::ReHomedRelationship {
                original_home_metadata_collection_id,
                relationship,
            } => {
                s.original_home_metadata_collection_id =
                    Some(original_home_metadata_collection_id.clone());
                s.relationship = Some(relationship.clone());
            }
            B::BatchInstances { graph } => {
                s.graph = Some(graph.clone());
            }
            B::ConflictingInstances(conflict) => {
                s.instance_conflict = Some(conflict.clone());
            }
            B::ConflictingType(conflict) => {
                s.type_conflict = Some(conflict.clone());
            }
        }

        CohortEnvelope::new(
            Some(event.originator.clone()),
            EnvelopeSection::Instance(s),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstanceType, TypeDefCategory};
    use serde_json::json;

    fn asset(guid: &str) -> EntityDetail {
        EntityDetail::new(guid, InstanceType::new("t1", "Asset", TypeDefCategory::Entity))
    }

    #[test]
    fn test_envelope_json_shape() {
        let event = InstanceEvent::new(
            EventOriginator::new("B"),
            InstanceEventBody::ReIdentifiedEntity {
                original_guid: "old".into(),
                entity: asset("new"),
            },
        );
        let value = serde_json::to_value(CohortEnvelope::from(&event)).unwrap();

        assert_eq!(value["protocol_version"], "V1");
        assert_eq!(value["originator"]["metadata_collection_id"], "B");
        assert_eq!(value["section"]["category"], "instance");
        assert_eq!(value["section"]["event_type"], "RE_IDENTIFIED_ENTITY_EVENT");
        assert_eq!(value["section"]["original_guid"], "old");
        assert!(value["section"].get("relationship").is_none());
    }

    #[test]
    fn test_decode_restores_event() {
        let event = TypeDefEvent::new(
            EventOriginator::new("B").server_name("server-b"),
            TypeDefEventBody::ReIdentifiedAttributeTypeDef {
                original_guid: "a-old".into(),
                original_name: "OldString".into(),
                attribute_type_def: AttributeTypeDef {
                    guid: "a-new".into(),
                    name: "NewString".into(),
                    category: crate::model::AttributeTypeDefCategory::Primitive,
                    description: None,
                },
            },
        );

        let json = CohortEnvelope::from(&event).to_json().unwrap();
        let decoded = CohortEnvelope::from_json(&json).unwrap().decode().unwrap();
        assert_eq!(decoded, CohortEvent::TypeDef(event));
    }

    #[test]
    fn test_unknown_kind_from_newer_peer() {
        let envelope: CohortEnvelope = serde_json::from_value(json!({
            "protocol_version": "V2",
            "timestamp": "2026-01-01T00:00:00Z",
            "originator": { "metadata_collection_id": "B" },
            "section": { "category": "instance", "event_type": "TELEPORTED_ENTITY_EVENT" }
        }))
        .unwrap();

        assert_eq!(
            envelope.decode(),
            Err(DecodeError::UnknownKind(EventCategory::Instance))
        );
    }

    #[test]
    fn test_unknown_error_code() {
        let envelope: CohortEnvelope = serde_json::from_value(json!({
            "protocol_version": "V1",
            "timestamp": "2026-01-01T00:00:00Z",
            "originator": { "metadata_collection_id": "B" },
            "section": {
                "category": "registry",
                "event_type": "REGISTRATION_ERROR_EVENT",
                "error_code": "SOMETHING_NEW"
            }
        }))
        .unwrap();

        assert_eq!(
            envelope.decode(),
            Err(DecodeError::UnknownErrorCode(EventCategory::Registry))
        );
    }

    #[test]
    fn test_missing_payload_field() {
        let envelope = CohortEnvelope::new(
            Some(EventOriginator::new("B")),
            EnvelopeSection::Instance(InstanceSection {
                event_type: Some(InstanceEventKind::NewEntityEvent),
                ..Default::default()
            }),
        );

        assert_eq!(
            envelope.decode(),
            Err(DecodeError::MissingField {
                kind: "NEW_ENTITY_EVENT".to_string(),
                field: "entity",
            })
        );
    }

    #[test]
    fn test_missing_originator() {
        let envelope = CohortEnvelope::new(
            None,
            EnvelopeSection::Registry(RegistrySection {
                event_type: Some(RegistryEventKind::RefreshRegistrationRequest),
                ..Default::default()
            }),
        );
        assert_eq!(envelope.category(), EventCategory::Registry);
        assert_eq!(envelope.decode(), Err(DecodeError::MissingOriginator));
    }
}
