//! Event construction
//!
//! [`EventBuilder`] turns a domain notification into a typed event and hands it
//! to a [`Sender`]. It holds no state of its own and performs no filtering.
//!
//! Every [`Sender`] is also a type definition and instance consumer: the
//! generic hooks forward whole events, the per-kind methods rebuild the event
//! through the builder. This is how the event manager exposes its
//! `process_*` family and how a publisher is registered as a consumer.

use crate::context::{EventContext, ProcessingContext};
use crate::event::{
    InstanceConflict, InstanceEvent, InstanceEventBody, TypeConflict, TypeDefConflict,
    TypeDefEvent, TypeDefEventBody, TypeDefPatchMismatch,
};
use crate::model::{
    AttributeTypeDef, Classification, EntityDetail, InstanceGraph, InstanceRef, Relationship,
    TypeDef, TypeDefPatch, TypeDefSummary,
};
use crate::processor::{InstanceEventProcessor, TypeDefEventProcessor};
use async_trait::async_trait;

/// Destination for built events
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send_type_def_event(
        &self,
        source: &str,
        event: TypeDefEvent,
        processing: &ProcessingContext,
    );

    async fn send_instance_event(
        &self,
        source: &str,
        event: InstanceEvent,
        processing: &ProcessingContext,
    );
}

/// Builds one event per notification shape and passes it to the sender
pub struct EventBuilder<'a, S: Sender + ?Sized> {
    sender: &'a S,
}

impl<'a, S: Sender + ?Sized> EventBuilder<'a, S> {
    pub fn new(sender: &'a S) -> Self {
        Self { sender }
    }

    async fn type_def(&self, ctx: &EventContext<'_>, body: TypeDefEventBody) {
        let event = TypeDefEvent::new(ctx.originator.clone(), body);
        self.sender
            .send_type_def_event(ctx.source, event, ctx.processing)
            .await;
    }

    async fn instance(&self, ctx: &EventContext<'_>, body: InstanceEventBody) {
        let event = InstanceEvent::new(ctx.originator.clone(), body);
        self.sender
            .send_instance_event(ctx.source, event, ctx.processing)
            .await;
    }

    // ------------------------------------------------------------------------
    // Type definitions
    // ------------------------------------------------------------------------

    pub async fn send_new_type_def_event(&self, ctx: &EventContext<'_>, type_def: TypeDef) {
        self.type_def(ctx, TypeDefEventBody::NewTypeDef { type_def })
            .await
    }

    pub async fn send_new_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def: AttributeTypeDef,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::NewAttributeTypeDef { attribute_type_def },
        )
        .await
    }

    pub async fn send_updated_type_def_event(&self, ctx: &EventContext<'_>, patch: TypeDefPatch) {
        self.type_def(ctx, TypeDefEventBody::UpdatedTypeDef { patch })
            .await
    }

    pub async fn send_deleted_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        type_def_guid: impl Into<String>,
        type_def_name: impl Into<String>,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::DeletedTypeDef {
                type_def_guid: type_def_guid.into(),
                type_def_name: type_def_name.into(),
            },
        )
        .await
    }

    pub async fn send_deleted_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def_guid: impl Into<String>,
        attribute_type_def_name: impl Into<String>,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::DeletedAttributeTypeDef {
                attribute_type_def_guid: attribute_type_def_guid.into(),
                attribute_type_def_name: attribute_type_def_name.into(),
            },
        )
        .await
    }

    pub async fn send_re_identified_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original: TypeDefSummary,
        type_def: TypeDef,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::ReIdentifiedTypeDef { original, type_def },
        )
        .await
    }

    pub async fn send_re_identified_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: impl Into<String>,
        original_name: impl Into<String>,
        attribute_type_def: AttributeTypeDef,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::ReIdentifiedAttributeTypeDef {
                original_guid: original_guid.into(),
                original_name: original_name.into(),
                attribute_type_def,
            },
        )
        .await
    }

    pub async fn send_type_def_conflict_event(
        &self,
        ctx: &EventContext<'_>,
        originator_type_def: TypeDefSummary,
        other_metadata_collection_id: impl Into<String>,
        conflicting_type_def: TypeDefSummary,
        error_message: impl Into<String>,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::Conflict(TypeDefConflict {
                originator_type_def,
                other_metadata_collection_id: other_metadata_collection_id.into(),
                conflicting_type_def,
                error_message: error_message.into(),
            }),
        )
        .await
    }

    pub async fn send_invalid_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        target_metadata_collection_id: impl Into<String>,
        target_type_def: TypeDefSummary,
        other_type_def: TypeDef,
        error_message: impl Into<String>,
    ) {
        self.type_def(
            ctx,
            TypeDefEventBody::PatchMismatch(TypeDefPatchMismatch {
                target_metadata_collection_id: target_metadata_collection_id.into(),
                target_type_def,
                other_type_def,
                error_message: error_message.into(),
            }),
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    pub async fn send_new_entity_event(&self, ctx: &EventContext<'_>, entity: EntityDetail) {
        self.instance(ctx, InstanceEventBody::NewEntity { entity })
            .await
    }

    pub async fn send_updated_entity_event(
        &self,
        ctx: &EventContext<'_>,
        old_entity: Option<EntityDetail>,
        new_entity: EntityDetail,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::UpdatedEntity {
                old_entity,
                new_entity,
            },
        )
        .await
    }

    pub async fn send_undone_entity_event(&self, ctx: &EventContext<'_>, entity: EntityDetail) {
        self.instance(ctx, InstanceEventBody::UndoneEntity { entity })
            .await
    }

    pub async fn send_classified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: EntityDetail,
        classification: Classification,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ClassifiedEntity {
                entity,
                classification,
            },
        )
        .await
    }

    pub async fn send_declassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: EntityDetail,
        original_classification: Classification,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::DeclassifiedEntity {
                entity,
                original_classification,
            },
        )
        .await
    }

    pub async fn send_reclassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: EntityDetail,
        original_classification: Classification,
        classification: Classification,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ReclassifiedEntity {
                entity,
                original_classification,
                classification,
            },
        )
        .await
    }

    pub async fn send_deleted_entity_event(&self, ctx: &EventContext<'_>, entity: EntityDetail) {
        self.instance(ctx, InstanceEventBody::DeletedEntity { entity })
            .await
    }

    pub async fn send_delete_purged_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: EntityDetail,
    ) {
        self.instance(ctx, InstanceEventBody::DeletePurgedEntity { entity })
            .await
    }

    pub async fn send_purged_entity_event(&self, ctx: &EventContext<'_>, instance: InstanceRef) {
        self.instance(ctx, InstanceEventBody::PurgedEntity { instance })
            .await
    }

    pub async fn send_restored_entity_event(&self, ctx: &EventContext<'_>, entity: EntityDetail) {
        self.instance(ctx, InstanceEventBody::RestoredEntity { entity })
            .await
    }

    pub async fn send_re_identified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: impl Into<String>,
        entity: EntityDetail,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ReIdentifiedEntity {
                original_guid: original_guid.into(),
                entity,
            },
        )
        .await
    }

    pub async fn send_re_typed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: TypeDefSummary,
        entity: EntityDetail,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::RetypedEntity {
                original_type,
                entity,
            },
        )
        .await
    }

    pub async fn send_re_homed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: impl Into<String>,
        entity: EntityDetail,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ReHomedEntity {
                original_home_metadata_collection_id: original_home_metadata_collection_id.into(),
                entity,
            },
        )
        .await
    }

    pub async fn send_refresh_entity_request(
        &self,
        ctx: &EventContext<'_>,
        instance: InstanceRef,
        home_metadata_collection_id: impl Into<String>,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::RefreshEntityRequest {
                instance,
                home_metadata_collection_id: home_metadata_collection_id.into(),
            },
        )
        .await
    }

    pub async fn send_refreshed_entity_event(&self, ctx: &EventContext<'_>, entity: EntityDetail) {
        self.instance(ctx, InstanceEventBody::RefreshedEntity { entity })
            .await
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    pub async fn send_new_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(ctx, InstanceEventBody::NewRelationship { relationship })
            .await
    }

    pub async fn send_updated_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        old_relationship: Option<Relationship>,
        new_relationship: Relationship,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::UpdatedRelationship {
                old_relationship,
                new_relationship,
            },
        )
        .await
    }

    pub async fn send_undone_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(ctx, InstanceEventBody::UndoneRelationship { relationship })
            .await
    }

    pub async fn send_deleted_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(ctx, InstanceEventBody::DeletedRelationship { relationship })
            .await
    }

    pub async fn send_delete_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::DeletePurgedRelationship { relationship },
        )
        .await
    }

    pub async fn send_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        instance: InstanceRef,
    ) {
        self.instance(ctx, InstanceEventBody::PurgedRelationship { instance })
            .await
    }

    pub async fn send_restored_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(ctx, InstanceEventBody::RestoredRelationship { relationship })
            .await
    }

    pub async fn send_re_identified_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: impl Into<String>,
        relationship: Relationship,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ReIdentifiedRelationship {
                original_guid: original_guid.into(),
                relationship,
            },
        )
        .await
    }

    pub async fn send_re_typed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: TypeDefSummary,
        relationship: Relationship,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::RetypedRelationship {
                original_type,
                relationship,
            },
        )
        .await
    }

    pub async fn send_re_homed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: impl Into<String>,
        relationship: Relationship,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::ReHomedRelationship {
                original_home_metadata_collection_id: original_home_metadata_collection_id.into(),
                relationship,
            },
        )
        .await
    }

    pub async fn send_refresh_relationship_request(
        &self,
        ctx: &EventContext<'_>,
        instance: InstanceRef,
        home_metadata_collection_id: impl Into<String>,
    ) {
        self.instance(
            ctx,
            InstanceEventBody::RefreshRelationshipRequest {
                instance,
                home_metadata_collection_id: home_metadata_collection_id.into(),
            },
        )
        .await
    }

    pub async fn send_refreshed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: Relationship,
    ) {
        self.instance(ctx, InstanceEventBody::RefreshedRelationship { relationship })
            .await
    }

    // ------------------------------------------------------------------------
    // Batches and conflicts
    // ------------------------------------------------------------------------

    pub async fn send_batch_instances_event(&self, ctx: &EventContext<'_>, graph: InstanceGraph) {
        self.instance(ctx, InstanceEventBody::BatchInstances { graph })
            .await
    }

    pub async fn send_conflicting_instances_event(
        &self,
        ctx: &EventContext<'_>,
        conflict: InstanceConflict,
    ) {
        self.instance(ctx, InstanceEventBody::ConflictingInstances(conflict))
            .await
    }

    pub async fn send_conflicting_type_event(&self, ctx: &EventContext<'_>, conflict: TypeConflict) {
        self.instance(ctx, InstanceEventBody::ConflictingType(conflict))
            .await
    }
}

#[async_trait]
impl<S: Sender> TypeDefEventProcessor for S {
    async fn process_type_def_event(
        &self,
        source: &str,
        event: &TypeDefEvent,
        processing: &ProcessingContext,
    ) {
        self.send_type_def_event(source, event.clone(), processing)
            .await
    }

    async fn process_new_type_def_event(&self, ctx: &EventContext<'_>, type_def: &TypeDef) {
        EventBuilder::new(self)
            .send_new_type_def_event(ctx, type_def.clone())
            .await
    }

    async fn process_new_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def: &AttributeTypeDef,
    ) {
        EventBuilder::new(self)
            .send_new_attribute_type_def_event(ctx, attribute_type_def.clone())
            .await
    }

    async fn process_updated_type_def_event(&self, ctx: &EventContext<'_>, patch: &TypeDefPatch) {
        EventBuilder::new(self)
            .send_updated_type_def_event(ctx, patch.clone())
            .await
    }

    async fn process_deleted_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        type_def_guid: &str,
        type_def_name: &str,
    ) {
        EventBuilder::new(self)
            .send_deleted_type_def_event(ctx, type_def_guid, type_def_name)
            .await
    }

    async fn process_deleted_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def_guid: &str,
        attribute_type_def_name: &str,
    ) {
        EventBuilder::new(self)
            .send_deleted_attribute_type_def_event(
                ctx,
                attribute_type_def_guid,
                attribute_type_def_name,
            )
            .await
    }

    async fn process_re_identified_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original: &TypeDefSummary,
        type_def: &TypeDef,
    ) {
        EventBuilder::new(self)
            .send_re_identified_type_def_event(ctx, original.clone(), type_def.clone())
            .await
    }

    async fn process_re_identified_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        original_name: &str,
        attribute_type_def: &AttributeTypeDef,
    ) {
        EventBuilder::new(self)
            .send_re_identified_attribute_type_def_event(
                ctx,
                original_guid,
                original_name,
                attribute_type_def.clone(),
            )
            .await
    }

    async fn process_type_def_conflict_event(
        &self,
        ctx: &EventContext<'_>,
        conflict: &TypeDefConflict,
    ) {
        let conflict = conflict.clone();
        EventBuilder::new(self)
            .send_type_def_conflict_event(
                ctx,
                conflict.originator_type_def,
                conflict.other_metadata_collection_id,
                conflict.conflicting_type_def,
                conflict.error_message,
            )
            .await
    }

    async fn process_invalid_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        mismatch: &TypeDefPatchMismatch,
    ) {
        let mismatch = mismatch.clone();
        EventBuilder::new(self)
            .send_invalid_type_def_event(
                ctx,
                mismatch.target_metadata_collection_id,
                mismatch.target_type_def,
                mismatch.other_type_def,
                mismatch.error_message,
            )
            .await
    }
}

#[async_trait]
impl<S: Sender> InstanceEventProcessor for S {
    async fn process_instance_event(
        &self,
        source: &str,
        event: &InstanceEvent,
        processing: &ProcessingContext,
    ) {
        self.send_instance_event(source, event.clone(), processing)
            .await
    }

    async fn process_new_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        EventBuilder::new(self)
            .send_new_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_updated_entity_event(
        &self,
        ctx: &EventContext<'_>,
        old_entity: Option<&EntityDetail>,
        new_entity: &EntityDetail,
    ) {
        EventBuilder::new(self)
            .send_updated_entity_event(ctx, old_entity.cloned(), new_entity.clone())
            .await
    }

    async fn process_undone_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        EventBuilder::new(self)
            .send_undone_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_classified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        classification: &Classification,
    ) {
        EventBuilder::new(self)
            .send_classified_entity_event(ctx, entity.clone(), classification.clone())
            .await
    }

    async fn process_declassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        original_classification: &Classification,
    ) {
        EventBuilder::new(self)
            .send_declassified_entity_event(ctx, entity.clone(), original_classification.clone())
            .await
    }

    async fn process_reclassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        original_classification: &Classification,
        classification: &Classification,
    ) {
        EventBuilder::new(self)
            .send_reclassified_entity_event(
                ctx,
                entity.clone(),
                original_classification.clone(),
                classification.clone(),
            )
            .await
    }

    async fn process_deleted_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        EventBuilder::new(self)
            .send_deleted_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_delete_purged_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
    ) {
        EventBuilder::new(self)
            .send_delete_purged_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_purged_entity_event(&self, ctx: &EventContext<'_>, instance: &InstanceRef) {
        EventBuilder::new(self)
            .send_purged_entity_event(ctx, instance.clone())
            .await
    }

    async fn process_restored_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        EventBuilder::new(self)
            .send_restored_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_re_identified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        entity: &EntityDetail,
    ) {
        EventBuilder::new(self)
            .send_re_identified_entity_event(ctx, original_guid, entity.clone())
            .await
    }

    async fn process_re_typed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: &TypeDefSummary,
        entity: &EntityDetail,
    ) {
        EventBuilder::new(self)
            .send_re_typed_entity_event(ctx, original_type.clone(), entity.clone())
            .await
    }

    async fn process_re_homed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: &str,
        entity: &EntityDetail,
    ) {
        EventBuilder::new(self)
            .send_re_homed_entity_event(ctx, original_home_metadata_collection_id, entity.clone())
            .await
    }

    async fn process_refresh_entity_request(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
        home_metadata_collection_id: &str,
    ) {
        EventBuilder::new(self)
            .send_refresh_entity_request(ctx, instance.clone(), home_metadata_collection_id)
            .await
    }

    async fn process_refreshed_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        EventBuilder::new(self)
            .send_refreshed_entity_event(ctx, entity.clone())
            .await
    }

    async fn process_new_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_new_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_updated_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        old_relationship: Option<&Relationship>,
        new_relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_updated_relationship_event(
                ctx,
                old_relationship.cloned(),
                new_relationship.clone(),
            )
            .await
    }

    async fn process_undone_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_undone_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_deleted_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_deleted_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_delete_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_delete_purged_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
    ) {
        EventBuilder::new(self)
            .send_purged_relationship_event(ctx, instance.clone())
            .await
    }

    async fn process_restored_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_restored_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_re_identified_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_re_identified_relationship_event(ctx, original_guid, relationship.clone())
            .await
    }

    async fn process_re_typed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: &TypeDefSummary,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_re_typed_relationship_event(ctx, original_type.clone(), relationship.clone())
            .await
    }

    async fn process_re_homed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: &str,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_re_homed_relationship_event(
                ctx,
                original_home_metadata_collection_id,
                relationship.clone(),
            )
            .await
    }

    async fn process_refresh_relationship_request(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
        home_metadata_collection_id: &str,
    ) {
        EventBuilder::new(self)
            .send_refresh_relationship_request(ctx, instance.clone(), home_metadata_collection_id)
            .await
    }

    async fn process_refreshed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
        EventBuilder::new(self)
            .send_refreshed_relationship_event(ctx, relationship.clone())
            .await
    }

    async fn process_batch_instances_event(&self, ctx: &EventContext<'_>, graph: &InstanceGraph) {
        EventBuilder::new(self)
            .send_batch_instances_event(ctx, graph.clone())
            .await
    }

    async fn process_conflicting_instances_event(
        &self,
        ctx: &EventContext<'_>,
        conflict: &InstanceConflict,
    ) {
        EventBuilder::new(self)
            .send_conflicting_instances_event(ctx, conflict.clone())
            .await
    }

    async fn process_conflicting_type_event(&self, ctx: &EventContext<'_>, conflict: &TypeConflict) {
        EventBuilder::new(self)
            .send_conflicting_type_event(ctx, conflict.clone())
            .await
    }
}
