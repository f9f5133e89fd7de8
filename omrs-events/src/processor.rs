//! Consumer traits for cohort events
//!
//! A consumer implements the per-kind methods it cares about; everything else
//! defaults to a no-op. Whole events enter through the generic
//! `process_*_event` hooks, whose default implementation routes the body to the
//! matching per-kind method through the `dispatch_*` functions below.

use crate::context::{EventContext, ProcessingContext};
use crate::event::{
    InstanceConflict, InstanceEvent, InstanceEventBody, RegistrationDetails, RegistryError,
    RegistryEvent, RegistryEventBody, TypeConflict, TypeDefConflict, TypeDefEvent,
    TypeDefEventBody, TypeDefPatchMismatch,
};
use crate::model::{
    AttributeTypeDef, Classification, EntityDetail, InstanceGraph, InstanceRef, Relationship,
    TypeDef, TypeDefPatch, TypeDefSummary,
};
use async_trait::async_trait;

/// Consumer of type definition events
#[async_trait]
#[allow(unused_variables)]
pub trait TypeDefEventProcessor: Send + Sync {
    /// Entry point for a whole event
    async fn process_type_def_event(
        &self,
        source: &str,
        event: &TypeDefEvent,
        processing: &ProcessingContext,
    ) {
        let ctx = EventContext::new(source, &event.originator, processing);
        dispatch_type_def_event(self, &ctx, &event.body).await;
    }

    async fn process_new_type_def_event(&self, ctx: &EventContext<'_>, type_def: &TypeDef) {}

    async fn process_new_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def: &AttributeTypeDef,
    ) {
    }

    async fn process_updated_type_def_event(&self, ctx: &EventContext<'_>, patch: &TypeDefPatch) {}

    async fn process_deleted_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        type_def_guid: &str,
        type_def_name: &str,
    ) {
    }

    async fn process_deleted_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        attribute_type_def_guid: &str,
        attribute_type_def_name: &str,
    ) {
    }

    async fn process_re_identified_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original: &TypeDefSummary,
        type_def: &TypeDef,
    ) {
    }

    async fn process_re_identified_attribute_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        original_name: &str,
        attribute_type_def: &AttributeTypeDef,
    ) {
    }

    /// Two members hold different definitions under the same identity
    async fn process_type_def_conflict_event(
        &self,
        ctx: &EventContext<'_>,
        conflict: &TypeDefConflict,
    ) {
    }

    /// A patch could not be applied by the target member
    async fn process_invalid_type_def_event(
        &self,
        ctx: &EventContext<'_>,
        mismatch: &TypeDefPatchMismatch,
    ) {
    }
}

/// Consumer of instance events
#[async_trait]
#[allow(unused_variables)]
pub trait InstanceEventProcessor: Send + Sync {
    /// Entry point for a whole event
    async fn process_instance_event(
        &self,
        source: &str,
        event: &InstanceEvent,
        processing: &ProcessingContext,
    ) {
        let ctx = EventContext::new(source, &event.originator, processing);
        dispatch_instance_event(self, &ctx, &event.body).await;
    }

    async fn process_new_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {}

    async fn process_updated_entity_event(
        &self,
        ctx: &EventContext<'_>,
        old_entity: Option<&EntityDetail>,
        new_entity: &EntityDetail,
    ) {
    }

    async fn process_undone_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {}

    async fn process_classified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        classification: &Classification,
    ) {
    }

    async fn process_declassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        original_classification: &Classification,
    ) {
    }

    async fn process_reclassified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
        original_classification: &Classification,
        classification: &Classification,
    ) {
    }

    async fn process_deleted_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {}

    async fn process_delete_purged_entity_event(
        &self,
        ctx: &EventContext<'_>,
        entity: &EntityDetail,
    ) {
    }

    async fn process_purged_entity_event(&self, ctx: &EventContext<'_>, instance: &InstanceRef) {}

    async fn process_restored_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {}

    async fn process_re_identified_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        entity: &EntityDetail,
    ) {
    }

    async fn process_re_typed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: &TypeDefSummary,
        entity: &EntityDetail,
    ) {
    }

    async fn process_re_homed_entity_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: &str,
        entity: &EntityDetail,
    ) {
    }

    /// The home repository is asked to resend its copy of an entity
    async fn process_refresh_entity_request(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
        home_metadata_collection_id: &str,
    ) {
    }

    async fn process_refreshed_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {}

    async fn process_new_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_updated_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        old_relationship: Option<&Relationship>,
        new_relationship: &Relationship,
    ) {
    }

    async fn process_undone_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_deleted_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_delete_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_purged_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
    ) {
    }

    async fn process_restored_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_re_identified_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_guid: &str,
        relationship: &Relationship,
    ) {
    }

    async fn process_re_typed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_type: &TypeDefSummary,
        relationship: &Relationship,
    ) {
    }

    async fn process_re_homed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        original_home_metadata_collection_id: &str,
        relationship: &Relationship,
    ) {
    }

    async fn process_refresh_relationship_request(
        &self,
        ctx: &EventContext<'_>,
        instance: &InstanceRef,
        home_metadata_collection_id: &str,
    ) {
    }

    async fn process_refreshed_relationship_event(
        &self,
        ctx: &EventContext<'_>,
        relationship: &Relationship,
    ) {
    }

    async fn process_batch_instances_event(&self, ctx: &EventContext<'_>, graph: &InstanceGraph) {}

    async fn process_conflicting_instances_event(
        &self,
        ctx: &EventContext<'_>,
        conflict: &InstanceConflict,
    ) {
    }

    async fn process_conflicting_type_event(&self, ctx: &EventContext<'_>, conflict: &TypeConflict) {
    }
}

/// Consumer of registry (cohort membership) events
#[async_trait]
#[allow(unused_variables)]
pub trait RegistryEventProcessor: Send + Sync {
    async fn process_registry_event(
        &self,
        source: &str,
        event: &RegistryEvent,
        processing: &ProcessingContext,
    ) {
        let ctx = EventContext::new(source, &event.originator, processing);
        dispatch_registry_event(self, &ctx, &event.body).await;
    }

    async fn process_registration_event(
        &self,
        ctx: &EventContext<'_>,
        details: &RegistrationDetails,
    ) {
    }

    async fn process_registration_refresh_request(&self, ctx: &EventContext<'_>) {}

    async fn process_re_registration_event(
        &self,
        ctx: &EventContext<'_>,
        details: &RegistrationDetails,
    ) {
    }

    async fn process_unregistration_event(
        &self,
        ctx: &EventContext<'_>,
        metadata_collection_name: Option<&str>,
    ) {
    }

    async fn process_conflicting_collection_id_event(
        &self,
        ctx: &EventContext<'_>,
        error: &RegistryError,
    ) {
    }

    async fn process_bad_connection_event(&self, ctx: &EventContext<'_>, error: &RegistryError) {}
}

/// Route a type definition event body to its per-kind method
pub async fn dispatch_type_def_event<P>(processor: &P, ctx: &EventContext<'_>, body: &TypeDefEventBody)
where
    P: TypeDefEventProcessor + ?Sized,
{
    match body {
        TypeDefEventBody::NewTypeDef { type_def } => {
            processor.process_new_type_def_event(ctx, type_def).await
        }
        TypeDefEventBody::NewAttributeTypeDef { attribute_type_def } => {
            processor
                .process_new_attribute_type_def_event(ctx, attribute_type_def)
                .await
        }
        TypeDefEventBody::UpdatedTypeDef { patch } => {
            processor.process_updated_type_def_event(ctx, patch).await
        }
        TypeDefEventBody::DeletedTypeDef {
            type_def_guid,
            type_def_name,
        } => {
            processor
                .process_deleted_type_def_event(ctx, type_def_guid, type_def_name)
                .await
        }
        TypeDefEventBody::DeletedAttributeTypeDef {
            attribute_type_def_guid,
            attribute_type_def_name,
        } => {
            processor
                .process_deleted_attribute_type_def_event(
                    ctx,
                    attribute_type_def_guid,
                    attribute_type_def_name,
                )
                .await
        }
        TypeDefEventBody::ReIdentifiedTypeDef { original, type_def } => {
            processor
                .process_re_identified_type_def_event(ctx, original, type_def)
                .await
        }
        TypeDefEventBody::ReIdentifiedAttributeTypeDef {
            original_guid,
            original_name,
            attribute_type_def,
        } => {
            processor
                .process_re_identified_attribute_type_def_event(
                    ctx,
                    original_guid,
                    original_name,
                    attribute_type_def,
                )
                .await
        }
        TypeDefEventBody::Conflict(conflict) => {
            processor.process_type_def_conflict_event(ctx, conflict).await
        }
        TypeDefEventBody::PatchMismatch(mismatch) => {
            processor.process_invalid_type_def_event(ctx, mismatch).await
        }
    }
}

/// Route an instance event body to its per-kind method
pub async fn dispatch_instance_event<P>(processor: &P, ctx: &EventContext<'_>, body: &InstanceEventBody)
where
    P: InstanceEventProcessor + ?Sized,
{
    use InstanceEventBody as B;

    match body {
        B::NewEntity { entity } => processor.process_new_entity_event(ctx, entity).await,
        B::UpdatedEntity {
            old_entity,
            new_entity,
        } => {
            processor
                .process_updated_entity_event(ctx, old_entity.as_ref(), new_entity)
                .await
        }
        B::UndoneEntity { entity } => processor.process_undone_entity_event(ctx, entity).await,
        B::ClassifiedEntity {
            entity,
            classification,
        } => {
            processor
                .process_classified_entity_event(ctx, entity, classification)
                .await
        }
        B::DeclassifiedEntity {
            entity,
            original_classification,
        } => {
            processor
                .process_declassified_entity_event(ctx, entity, original_classification)
                .await
        }
        B::ReclassifiedEntity {
            entity,
            original_classification,
            classification,
        } => {
            processor
                .process_reclassified_entity_event(
                    ctx,
                    entity,
                    original_classification,
                    classification,
                )
                .await
        }
        B::DeletedEntity { entity } => processor.process_deleted_entity_event(ctx, entity).await,
        B::DeletePurgedEntity { entity } => {
            processor.process_delete_purged_entity_event(ctx, entity).await
        }
        B::PurgedEntity { instance } => processor.process_purged_entity_event(ctx, instance).await,
        B::RestoredEntity { entity } => processor.process_restored_entity_event(ctx, entity).await,
        B::ReIdentifiedEntity {
            original_guid,
            entity,
        } => {
            processor
                .process_re_identified_entity_event(ctx, original_guid, entity)
                .await
        }
        B::RetypedEntity {
            original_type,
            entity,
        } => {
            processor
                .process_re_typed_entity_event(ctx, original_type, entity)
                .await
        }
        B::ReHomedEntity {
            original_home_metadata_collection_id,
            entity,
        } => {
            processor
                .process_re_homed_entity_event(ctx, original_home_metadata_collection_id, entity)
                .await
        }
        B::RefreshEntityRequest {
            instance,
            home_metadata_collection_id,
        } => {
            processor
                .process_refresh_entity_request(ctx, instance, home_metadata_collection_id)
                .await
        }
        B::RefreshedEntity { entity } => {
            processor.process_refreshed_entity_event(ctx, entity).await
        }
        B::NewRelationship { relationship } => {
            processor.process_new_relationship_event(ctx, relationship).await
        }
        B::UpdatedRelationship {
            old_relationship,
            new_relationship,
        } => {
            processor
                .process_updated_relationship_event(ctx, old_relationship.as_ref(), new_relationship)
                .await
        }
        B::UndoneRelationship { relationship } => {
            processor.process_undone_relationship_event(ctx, relationship).await
        }
        B::DeletedRelationship { relationship } => {
            processor.process_deleted_relationship_event(ctx, relationship).await
        }
        B::DeletePurgedRelationship { relationship } => {
            processor
                .process_delete_purged_relationship_event(ctx, relationship)
                .await
        }
        B::PurgedRelationship { instance } => {
            processor.process_purged_relationship_event(ctx, instance).await
        }
        B::RestoredRelationship { relationship } => {
            processor.process_restored_relationship_event(ctx, relationship).await
        }
        B::ReIdentifiedRelationship {
            original_guid,
            relationship,
        } => {
            processor
                .process_re_identified_relationship_event(ctx, original_guid, relationship)
                .await
        }
        B::RetypedRelationship {
            original_type,
            relationship,
        } => {
            processor
                .process_re_typed_relationship_event(ctx, original_type, relationship)
                .await
        }
        B::ReHomedRelationship {
            original_home_metadata_collection_id,
            relationship,
        } => {
            processor
                .process_re_homed_relationship_event(
                    ctx,
                    original_home_metadata_collection_id,
                    relationship,
                )
                .await
        }
        B::RefreshRelationshipRequest {
            instance,
            home_metadata_collection_id,
        } => {
            processor
                .process_refresh_relationship_request(ctx, instance, home_metadata_collection_id)
                .await
        }
        B::RefreshedRelationship { relationship } => {
            processor
                .process_refreshed_relationship_event(ctx, relationship)
                .await
        }
        B::BatchInstances { graph } => processor.process_batch_instances_event(ctx, graph).await,
        B::ConflictingInstances(conflict) => {
            processor
                .process_conflicting_instances_event(ctx, conflict)
                .await
        }
        B::ConflictingType(conflict) => {
            processor.process_conflicting_type_event(ctx, conflict).await
        }
    }
}

/// Route a registry event body to its per-kind method
pub async fn dispatch_registry_event<P>(processor: &P, ctx: &EventContext<'_>, body: &RegistryEventBody)
where
    P: RegistryEventProcessor + ?Sized,
{
    match body {
        RegistryEventBody::Registration(details) => {
            processor.process_registration_event(ctx, details).await
        }
        RegistryEventBody::RefreshRegistrationRequest => {
            processor.process_registration_refresh_request(ctx).await
        }
        RegistryEventBody::ReRegistration(details) => {
            processor.process_re_registration_event(ctx, details).await
        }
        RegistryEventBody::Unregistration {
            metadata_collection_name,
        } => {
            processor
                .process_unregistration_event(ctx, metadata_collection_name.as_deref())
                .await
        }
        RegistryEventBody::ConflictingCollectionId(error) => {
            processor
                .process_conflicting_collection_id_event(ctx, error)
                .await
        }
        RegistryEventBody::BadRemoteConnection(error) => {
            processor.process_bad_connection_event(ctx, error).await
        }
    }
}
