//! Instance and type shape validation collaborator

use crate::model::{EntityDetail, InstanceHeader, Relationship, TypeDefCategory, TypeDefSummary};

/// Sanity checks applied before an event is distributed
pub trait Validator: Send + Sync {
    fn valid_entity(&self, source: &str, entity: &EntityDetail) -> bool;

    fn valid_relationship(&self, source: &str, relationship: &Relationship) -> bool;

    fn valid_instance_id(
        &self,
        source: &str,
        type_def_guid: &str,
        type_def_name: &str,
        category: TypeDefCategory,
        instance_guid: &str,
    ) -> bool;

    fn valid_type_def_summary(&self, source: &str, summary: &TypeDefSummary) -> bool;
}

/// Structural validator: identifiers present, types of the right category,
/// relationship ends populated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeValidator;

impl ShapeValidator {
    fn valid_header(header: &InstanceHeader, category: TypeDefCategory) -> bool {
        if header.guid.is_empty() {
            return false;
        }
        match &header.instance_type {
            Some(t) => {
                t.category == category && !t.type_def_guid.is_empty() && !t.type_def_name.is_empty()
            }
            None => false,
        }
    }
}

impl Validator for ShapeValidator {
    fn valid_entity(&self, _source: &str, entity: &EntityDetail) -> bool {
        Self::valid_header(&entity.header, TypeDefCategory::Entity)
    }

    fn valid_relationship(&self, _source: &str, relationship: &Relationship) -> bool {
        let ends_present = matches!(
            (&relationship.entity_one, &relationship.entity_two),
            (Some(one), Some(two)) if !one.header.guid.is_empty() && !two.header.guid.is_empty()
        );
        ends_present && Self::valid_header(&relationship.header, TypeDefCategory::Relationship)
    }

    fn valid_instance_id(
        &self,
        _source: &str,
        type_def_guid: &str,
        type_def_name: &str,
        category: TypeDefCategory,
        instance_guid: &str,
    ) -> bool {
        category != TypeDefCategory::Classification
            && !type_def_guid.is_empty()
            && !type_def_name.is_empty()
            && !instance_guid.is_empty()
    }

    fn valid_type_def_summary(&self, _source: &str, summary: &TypeDefSummary) -> bool {
        !summary.guid.is_empty() && !summary.name.is_empty() && summary.version >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstanceType;

    fn asset_type() -> InstanceType {
        InstanceType::new("t-asset", "Asset", TypeDefCategory::Entity)
    }

    fn link_type() -> InstanceType {
        InstanceType::new("t-link", "AssetLink", TypeDefCategory::Relationship)
    }

    #[test]
    fn test_entity_shape() {
        let v = ShapeValidator;
        assert!(v.valid_entity("t", &EntityDetail::new("e1", asset_type())));
        assert!(!v.valid_entity("t", &EntityDetail::new("", asset_type())));
        assert!(!v.valid_entity("t", &EntityDetail::new("e1", link_type())));

        let mut untyped = EntityDetail::new("e1", asset_type());
        untyped.header.instance_type = None;
        assert!(!v.valid_entity("t", &untyped));
    }

    #[test]
    fn test_relationship_needs_both_ends() {
        let v = ShapeValidator;
        let one = EntityDetail::new("e1", asset_type()).proxy();
        let two = EntityDetail::new("e2", asset_type()).proxy();

        let mut rel = Relationship::new("r1", link_type(), one, two);
        assert!(v.valid_relationship("t", &rel));

        rel.entity_two = None;
        assert!(!v.valid_relationship("t", &rel));
    }

    #[test]
    fn test_instance_id_and_summary() {
        let v = ShapeValidator;
        assert!(v.valid_instance_id("t", "g", "Asset", TypeDefCategory::Entity, "e1"));
        assert!(!v.valid_instance_id("t", "g", "Asset", TypeDefCategory::Entity, ""));
        assert!(!v.valid_instance_id("t", "g", "Tag", TypeDefCategory::Classification, "c"));

        assert!(v.valid_type_def_summary("t", &TypeDefSummary::new("g", "Asset")));
        assert!(!v.valid_type_def_summary("t", &TypeDefSummary::new("", "Asset")));
    }
}
