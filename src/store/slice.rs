//! Entity slice factory.
//!
//! An [`EntitySlice`] bundles the normalized state of one kind with the two
//! things needed to fill it from the wire: the attribute extraction function
//! and the kind's relationship descriptors.

use std::ops::Deref;

use super::relations::{Cardinality, Relations};
use super::state::EntityState;
use crate::api::{ApiError, Linkage, Resource};
use crate::entities::{Attributes, Entity, EntityId, EntityKind, Link, Relationships};

/// Wire resource to typed attributes.
pub type ExtractFn<A> = fn(&Resource) -> Result<A, ApiError>;

pub struct EntitySlice<A> {
    kind: EntityKind,
    extract: ExtractFn<A>,
    relations: &'static Relations,
    state: EntityState<A>,
}

impl<A: Attributes> EntitySlice<A> {
    /// Build a slice from the kind's own [`Attributes`] wiring.
    pub fn for_attributes() -> Self {
        Self::new(A::KIND, A::extract, A::relations())
    }
}

impl<A> EntitySlice<A> {
    pub fn new(kind: EntityKind, extract: ExtractFn<A>, relations: &'static Relations) -> Self {
        Self {
            kind,
            extract,
            relations,
            state: EntityState::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn relations(&self) -> &'static Relations {
        self.relations
    }

    pub fn state(&self) -> &EntityState<A> {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut EntityState<A> {
        &mut self.state
    }

    /// Denormalize one wire resource into an entity of this kind.
    ///
    /// Only declared relationships are kept. Relationships absent from the
    /// resource, or sent without `data`, are left out so an upsert keeps the
    /// stored value.
    pub fn entity_from_resource(&self, resource: &Resource) -> Result<Entity<A>, ApiError> {
        if resource.kind != self.kind.type_name() {
            return Err(ApiError::InvalidResource(format!(
                "expected type '{}', got '{}'",
                self.kind, resource.kind
            )));
        }
        let id = resource
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::InvalidResource(format!("{} resource without id", self.kind)))?;

        let attributes = (self.extract)(resource)?;

        let mut relationships = Relationships::new();
        for (relation, cardinality) in self.relations.iter() {
            let Some(data) = resource
                .relationships
                .get(relation.foreign_key)
                .and_then(|relationship| relationship.data.as_ref())
            else {
                continue;
            };
            let identifiers = data.identifiers();
            if let Some(stray) = identifiers.iter().find(|ident| ident.kind != relation.target.type_name()) {
                return Err(ApiError::InvalidResource(format!(
                    "{} {id}: relationship '{}' points at '{}', expected '{}'",
                    self.kind, relation.foreign_key, stray.kind, relation.target
                )));
            }
            let link = match (cardinality, data) {
                (Cardinality::BelongsTo, Linkage::Many(_)) => {
                    return Err(ApiError::InvalidResource(format!(
                        "{} {id}: relationship '{}' must reference a single resource",
                        self.kind, relation.foreign_key
                    )));
                }
                (Cardinality::BelongsTo, Linkage::One(parent)) => {
                    Link::One(parent.as_ref().map(|ident| EntityId::new(ident.id.clone())))
                }
                (Cardinality::HasMany, _) => {
                    Link::Many(identifiers.iter().map(|ident| EntityId::new(ident.id.clone())).collect())
                }
            };
            relationships.insert(relation.foreign_key, link);
        }

        let mut entity = Entity::new(id, attributes);
        entity.relationships = relationships;
        entity.normalize_links();
        Ok(entity)
    }

    /// Denormalize a whole response, preserving its order.
    pub fn entities_from_resources(&self, resources: &[Resource]) -> Result<Vec<Entity<A>>, ApiError> {
        resources.iter().map(|resource| self.entity_from_resource(resource)).collect()
    }
}

impl<A> Deref for EntitySlice<A> {
    type Target = EntityState<A>;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}
