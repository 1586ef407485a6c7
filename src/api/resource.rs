//! JSON:API resource objects as exchanged with the backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::ApiError;
use crate::entities::{Attributes, Entity, Link};

/// `{ "data": ... }` envelope of every request and response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Resource linkage: a single identifier, `null`, or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    Many(Vec<ResourceIdentifier>),
    One(Option<ResourceIdentifier>),
}

impl Default for Linkage {
    fn default() -> Self {
        Linkage::One(None)
    }
}

impl Linkage {
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Linkage::Many(identifiers) => identifiers.iter().collect(),
            Linkage::One(identifier) => identifier.iter().collect(),
        }
    }
}

/// A relationship object. `data` is `None` when the server only sent
/// `links` (or `meta`): the linkage was not included, which is different
/// from an explicit `null` or `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, deserialize_with = "included", skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,
}

impl Relationship {
    pub fn new(data: Linkage) -> Self {
        Self { data: Some(data) }
    }
}

/// A present `data` member, `null` included, is always `Some`.
fn included<'de, D>(deserializer: D) -> Result<Option<Linkage>, D::Error>
where
    D: Deserializer<'de>,
{
    Linkage::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_object")]
    pub attributes: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Resource {
    /// Serialize an entity for a create or update request.
    ///
    /// Provisional IDs are never sent; links are written with the target
    /// type taken from the kind's relationship descriptors.
    pub fn from_entity<A: Attributes>(entity: &Entity<A>) -> Result<Self, ApiError> {
        let attributes = serde_json::to_value(&entity.attributes)
            .map_err(|e| ApiError::InvalidResource(format!("{} {}: {e}", A::KIND, entity.id)))?;

        let mut relationships = BTreeMap::new();
        for (name, link) in &entity.relationships {
            let Some((relation, _)) = A::relations().find(name) else {
                continue;
            };
            let target = relation.target.type_name();
            let identifier = |id: &crate::entities::EntityId| ResourceIdentifier {
                id: id.to_string(),
                kind: target.to_string(),
            };
            let data = match link {
                Link::One(parent) => Linkage::One(parent.as_ref().filter(|id| !id.is_provisional()).map(identifier)),
                Link::Many(ids) => Linkage::Many(ids.iter().filter(|id| !id.is_provisional()).map(identifier).collect()),
            };
            relationships.insert(name.to_string(), Relationship::new(data));
        }

        Ok(Self {
            id: entity.is_persisted().then(|| entity.id.to_string()),
            kind: A::KIND.type_name().to_string(),
            attributes,
            relationships,
        })
    }
}
