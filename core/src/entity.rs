//! Typed records decoded from API payloads.
//!
//! # Design
//! An `Entity` is a field bag tagged with its [`EntityKind`]. Fields are read
//! and written through [`Entity::get`] and [`Entity::set`]; `set` runs the
//! replacement through the same mapper as construction, so a nested object
//! assigned later types exactly as it would have in the original payload.
//!
//! Entities keep a weak handle to the client that produced them. Related
//! entities are only fetched when [`Entity::association`] or
//! [`Entity::has_many`] is called, and each result is cached per association
//! name for the lifetime of the instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::client::{Client, ClientRef};
use crate::error::ApiError;
use crate::inflect;
use crate::mapper;
use crate::registry::EntityKind;
use crate::value::{record_to_json, Record, Value};

#[derive(Clone)]
pub struct Entity {
    kind: EntityKind,
    attributes: Record,
    client: ClientRef,
    singular: RefCell<HashMap<String, Option<Entity>>>,
    plural: RefCell<HashMap<String, Vec<Entity>>>,
}

impl Entity {
    /// Builds a detached entity from a JSON object. Non-object input yields
    /// an entity without attributes.
    pub fn new(kind: EntityKind, attributes: serde_json::Value) -> Self {
        Self::from_json(kind, &attributes, &ClientRef::default())
            .unwrap_or_else(|| Self::with_client(kind, Record::new(), ClientRef::default()))
    }

    pub(crate) fn with_client(kind: EntityKind, attributes: Record, client: ClientRef) -> Self {
        Self {
            kind,
            attributes,
            client,
            singular: RefCell::default(),
            plural: RefCell::default(),
        }
    }

    /// Decodes `raw` as `kind` regardless of its `type` field. `None` unless
    /// `raw` is an object.
    pub(crate) fn from_json(kind: EntityKind, raw: &serde_json::Value, client: &ClientRef) -> Option<Self> {
        let map = raw.as_object()?;
        Some(Self::with_client(kind, mapper::decode_fields(map, client), client.clone()))
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn resource_path(&self) -> &'static str {
        self.kind.resource_path()
    }

    /// The `id` field, unless absent or null.
    pub fn id(&self) -> Option<&Value> {
        self.attributes.get("id").filter(|v| !v.is_null())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// First present, non-null field among `fields`.
    pub fn get_any(&self, fields: &[&str]) -> Option<&Value> {
        fields
            .iter()
            .find_map(|f| self.attributes.get(*f).filter(|v| !v.is_null()))
    }

    /// String field shortcut.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<serde_json::Value>) {
        let decoded = mapper::decode(&value.into(), Some(field), &self.client);
        self.attributes.insert(field.to_string(), decoded);
    }

    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    pub fn client(&self) -> Option<Client> {
        self.client.upgrade()
    }

    pub(crate) fn client_ref(&self) -> &ClientRef {
        &self.client
    }

    /// Plain JSON object of the attributes, nested entities flattened.
    pub fn to_json(&self) -> serde_json::Value {
        record_to_json(&self.attributes)
    }

    /// Resolves a singular relation. An already-decoded entity is returned
    /// as-is; an `{id: ...}` record is looked up through the target kind's
    /// collection. Missing client or unknown target kind yields `None`.
    pub fn association(&self, name: &str, target: Option<&str>) -> Result<Option<Entity>, ApiError> {
        if let Some(cached) = self.singular.borrow().get(name) {
            return Ok(cached.clone());
        }
        let resolved = self.resolve_singular(name, target)?;
        self.singular
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn resolve_singular(&self, name: &str, target: Option<&str>) -> Result<Option<Entity>, ApiError> {
        let id = match self.attributes.get(name) {
            Some(Value::Entity(entity)) => return Ok(Some((**entity).clone())),
            Some(Value::Record(record)) => match record.get("id").and_then(Value::to_text) {
                Some(id) => id,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        let Some(kind) = target_kind(name, target) else {
            return Ok(None);
        };
        let Some(client) = self.client.upgrade() else {
            return Ok(None);
        };
        debug!(owner = %self.kind, association = name, target = %kind, %id, "resolving association");
        client.collection(kind).find(&id)
    }

    /// Resolves a plural relation by querying the target collection with
    /// `foreign_key = self.id` (default `<owner>_id`). A list of decoded
    /// entities already held in the field is returned without a request.
    pub fn has_many(
        &self,
        name: &str,
        foreign_key: Option<&str>,
        target: Option<&str>,
    ) -> Result<Vec<Entity>, ApiError> {
        if let Some(cached) = self.plural.borrow().get(name) {
            return Ok(cached.clone());
        }
        let resolved = self.resolve_plural(name, foreign_key, target)?;
        self.plural
            .borrow_mut()
            .insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn resolve_plural(
        &self,
        name: &str,
        foreign_key: Option<&str>,
        target: Option<&str>,
    ) -> Result<Vec<Entity>, ApiError> {
        if let Some(Value::List(items)) = self.attributes.get(name) {
            let entities: Option<Vec<Entity>> = items
                .iter()
                .map(|item| item.as_entity().cloned())
                .collect();
            if let Some(entities) = entities {
                return Ok(entities);
            }
        }
        let Some(kind) = target_kind(name, target) else {
            return Ok(Vec::new());
        };
        let (Some(client), Some(id)) = (self.client.upgrade(), self.id()) else {
            return Ok(Vec::new());
        };
        let key = foreign_key.map_or_else(|| self.kind.foreign_key(), str::to_string);
        debug!(owner = %self.kind, association = name, target = %kind, %key, "resolving has-many");
        let results = client
            .collection(kind)
            .filter([(key, id.to_json())])
            .all()?
            .to_vec();
        Ok(results)
    }

    /// Writes the current attributes back with `PUT <resource>/<id>` and
    /// adopts the server's answer. No-op without an id or a client.
    pub fn save(&mut self) -> Result<(), ApiError> {
        let (Some(client), Some(id)) = (self.client.upgrade(), self.id().and_then(Value::to_text)) else {
            return Ok(());
        };
        if let Some(updated) = client.collection(self.kind).update(&id, &*self)? {
            self.adopt(updated);
        }
        Ok(())
    }

    /// Sets every field of `changes`, then saves.
    pub fn update(&mut self, changes: serde_json::Value) -> Result<(), ApiError> {
        if let serde_json::Value::Object(map) = changes {
            for (key, value) in map {
                self.set(&key, value);
            }
        }
        self.save()
    }

    /// Re-fetches the entity by id and replaces its attributes.
    pub fn reload(&mut self) -> Result<(), ApiError> {
        let (Some(client), Some(id)) = (self.client.upgrade(), self.id().and_then(Value::to_text)) else {
            return Ok(());
        };
        if let Some(fresh) = client.collection(self.kind).find(&id)? {
            self.adopt(fresh);
        }
        Ok(())
    }

    /// Takes over the attributes of a fresher copy and drops cached
    /// associations.
    pub(crate) fn adopt(&mut self, other: Entity) {
        self.attributes = other.attributes;
        self.singular.get_mut().clear();
        self.plural.get_mut().clear();
    }

    /// Deletes the entity on the server. False without an id or a client, or
    /// when the request fails.
    pub fn destroy(&self) -> bool {
        match (self.client.upgrade(), self.id().and_then(Value::to_text)) {
            (Some(client), Some(id)) => client.collection(self.kind).delete(&id),
            _ => false,
        }
    }
}

fn target_kind(name: &str, target: Option<&str>) -> Option<EntityKind> {
    let type_name = target.map_or_else(|| inflect::classify(name), str::to_string);
    EntityKind::from_type_name(&type_name)
}

/// Same kind and the same non-null id.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id().is_some() && self.id() == other.id()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "{} #{}", self.kind, id),
            None => write!(f, "{} #", self.kind),
        }
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
