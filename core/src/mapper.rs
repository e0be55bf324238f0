//! Maps raw JSON payloads onto entities.
//!
//! # Design
//! Decoding is total: every well-formed JSON value maps to some [`Value`].
//! An object becomes an [`Entity`] when a type name can be resolved for it
//! and that name is registered, otherwise a generic record. The type name
//! comes from, in order:
//!
//! 1. the object's own `type` field,
//! 2. a fixed table of AutoDNS field names (`ownerc` → `Contact`, ...),
//! 3. the field name itself, singularized and camel-cased.
//!
//! Arrays pass the singularized field name down to their elements, so
//! `zones: [{..}]` decodes each element with the hint `zone`.

use serde_json::Map;

use crate::client::ClientRef;
use crate::entity::Entity;
use crate::inflect;
use crate::registry::EntityKind;
use crate::value::{Record, Value};

pub fn decode(raw: &serde_json::Value, hint: Option<&str>, client: &ClientRef) -> Value {
    match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.clone()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            let singular = hint.map(inflect::singularize);
            Value::List(
                items
                    .iter()
                    .map(|item| decode(item, singular.as_deref(), client))
                    .collect(),
            )
        }
        serde_json::Value::Object(map) => match resolve_kind(map, hint) {
            Some(kind) => Value::Entity(Box::new(Entity::with_client(
                kind,
                decode_fields(map, client),
                client.clone(),
            ))),
            None => Value::Record(decode_fields(map, client)),
        },
    }
}

/// Decodes every field of an object, each with its own key as the hint.
pub fn decode_fields(map: &Map<String, serde_json::Value>, client: &ClientRef) -> Record {
    map.iter()
        .map(|(key, value)| (key.clone(), decode(value, Some(key), client)))
        .collect()
}

/// The type name an object resolves to, registered or not.
pub fn resolve_type_name(map: &Map<String, serde_json::Value>, hint: Option<&str>) -> Option<String> {
    if let Some(explicit) = map.get("type").and_then(serde_json::Value::as_str) {
        return Some(inflect::classify(explicit));
    }
    let hint = hint?;
    Some(match known_field_type(hint) {
        Some(name) => name.to_string(),
        None => inflect::classify(hint),
    })
}

pub fn resolve_kind(map: &Map<String, serde_json::Value>, hint: Option<&str>) -> Option<EntityKind> {
    resolve_type_name(map, hint).and_then(|name| EntityKind::from_type_name(&name))
}

/// AutoDNS field names whose type cannot be derived from the name.
fn known_field_type(hint: &str) -> Option<&'static str> {
    match hint {
        "ownerc" | "adminc" | "techc" | "zonec" => Some("Contact"),
        "nameServers" | "name_servers" | "nameServer" | "name_server" => Some("NameServer"),
        "resourceRecords" | "resource_records" | "resourceRecord" | "resource_record" => {
            Some("ZoneRecord")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn detached() -> ClientRef {
        ClientRef::default()
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(decode(&json!("x"), Some("name"), &detached()), Value::String("x".into()));
        assert_eq!(decode(&json!(3), None, &detached()), Value::from(3));
        assert_eq!(decode(&json!(null), None, &detached()), Value::Null);
    }

    #[test]
    fn contact_hints_become_contacts() {
        let value = decode(&json!({"id": 5, "fname": "Jane"}), Some("adminc"), &detached());
        let entity = value.as_entity().expect("entity");
        assert_eq!(entity.kind(), EntityKind::Contact);
        assert_eq!(entity.get("fname").and_then(Value::as_str), Some("Jane"));
    }

    #[test]
    fn explicit_type_wins_over_hint() {
        let value = decode(&json!({"type": "Domain", "id": "a.com"}), Some("ownerc"), &detached());
        assert_eq!(value.as_entity().map(Entity::kind), Some(EntityKind::Domain));
    }

    #[test]
    fn unregistered_explicit_type_yields_record() {
        let value = decode(&json!({"type": "PERSON", "id": 9}), Some("ownerc"), &detached());
        let record = value.as_record().expect("record");
        assert_eq!(record.get("type").and_then(Value::as_str), Some("PERSON"));
    }

    #[test]
    fn arrays_singularize_the_hint() {
        let raw = json!({"zones": [{"origin": "a.com"}, {"origin": "b.com"}]});
        let value = decode(&raw, None, &detached());
        let zones = value.get("zones").and_then(Value::as_list).expect("list");
        assert_eq!(zones.len(), 2);
        assert!(zones.iter().all(|z| z.as_entity().map(Entity::kind) == Some(EntityKind::Zone)));
    }

    #[test]
    fn resource_records_map_to_zone_records() {
        let raw = json!({"resourceRecords": [{"name": "www", "value": "1.2.3.4"}]});
        let value = decode(&raw, None, &detached());
        let records = value.get("resourceRecords").and_then(Value::as_list).unwrap();
        assert_eq!(records[0].as_entity().map(Entity::kind), Some(EntityKind::ZoneRecord));
    }

    #[test]
    fn name_servers_map_through_plural_field() {
        let raw = json!({"nameServers": [{"name": "ns1.example.com"}]});
        let value = decode(&raw, None, &detached());
        let servers = value.get("nameServers").and_then(Value::as_list).unwrap();
        assert_eq!(servers[0].as_entity().map(Entity::kind), Some(EntityKind::NameServer));
    }

    #[test]
    fn unknown_objects_nest_as_records() {
        let raw = json!({"extensions": {"trustee": {"enabled": true}}});
        let value = decode(&raw, None, &detached());
        let trustee = value
            .get("extensions")
            .and_then(|e| e.get("trustee"))
            .and_then(Value::as_record)
            .expect("nested record");
        assert_eq!(trustee.get("enabled"), Some(&Value::Bool(true)));
    }

    #[test]
    fn scalar_arrays_stay_scalar() {
        let value = decode(&json!(["a", 1, null]), Some("tags"), &detached());
        assert_eq!(
            value,
            Value::List(vec![Value::from("a"), Value::from(1), Value::Null])
        );
    }

    #[test]
    fn decoded_values_round_trip_to_json() {
        let raw = json!({
            "name": "example.com",
            "ownerc": {"id": 1, "fname": "Jane"},
            "nameServers": [{"name": "ns1"}],
            "extensions": {"x": [1, 2]}
        });
        assert_eq!(decode(&raw, None, &detached()).to_json(), raw);
    }
}
