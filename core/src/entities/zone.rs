use chrono::{DateTime, FixedOffset};

use super::{list_as, parse_datetime, text, NameServer};
use crate::registry::EntityKind;
use crate::value::Value;

entity_view! {
    /// A DNS zone.
    Zone => Zone
}

entity_view! {
    /// One resource record inside a zone.
    ZoneRecord => ZoneRecord
}

impl Zone {
    /// Zone apex (`origin`, falling back to `name`).
    pub fn origin(&self) -> Option<String> {
        text(self, &["origin", "name"])
    }

    pub fn soa_email(&self) -> Option<String> {
        text(self, &["soaEmail", "soa_email"])
    }

    pub fn primary_name_server(&self) -> Option<String> {
        text(self, &["virtualNameServer", "primary_nameserver"])
    }

    pub fn system_name_server(&self) -> Option<String> {
        text(self, &["systemNameServer", "system_name_server"])
    }

    pub fn resource_records(&self) -> Vec<ZoneRecord> {
        list_as(self, &["resourceRecords", "resource_records"], EntityKind::ZoneRecord)
            .into_iter()
            .map(ZoneRecord)
            .collect()
    }

    pub fn name_servers(&self) -> Vec<NameServer> {
        list_as(self, &["nameServers", "name_servers"], EntityKind::NameServer)
            .into_iter()
            .filter_map(|entity| NameServer::try_from(entity).ok())
            .collect()
    }

    pub fn is_dnssec(&self) -> bool {
        self.get("dnssec").and_then(Value::as_bool) == Some(true)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("updated"))
    }
}

impl ZoneRecord {
    /// Owner name relative to the zone; empty or `@` for the apex.
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// `A`, `AAAA`, `MX`, ...
    pub fn record_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn value(&self) -> Option<&str> {
        self.str_field("value")
    }

    pub fn ttl(&self) -> Option<u64> {
        self.get("ttl").and_then(Value::as_u64)
    }

    /// MX/SRV priority.
    pub fn pref(&self) -> Option<u64> {
        self.get_any(&["pref", "priority"]).and_then(Value::as_u64)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::entity::Entity;

    #[test]
    fn records_typed_by_kind_field_are_rewrapped() {
        let zone = Zone::try_from(Entity::new(
            EntityKind::Zone,
            json!({
                "origin": "example.com",
                "dnssec": true,
                "resourceRecords": [
                    {"name": "www", "type": "A", "value": "192.0.2.10", "ttl": 600},
                    {"name": "", "type": "MX", "value": "mail.example.com", "pref": 10}
                ]
            }),
        ))
        .unwrap();

        // `type: A` names no entity kind, so the payload decodes to records.
        let raw = zone.get("resourceRecords").and_then(Value::as_list).unwrap();
        assert!(raw[0].as_record().is_some());

        let records = zone.resource_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type(), Some("A"));
        assert_eq!(records[0].ttl(), Some(600));
        assert_eq!(records[1].pref(), Some(10));
        assert_eq!(zone.origin().as_deref(), Some("example.com"));
        assert!(zone.is_dnssec());
    }

    #[test]
    fn origin_falls_back_to_name() {
        let zone = Zone::try_from(Entity::new(EntityKind::Zone, json!({"name": "b.org"}))).unwrap();
        assert_eq!(zone.origin().as_deref(), Some("b.org"));
        assert!(zone.resource_records().is_empty());
        assert!(!zone.is_dnssec());
    }
}
