//! Static table of the entity kinds the API exposes.
//!
//! # Design
//! The table is a `const` array indexed by [`EntityKind`], so it is built at
//! compile time and can never be mutated. The mapper resolves JSON type names
//! through [`EntityKind::from_type_name`]; the client uses
//! [`EntityKind::index`] to address its per-kind collection slots.

use std::fmt;

use crate::inflect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Domain,
    Contact,
    Zone,
    ZoneRecord,
    Certificate,
    NameServer,
    Job,
    PollMessage,
    Whois,
    Redirect,
    SslContact,
    TransferOut,
    DomainStudio,
    DomainCancelation,
}

/// How one entity kind maps onto the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    /// Canonical type name, as used in `type` fields.
    pub type_name: &'static str,
    /// Path segment for `<resource>`, `<resource>/_search`, `<resource>/<id>`.
    pub resource_path: &'static str,
    /// Name the client exposes the collection under.
    pub collection_name: &'static str,
}

const fn entry(
    kind: EntityKind,
    type_name: &'static str,
    resource_path: &'static str,
    collection_name: &'static str,
) -> EntityDescriptor {
    EntityDescriptor {
        kind,
        type_name,
        resource_path,
        collection_name,
    }
}

pub const REGISTRY: [EntityDescriptor; 14] = [
    entry(EntityKind::Domain, "Domain", "domain", "domains"),
    entry(EntityKind::Contact, "Contact", "contact", "contacts"),
    entry(EntityKind::Zone, "Zone", "zone", "zones"),
    entry(EntityKind::ZoneRecord, "ZoneRecord", "zone", "zone_records"),
    entry(EntityKind::Certificate, "Certificate", "certificate", "certificates"),
    entry(EntityKind::NameServer, "NameServer", "nameserver", "name_servers"),
    entry(EntityKind::Job, "Job", "job", "jobs"),
    entry(EntityKind::PollMessage, "PollMessage", "poll", "poll_messages"),
    entry(EntityKind::Whois, "Whois", "domainstudio", "whois"),
    entry(EntityKind::Redirect, "Redirect", "redirect", "redirects"),
    entry(EntityKind::SslContact, "SslContact", "sslcontact", "ssl_contacts"),
    entry(EntityKind::TransferOut, "TransferOut", "transferout", "transfer_outs"),
    entry(EntityKind::DomainStudio, "DomainStudio", "domainstudio", "domain_studios"),
    entry(
        EntityKind::DomainCancelation,
        "DomainCancelation",
        "domain/cancelation",
        "domain_cancelations",
    ),
];

impl EntityKind {
    pub const ALL: [EntityKind; 14] = [
        EntityKind::Domain,
        EntityKind::Contact,
        EntityKind::Zone,
        EntityKind::ZoneRecord,
        EntityKind::Certificate,
        EntityKind::NameServer,
        EntityKind::Job,
        EntityKind::PollMessage,
        EntityKind::Whois,
        EntityKind::Redirect,
        EntityKind::SslContact,
        EntityKind::TransferOut,
        EntityKind::DomainStudio,
        EntityKind::DomainCancelation,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static EntityDescriptor {
        &REGISTRY[self.index()]
    }

    pub fn type_name(self) -> &'static str {
        self.descriptor().type_name
    }

    pub fn resource_path(self) -> &'static str {
        self.descriptor().resource_path
    }

    pub fn collection_name(self) -> &'static str {
        self.descriptor().collection_name
    }

    /// Exact match on the canonical type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        REGISTRY.iter().find(|d| d.type_name == name).map(|d| d.kind)
    }

    /// Resolves a collection name (`"zone_records"`) or any spelling of the
    /// type name (`"ZoneRecord"`, `"zone_record"`).
    pub fn from_collection_name(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|d| d.collection_name == name)
            .map(|d| d.kind)
            .or_else(|| Self::from_type_name(&inflect::classify(name)))
    }

    /// Default foreign key other kinds use to point at this one: `domain_id`.
    pub fn foreign_key(self) -> String {
        format!("{}_id", inflect::snake_case(self.type_name()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
        }
    }

    #[test]
    fn type_name_lookup_is_exact() {
        assert_eq!(EntityKind::from_type_name("Domain"), Some(EntityKind::Domain));
        assert_eq!(EntityKind::from_type_name("ZoneRecord"), Some(EntityKind::ZoneRecord));
        assert_eq!(EntityKind::from_type_name("domain"), None);
        assert_eq!(EntityKind::from_type_name("PERSON"), None);
    }

    #[test]
    fn collection_names_resolve() {
        assert_eq!(EntityKind::from_collection_name("domains"), Some(EntityKind::Domain));
        assert_eq!(EntityKind::from_collection_name("zone_records"), Some(EntityKind::ZoneRecord));
        assert_eq!(EntityKind::from_collection_name("whois"), Some(EntityKind::Whois));
        assert_eq!(EntityKind::from_collection_name("Contact"), Some(EntityKind::Contact));
        assert_eq!(EntityKind::from_collection_name("widgets"), None);
    }

    #[test]
    fn resource_paths_follow_the_api() {
        assert_eq!(EntityKind::Domain.resource_path(), "domain");
        assert_eq!(EntityKind::PollMessage.resource_path(), "poll");
        assert_eq!(EntityKind::DomainCancelation.resource_path(), "domain/cancelation");
    }

    #[test]
    fn foreign_key_is_snake_cased() {
        assert_eq!(EntityKind::Domain.foreign_key(), "domain_id");
        assert_eq!(EntityKind::ZoneRecord.foreign_key(), "zone_record_id");
    }
}
