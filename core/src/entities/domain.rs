use chrono::{DateTime, FixedOffset, NaiveDate};

use super::{list_as, parse_date, parse_datetime, strings, text, Contact};
use crate::error::ApiError;
use crate::registry::EntityKind;
use crate::value::Value;

entity_view! {
    /// A domain registration.
    Domain => Domain
}

entity_view! {
    /// A name server with optional glue addresses.
    NameServer => NameServer
}

impl Domain {
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn idn(&self) -> Option<&str> {
        self.str_field("idn")
    }

    /// Registrant.
    pub fn ownerc(&self) -> Result<Option<Contact>, ApiError> {
        self.contact("ownerc")
    }

    pub fn adminc(&self) -> Result<Option<Contact>, ApiError> {
        self.contact("adminc")
    }

    pub fn techc(&self) -> Result<Option<Contact>, ApiError> {
        self.contact("techc")
    }

    pub fn zonec(&self) -> Result<Option<Contact>, ApiError> {
        self.contact("zonec")
    }

    fn contact(&self, field: &str) -> Result<Option<Contact>, ApiError> {
        Ok(self
            .association(field, Some("Contact"))?
            .and_then(|entity| Contact::try_from(entity).ok()))
    }

    pub fn name_servers(&self) -> Vec<NameServer> {
        list_as(self, &["nameServers", "name_servers"], EntityKind::NameServer)
            .into_iter()
            .map(NameServer)
            .collect()
    }

    pub fn name_server_names(&self) -> Vec<String> {
        self.name_servers()
            .iter()
            .filter_map(|ns| ns.name().map(str::to_string))
            .collect()
    }

    /// Paid-until date (`payable`, falling back to `expire`).
    pub fn expire_date(&self) -> Option<NaiveDate> {
        parse_date(self.get_any(&["payable", "expire"]))
    }

    /// `None` when the status is missing or not recognised.
    pub fn auto_renew(&self) -> Option<bool> {
        match self.get_any(&["autoRenewStatus", "auto_renew_status"])? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.as_str() {
                "true" | "TRUE" | "1" | "ACTIVE" => Some(true),
                "false" | "FALSE" | "0" | "INACTIVE" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn registry_status(&self) -> Option<String> {
        text(self, &["registryStatus", "registry_status"])
    }

    pub fn registrar_status(&self) -> Option<String> {
        text(self, &["registrarStatus", "registrar_status"])
    }

    /// Transfer key.
    pub fn auth_info(&self) -> Option<String> {
        text(self, &["authinfo", "auth_info"])
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }

    pub fn updated_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("updated"))
    }
}

impl NameServer {
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn ipv4(&self) -> Vec<String> {
        strings(self, &["ipsV4", "ips_v4"])
    }

    pub fn ipv6(&self) -> Vec<String> {
        strings(self, &["ipsV6", "ips_v6"])
    }
}
