use chrono::{DateTime, FixedOffset};

use super::{parse_datetime, strings, text};
use crate::entity::Entity;

entity_view! {
    /// A domain contact handle.
    Contact => Contact
}

entity_view! {
    /// A contact used for SSL certificate orders.
    SslContact => SslContact
}

fn full_name(entity: &Entity) -> String {
    [entity.str_field("fname"), entity.str_field("lname")]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Contact {
    pub fn fname(&self) -> Option<&str> {
        self.str_field("fname")
    }

    pub fn lname(&self) -> Option<&str> {
        self.str_field("lname")
    }

    pub fn full_name(&self) -> String {
        full_name(self)
    }

    pub fn organization(&self) -> Option<&str> {
        self.str_field("organization")
    }

    /// `PERSON`, `ORG`, ...
    pub fn contact_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn address(&self) -> Vec<String> {
        strings(self, &["address"])
    }

    pub fn city(&self) -> Option<&str> {
        self.str_field("city")
    }

    pub fn postal_code(&self) -> Option<String> {
        text(self, &["pcode", "postal_code"])
    }

    /// ISO 3166-1 alpha-2.
    pub fn country(&self) -> Option<&str> {
        self.str_field("country")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn phone(&self) -> Option<&str> {
        self.str_field("phone")
    }

    /// Name shown in listings: full name, else organization, else id.
    pub fn label(&self) -> String {
        let name = self.full_name();
        if !name.is_empty() {
            return name;
        }
        self.organization()
            .map(str::to_string)
            .or_else(|| self.id().map(ToString::to_string))
            .unwrap_or_default()
    }
}

impl SslContact {
    pub fn fname(&self) -> Option<&str> {
        self.str_field("fname")
    }

    pub fn lname(&self) -> Option<&str> {
        self.str_field("lname")
    }

    pub fn full_name(&self) -> String {
        full_name(self)
    }

    pub fn organization(&self) -> Option<&str> {
        self.str_field("organization")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_field("email")
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::EntityKind;

    #[test]
    fn full_name_skips_blank_parts() {
        let c = Contact::try_from(Entity::new(
            EntityKind::Contact,
            json!({"fname": "Jane", "lname": "", "pcode": 10115, "address": ["Main St 1", "Floor 2"]}),
        ))
        .unwrap();
        assert_eq!(c.full_name(), "Jane");
        assert_eq!(c.postal_code().as_deref(), Some("10115"));
        assert_eq!(c.address(), vec!["Main St 1", "Floor 2"]);
    }

    #[test]
    fn label_falls_back_to_organization_then_id() {
        let org = Contact::try_from(Entity::new(
            EntityKind::Contact,
            json!({"id": 4, "organization": "ACME"}),
        ))
        .unwrap();
        assert_eq!(org.label(), "ACME");
        let bare = Contact::try_from(Entity::new(EntityKind::Contact, json!({"id": 4}))).unwrap();
        assert_eq!(bare.label(), "4");
    }

    #[test]
    fn ssl_contact_fields() {
        let c = SslContact::try_from(Entity::new(
            EntityKind::SslContact,
            json!({"fname": "A", "lname": "B", "title": "CTO"}),
        ))
        .unwrap();
        assert_eq!(c.full_name(), "A B");
        assert_eq!(c.title(), Some("CTO"));
    }
}
