//! Strongly-typed views over [`Entity`] for each registered kind.
//!
//! Each view is a newtype that dereferences to the underlying entity, so the
//! generic `get`/`set`/association API stays available next to the named
//! accessors. Views are obtained with `TryFrom<Entity>`, which hands the
//! entity back unchanged when its kind does not match.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::entity::Entity;
use crate::registry::EntityKind;
use crate::value::Value;

macro_rules! entity_view {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(crate::entity::Entity);

        impl $name {
            pub const KIND: crate::registry::EntityKind = crate::registry::EntityKind::$kind;

            pub fn into_entity(self) -> crate::entity::Entity {
                self.0
            }
        }

        impl TryFrom<crate::entity::Entity> for $name {
            type Error = crate::entity::Entity;

            fn try_from(entity: crate::entity::Entity) -> Result<Self, Self::Error> {
                if entity.kind() == Self::KIND {
                    Ok(Self(entity))
                } else {
                    Err(entity)
                }
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::entity::Entity;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

mod contact;
mod domain;
mod domain_studio;
mod job;
mod transfer;
mod zone;

pub use contact::{Contact, SslContact};
pub use domain::{Domain, NameServer};
pub use domain_studio::{DomainStudio, SearchOptions, Whois};
pub use job::{Job, PollMessage};
pub use transfer::{Certificate, CancelationOptions, DomainCancelation, Redirect, TransferAnswer, TransferOut};
pub use zone::{Zone, ZoneRecord};

/// Elements of a list field as entities of `kind`. Items that decoded to
/// another kind or to generic records are re-read as `kind`.
pub(crate) fn list_as(entity: &Entity, fields: &[&str], kind: EntityKind) -> Vec<Entity> {
    let Some(Value::List(items)) = entity.get_any(fields) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Entity(e) if e.kind() == kind => Some((**e).clone()),
            Value::Entity(_) | Value::Record(_) => {
                Entity::from_json(kind, &item.to_json(), entity.client_ref())
            }
            _ => None,
        })
        .collect()
}

/// Scalar list field as strings.
pub(crate) fn strings(entity: &Entity, fields: &[&str]) -> Vec<String> {
    entity
        .get_any(fields)
        .and_then(Value::as_list)
        .map(|items| items.iter().filter_map(Value::to_text).collect())
        .unwrap_or_default()
}

/// First non-null field among `fields` as text.
pub(crate) fn text(entity: &Entity, fields: &[&str]) -> Option<String> {
    entity.get_any(fields).and_then(Value::to_text)
}

/// AutoDNS timestamps look like `2024-01-15T10:30:00.000+0100`.
pub(crate) fn parse_datetime(value: Option<&Value>) -> Option<DateTime<FixedOffset>> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

pub(crate) fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    let raw = value?.as_str()?.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_autodns_timestamps() {
        let value = Value::from("2024-01-15T10:30:00.000+0100");
        let parsed = parse_datetime(Some(&value)).unwrap();
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.offset().local_minus_utc(), 3600);

        let rfc = Value::from("2024-01-15T10:30:00Z");
        assert!(parse_datetime(Some(&rfc)).is_some());
        assert!(parse_datetime(Some(&Value::from("yesterday"))).is_none());
        assert!(parse_datetime(None).is_none());
    }

    #[test]
    fn parses_dates_with_time_suffix() {
        let value = Value::from("2025-03-01T00:00:00.000+0100");
        let date = parse_date(Some(&value)).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 3, 1));
        assert!(parse_date(Some(&Value::from(""))).is_none());
    }
}
