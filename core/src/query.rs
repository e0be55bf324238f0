//! Query descriptors and the `_search` request body.
//!
//! A [`Query`] is a plain value; every `with_*` method returns a modified
//! copy. [`Query::search_request`] renders the body AutoDNS expects:
//! `{view: {limit, offset}, filters: [{key, value, operator}], keys: [...]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Equal,
    Like,
}

impl Operator {
    /// `LIKE` when the value's text contains a `*` wildcard.
    pub fn for_value(value: &Value) -> Self {
        let wildcard = match value {
            Value::String(s) => s.contains('*'),
            other => other.to_string().contains('*'),
        };
        if wildcard {
            Operator::Like
        } else {
            Operator::Equal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: Value,
    pub operator: Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub view: View,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: EntityKind,
    /// Conditions in insertion order; a repeated key replaces the earlier value.
    pub conditions: Vec<(String, Value)>,
    pub limit: Option<u32>,
    pub offset: u32,
    pub keys: Option<Vec<String>>,
}

impl Query {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            limit: None,
            offset: 0,
            keys: None,
        }
    }

    pub fn with_conditions<K, V>(&self, conditions: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut next = self.clone();
        for (key, value) in conditions {
            let key = key.into();
            let value = value.into();
            match next.conditions.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => next.conditions.push((key, value)),
            }
        }
        next
    }

    pub fn with_limit(&self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }

    pub fn with_offset(&self, offset: u32) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    pub fn with_keys<S: Into<String>>(&self, keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            keys: Some(keys.into_iter().map(Into::into).collect()),
            ..self.clone()
        }
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.conditions
            .iter()
            .map(|(key, value)| Filter {
                key: key.clone(),
                value: value.clone(),
                operator: Operator::for_value(value),
            })
            .collect()
    }

    /// Body for one page of this query.
    pub fn search_request(&self, limit: u32, offset: u32) -> SearchRequest {
        SearchRequest {
            view: View { limit, offset },
            filters: self.filters(),
            keys: self.keys.clone(),
        }
    }
}
