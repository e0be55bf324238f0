//! The normalized AutoDNS response envelope.
//!
//! Every successful call is reduced to the same shape:
//! `{status: {type, text}, stid, data: [...], object, ctid}`. Bodies that are
//! not JSON objects produce an empty envelope instead of an error.

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    /// `status.type`, e.g. `"success"`.
    pub status: Option<String>,
    /// `status.text`.
    pub status_text: Option<String>,
    /// Server transaction id.
    pub stid: Option<String>,
    /// Raw result objects, empty when the server sent none.
    pub data: Vec<Value>,
    /// Single object or summary info (`{"summary": 42}` on searches).
    pub object: Option<Value>,
    /// Client transaction id echoed by the server.
    pub ctid: Option<String>,
}

impl Envelope {
    /// Decodes a response body. Never fails.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let status = map.get("status");
        let data = match map.get("data") {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        };
        Self {
            status: string_at(status, "type"),
            status_text: string_at(status, "text"),
            stid: map.get("stid").and_then(scalar_string),
            data,
            object: map.get("object").filter(|v| !v.is_null()).cloned(),
            ctid: map.get("ctid").and_then(scalar_string),
        }
    }

    /// The first data item, falling back to `object`.
    pub fn first_payload(&self) -> Option<&Value> {
        self.data.first().or(self.object.as_ref())
    }

    /// The server-reported `object.summary` count of a search.
    pub fn summary(&self) -> Option<u64> {
        self.object.as_ref()?.get("summary")?.as_u64()
    }

    /// `status.type` is `SUCCESS`, in any case.
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("success"))
    }
}

fn string_at(parent: Option<&Value>, key: &str) -> Option<String> {
    parent?.get(key).and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
