use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::{parse_date, parse_datetime, text};
use crate::client::Client;
use crate::entity::Entity;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::value::Value;

entity_view! {
    /// An outgoing transfer waiting for our answer.
    TransferOut => TransferOut
}

entity_view! {
    /// A web or mail redirect.
    Redirect => Redirect
}

entity_view! {
    /// A pending domain cancelation.
    DomainCancelation => DomainCancelation
}

entity_view! {
    /// An SSL certificate.
    Certificate => Certificate
}

/// Reply to a transfer-out request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferAnswer {
    Ack,
    Nack,
}

impl TransferAnswer {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferAnswer::Ack => "ACK",
            TransferAnswer::Nack => "NACK",
        }
    }
}

impl TransferOut {
    pub fn domain(&self) -> Option<&str> {
        self.str_field("domain")
    }

    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn gaining_registrar(&self) -> Option<String> {
        text(self, &["gainingRegistrar", "gaining_registrar"])
    }

    pub fn losing_registrar(&self) -> Option<String> {
        text(self, &["losingRegistrar", "losing_registrar"])
    }

    pub fn request_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get_any(&["requestDate", "request_date"]))
    }

    pub fn ack_deadline(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get_any(&["ackDeadline", "ack_deadline"]))
    }

    /// `POST transferout/<domain>/_answer`. False without a client or a
    /// domain, or when the request fails.
    pub fn answer(&self, answer: TransferAnswer) -> bool {
        let (Some(client), Some(domain)) = (self.client(), self.domain()) else {
            return false;
        };
        let path = format!("{}/{domain}/_answer", Self::KIND.resource_path());
        match client.post(&path, Some(&json!({ "answer": answer }))) {
            Ok(_) => true,
            Err(err) => {
                debug!(%path, answer = answer.as_str(), error = %err, "transfer answer failed");
                false
            }
        }
    }

    pub fn approve(&self) -> bool {
        self.answer(TransferAnswer::Ack)
    }

    pub fn deny(&self) -> bool {
        self.answer(TransferAnswer::Nack)
    }
}

impl Redirect {
    pub fn source(&self) -> Option<&str> {
        self.str_field("source")
    }

    pub fn target(&self) -> Option<&str> {
        self.str_field("target")
    }

    /// `HEADER301`, `HEADER302`, `FRAME`, ...
    pub fn redirect_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn mode(&self) -> Option<&str> {
        self.str_field("mode")
    }

    pub fn domain(&self) -> Option<&str> {
        self.str_field("domain")
    }

    /// Page title for frame redirects.
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    pub fn is_active(&self) -> bool {
        self.get("active").and_then(Value::as_bool) == Some(true)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }
}

/// Body fields of a new cancelation besides the domain name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CancelationOptions {
    /// `DELETE`, `TRANSIT`, ...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub cancelation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<bool>,
}

impl DomainCancelation {
    fn domain_path(domain: &str) -> String {
        format!("domain/{domain}/cancelation")
    }

    fn from_envelope(client: &Client, envelope: &Envelope) -> Option<DomainCancelation> {
        envelope
            .first_payload()
            .and_then(|raw| Entity::from_json(Self::KIND, raw, &client.downgrade()))
            .map(DomainCancelation)
    }

    /// `POST domain/<domain>/cancelation`.
    pub fn create(
        client: &Client,
        domain: &str,
        options: &CancelationOptions,
    ) -> Result<Option<DomainCancelation>, ApiError> {
        let mut body = serde_json::to_value(options)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("domain".to_string(), json!(domain));
        }
        let envelope = client.post(&Self::domain_path(domain), Some(&body))?;
        Ok(Self::from_envelope(client, &envelope))
    }

    /// `GET domain/<domain>/cancelation`.
    pub fn info(client: &Client, domain: &str) -> Result<Option<DomainCancelation>, ApiError> {
        let envelope = client.get(&Self::domain_path(domain), &[])?;
        Ok(Self::from_envelope(client, &envelope))
    }

    /// `POST domain/cancelation/_search` with an optional raw query body.
    pub fn list(client: &Client, query: Option<&serde_json::Value>) -> Result<Vec<DomainCancelation>, ApiError> {
        let path = format!("{}/_search", Self::KIND.resource_path());
        let envelope = client.post(&path, query)?;
        let handle = client.downgrade();
        Ok(envelope
            .data
            .iter()
            .filter_map(|raw| Entity::from_json(Self::KIND, raw, &handle))
            .map(DomainCancelation)
            .collect())
    }

    /// `PUT domain/<domain>/cancelation` with the current attributes. No-op
    /// without a domain or a client.
    pub fn save(&mut self) -> Result<(), ApiError> {
        let (Some(client), Some(domain)) = (self.client(), self.domain().map(str::to_string)) else {
            return Ok(());
        };
        let envelope = client.put(&Self::domain_path(&domain), Some(&self.to_json()))?;
        if let Some(updated) = Self::from_envelope(&client, &envelope) {
            self.0.adopt(updated.0);
        }
        Ok(())
    }

    /// `DELETE domain/<domain>/cancelation`, withdrawing the request.
    pub fn delete(&self) -> Result<(), ApiError> {
        let (Some(client), Some(domain)) = (self.client(), self.domain()) else {
            return Ok(());
        };
        client.delete(&Self::domain_path(domain))?;
        Ok(())
    }

    pub fn domain(&self) -> Option<&str> {
        self.str_field("domain")
    }

    pub fn cancelation_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn exec_date(&self) -> Option<NaiveDate> {
        parse_date(self.get_any(&["execdate", "exec_date"]))
    }

    pub fn registry_status(&self) -> Option<String> {
        text(self, &["registryStatus", "registry_status"])
    }

    pub fn gaining_registrar(&self) -> Option<String> {
        text(self, &["gainingRegistrar", "gaining_registrar"])
    }

    pub fn is_disconnect(&self) -> bool {
        self.get("disconnect").and_then(Value::as_bool) == Some(true)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }
}

impl Certificate {
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn common_name(&self) -> Option<String> {
        text(self, &["commonName", "common_name"])
    }
}
