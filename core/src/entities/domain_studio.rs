use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::client::Client;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::registry::EntityKind;
use crate::value::Value;

entity_view! {
    /// A name suggestion returned by a DomainStudio search.
    DomainStudio => DomainStudio
}

entity_view! {
    /// Availability of one domain, answered through DomainStudio.
    Whois => Whois
}

/// Optional knobs of a DomainStudio search. Unset fields are left out of
/// the request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_portfolio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_dns_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_premium: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_market: Option<bool>,
    /// Seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<serde_json::Value>,
}

fn wrap_all(client: &Client, kind: EntityKind, data: &[serde_json::Value]) -> Vec<Entity> {
    let handle = client.downgrade();
    data.iter()
        .filter_map(|raw| Entity::from_json(kind, raw, &handle))
        .collect()
}

impl DomainStudio {
    /// `POST domainstudio` with `searchToken` plus the set options.
    pub fn search(client: &Client, token: &str, options: &SearchOptions) -> Result<Vec<DomainStudio>, ApiError> {
        let mut body = serde_json::to_value(options)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("searchToken".to_string(), json!(token));
        }
        let envelope = client.post(EntityKind::DomainStudio.resource_path(), Some(&body))?;
        debug!(token, results = envelope.data.len(), "domainstudio search");
        Ok(wrap_all(client, Self::KIND, &envelope.data)
            .into_iter()
            .map(DomainStudio)
            .collect())
    }

    pub fn domain(&self) -> Option<&str> {
        self.str_field("domain")
    }

    pub fn idn(&self) -> Option<&str> {
        self.str_field("idn")
    }

    pub fn tld(&self) -> Option<&str> {
        self.str_field("tld")
    }

    /// Second-level registry suffix such as `co.uk`.
    pub fn sub_tld(&self) -> Option<&str> {
        self.get_any(&["subTld", "sub_tld"]).and_then(Value::as_str)
    }

    pub fn source(&self) -> Option<&str> {
        self.str_field("source")
    }

    pub fn services(&self) -> Option<&Value> {
        self.get("services")
    }

    fn service(&self, keys: &[&str]) -> Option<&Value> {
        let services = self.services()?;
        keys.iter().find_map(|k| services.get(k).filter(|v| !v.is_null()))
    }

    pub fn whois_status(&self) -> Option<&str> {
        self.service(&["whoisStatus", "whois_status"]).and_then(Value::as_str)
    }

    pub fn is_available(&self) -> bool {
        matches!(self.whois_status(), Some("FREE" | "AVAILABLE"))
    }

    pub fn is_portfolio(&self) -> bool {
        self.get("portfolio").and_then(Value::as_bool) == Some(true)
    }

    pub fn is_prereg(&self) -> bool {
        self.get("isPrereg").and_then(Value::as_bool) == Some(true)
    }

    pub fn price(&self) -> Option<&Value> {
        self.service(&["priceData", "price_data"])
    }

    pub fn estimated_price(&self) -> Option<&Value> {
        self.service(&["estimateData", "estimate_data"])
    }
}

impl Whois {
    /// Checks every name in `domains` with one `POST domainstudio`.
    pub fn lookup(client: &Client, domains: &[&str]) -> Result<Vec<Whois>, ApiError> {
        let body = json!({
            "sources": {
                "custom": {
                    "domains": domains,
                    "services": ["WHOIS"]
                }
            }
        });
        let envelope = client.post(Self::KIND.resource_path(), Some(&body))?;
        let handle = client.downgrade();
        Ok(envelope
            .data
            .iter()
            .filter_map(|item| {
                let raw = json!({
                    "domain": item.get("domain").cloned().unwrap_or_default(),
                    "status": item.pointer("/services/whois/data/status").cloned().unwrap_or_default(),
                    "services": item.get("services").cloned().unwrap_or_default(),
                });
                Entity::from_json(Self::KIND, &raw, &handle)
            })
            .map(Whois)
            .collect())
    }

    pub fn single(client: &Client, domain: &str) -> Result<Option<Whois>, ApiError> {
        Ok(Self::lookup(client, &[domain])?.into_iter().next())
    }

    pub fn domain(&self) -> Option<&str> {
        self.get_any(&["domain", "name"]).and_then(Value::as_str)
    }

    /// `free`, `registered`, `reserved`, ...
    pub fn status(&self) -> Option<&str> {
        self.get_any(&["status"])
            .or_else(|| self.whois_data()?.get("status"))
            .and_then(Value::as_str)
    }

    pub fn whois_data(&self) -> Option<&Value> {
        self.get("services")?.get("whois")?.get("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scripted_client;

    #[test]
    fn search_sends_token_and_only_set_options() {
        let (client, transport, _) = scripted_client();
        transport.push_data(vec![
            json!({"domain": "shop.io", "tld": "io", "services": {"whoisStatus": "FREE", "priceData": {"amount": 30}}}),
            json!({"domain": "shop.com", "tld": "com", "services": {"whoisStatus": "ASSIGNED"}}),
        ]);

        let options = SearchOptions {
            currency: Some("EUR".into()),
            only_available: Some(false),
            ..Default::default()
        };
        let results = DomainStudio::search(&client, "shop", &options).unwrap();

        let request = &transport.requests()[0];
        assert!(request.path.ends_with("/domainstudio"));
        assert_eq!(
            request.json_body().unwrap(),
            json!({"searchToken": "shop", "currency": "EUR", "onlyAvailable": false})
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_available());
        assert!(!results[1].is_available());
        assert_eq!(results[0].price().and_then(|p| p.get("amount")).and_then(Value::as_u64), Some(30));
    }

    #[test]
    fn whois_lookup_extracts_status() {
        let (client, transport, _) = scripted_client();
        transport.push_data(vec![json!({
            "domain": "taken.com",
            "services": {"whois": {"data": {"status": "registered"}}}
        })]);

        let result = Whois::single(&client, "taken.com").unwrap().unwrap();

        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["sources"]["custom"]["domains"], json!(["taken.com"]));
        assert_eq!(body["sources"]["custom"]["services"], json!(["WHOIS"]));
        assert_eq!(result.domain(), Some("taken.com"));
        assert_eq!(result.status(), Some("registered"));
        assert!(result.whois_data().is_some());
    }

    #[test]
    fn whois_lookup_with_no_results() {
        let (client, _transport, _) = scripted_client();
        assert!(Whois::single(&client, "nothing.example").unwrap().is_none());
    }
}
