//! Chainable queries over one entity kind.
//!
//! # Design
//! A `Collection` pairs a [`Query`] with a weak client handle. `filter`,
//! `limit`, `offset` and `keys` return a fresh collection; the receiver is
//! never modified. [`Collection::all`] runs the query once and caches the
//! decoded entities on that instance only.
//!
//! Without an explicit limit, `all` walks the whole result set in pages of
//! `batch_size`, pausing `rate_limit_delay` between requests. A short or
//! empty page ends the walk.

use std::cell::OnceCell;
use std::fmt::Display;
use std::slice;

use serde_json::Value;
use tracing::debug;

use crate::client::{Client, ClientRef};
use crate::entity::Entity;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::query::Query;
use crate::registry::EntityKind;

/// Request body accepted by `create`/`update`: a JSON object or an entity.
pub trait IntoPayload {
    fn into_payload(self) -> Value;
}

impl IntoPayload for Value {
    fn into_payload(self) -> Value {
        self
    }
}

impl IntoPayload for serde_json::Map<String, Value> {
    fn into_payload(self) -> Value {
        Value::Object(self)
    }
}

impl IntoPayload for &Entity {
    fn into_payload(self) -> Value {
        self.to_json()
    }
}

impl IntoPayload for Entity {
    fn into_payload(self) -> Value {
        self.to_json()
    }
}

pub struct Collection {
    client: ClientRef,
    query: Query,
    results: OnceCell<Vec<Entity>>,
}

impl Collection {
    pub(crate) fn new(kind: EntityKind, client: ClientRef) -> Self {
        Self::from_query(Query::new(kind), client)
    }

    fn from_query(query: Query, client: ClientRef) -> Self {
        Self {
            client,
            query,
            results: OnceCell::new(),
        }
    }

    fn derive(&self, query: Query) -> Self {
        Self::from_query(query, self.client.clone())
    }

    pub fn kind(&self) -> EntityKind {
        self.query.kind
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    fn resource_path(&self) -> &'static str {
        self.query.kind.resource_path()
    }

    fn client(&self) -> Result<Client, ApiError> {
        self.client.upgrade().ok_or(ApiError::ClientReleased)
    }

    /// Adds equality/wildcard conditions, ANDed by the server.
    pub fn filter<K, V>(&self, conditions: impl IntoIterator<Item = (K, V)>) -> Collection
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.derive(self.query.with_conditions(conditions))
    }

    pub fn limit(&self, limit: u32) -> Collection {
        self.derive(self.query.with_limit(limit))
    }

    pub fn offset(&self, offset: u32) -> Collection {
        self.derive(self.query.with_offset(offset))
    }

    /// Restricts the fields the server returns.
    pub fn keys<S: Into<String>>(&self, keys: impl IntoIterator<Item = S>) -> Collection {
        self.derive(self.query.with_keys(keys))
    }

    /// Runs the query on first call; later calls return the cached result.
    pub fn all(&self) -> Result<&[Entity], ApiError> {
        if let Some(results) = self.results.get() {
            return Ok(results);
        }
        let client = self.client()?;
        let fetched = match self.query.limit {
            Some(limit) => {
                let envelope = self.search(&client, limit, self.query.offset)?;
                self.wrap(envelope.data)
            }
            None => self.fetch_paginated(&client)?,
        };
        Ok(self.results.get_or_init(|| fetched))
    }

    fn fetch_paginated(&self, client: &Client) -> Result<Vec<Entity>, ApiError> {
        let config = client.config();
        let batch_size = config.batch_size.max(1);
        let mut offset = self.query.offset;
        let mut raw = Vec::new();

        for page in 0usize.. {
            if page > 0 {
                client.pause(config.rate_limit_delay);
            }
            let envelope = self.search(client, batch_size, offset)?;
            let received = envelope.data.len();
            debug!(kind = %self.kind(), page, offset, received, "fetched search page");
            raw.extend(envelope.data);
            if received < batch_size as usize {
                break;
            }
            offset += batch_size;
        }

        Ok(self.wrap(raw))
    }

    /// Iterates the materialized results.
    pub fn iter(&self) -> Result<slice::Iter<'_, Entity>, ApiError> {
        Ok(self.all()?.iter())
    }

    pub fn first(&self) -> Result<Option<Entity>, ApiError> {
        Ok(self.limit(1).all()?.first().cloned())
    }

    /// `GET <resource>/<id>`; `None` when the response carries no data.
    pub fn find(&self, id: impl Display) -> Result<Option<Entity>, ApiError> {
        let client = self.client()?;
        let envelope = client
            .connection()
            .get(&format!("{}/{id}", self.resource_path()), &[])?;
        Ok(envelope
            .data
            .first()
            .and_then(|raw| Entity::from_json(self.kind(), raw, &self.client)))
    }

    pub fn find_by<K, V>(&self, conditions: impl IntoIterator<Item = (K, V)>) -> Result<Option<Entity>, ApiError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.filter(conditions).first()
    }

    /// `POST <resource>`.
    pub fn create(&self, payload: impl IntoPayload) -> Result<Option<Entity>, ApiError> {
        let client = self.client()?;
        let envelope = client
            .connection()
            .post(self.resource_path(), Some(&payload.into_payload()))?;
        Ok(self.single(&envelope))
    }

    /// `PUT <resource>/<id>`.
    pub fn update(&self, id: impl Display, payload: impl IntoPayload) -> Result<Option<Entity>, ApiError> {
        let client = self.client()?;
        let envelope = client
            .connection()
            .put(&format!("{}/{id}", self.resource_path()), Some(&payload.into_payload()))?;
        Ok(self.single(&envelope))
    }

    /// `DELETE <resource>/<id>`; any failure is reported as `false`.
    pub fn delete(&self, id: impl Display) -> bool {
        let path = format!("{}/{id}", self.resource_path());
        let result = self
            .client()
            .and_then(|client| client.connection().delete(&path));
        match result {
            Ok(_) => true,
            Err(err) => {
                debug!(kind = %self.kind(), %path, error = %err, "delete failed");
                false
            }
        }
    }

    /// Server-reported total (`object.summary`) of a one-item search, or the
    /// number of items returned when the server sends no summary.
    pub fn count(&self) -> Result<u64, ApiError> {
        let client = self.client()?;
        let envelope = self.search(&client, 1, 0)?;
        Ok(envelope
            .summary()
            .unwrap_or(envelope.data.len() as u64))
    }

    /// `POST <resource>/_search` for one page of this query.
    pub fn search_page(&self, limit: u32, offset: u32) -> Result<Envelope, ApiError> {
        let client = self.client()?;
        self.search(&client, limit, offset)
    }

    fn search(&self, client: &Client, limit: u32, offset: u32) -> Result<Envelope, ApiError> {
        let body = serde_json::to_value(self.query.search_request(limit, offset))?;
        client
            .connection()
            .post(&format!("{}/_search", self.resource_path()), Some(&body))
    }

    fn single(&self, envelope: &Envelope) -> Option<Entity> {
        envelope
            .first_payload()
            .and_then(|raw| Entity::from_json(self.kind(), raw, &self.client))
    }

    fn wrap(&self, raw: Vec<Value>) -> Vec<Entity> {
        raw.iter()
            .filter_map(|item| Entity::from_json(self.kind(), item, &self.client))
            .collect()
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("query", &self.query)
            .field("materialized", &self.results.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::{domains, scripted_client};

    #[test]
    fn limited_query_issues_one_search() {
        let (client, transport, throttle) = scripted_client();
        transport.push_data(domains(0, 10));

        let results = client
            .domains()
            .filter([("name", "example.*")])
            .limit(10)
            .all()
            .unwrap()
            .to_vec();

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|d| d.kind() == EntityKind::Domain));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert!(requests[0].path.ends_with("/domain/_search"));
        assert_eq!(
            requests[0].json_body().unwrap(),
            json!({
                "view": {"limit": 10, "offset": 0},
                "filters": [{"key": "name", "value": "example.*", "operator": "LIKE"}]
            })
        );
        assert!(throttle.pauses().is_empty());
    }

    #[test]
    fn exact_value_uses_equal() {
        let (client, transport, _) = scripted_client();
        client.domains().filter([("name", "x.com")]).limit(1).all().unwrap();
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["filters"][0]["operator"], "EQUAL");
    }

    #[test]
    fn pagination_stops_on_short_page() {
        let (client, transport, throttle) = scripted_client();
        transport.push_data(domains(0, 100));
        transport.push_data(domains(100, 100));
        transport.push_data(domains(200, 50));

        let all = client.domains().all().unwrap();

        assert_eq!(all.len(), 250);
        assert_eq!(all[249].str_field("name"), Some("domain-249.com"));
        let offsets: Vec<u64> = transport
            .requests()
            .iter()
            .map(|r| r.json_body().unwrap()["view"]["offset"].as_u64().unwrap())
            .collect();
        assert_eq!(offsets, vec![0, 100, 200]);
        assert_eq!(throttle.pauses(), vec![Duration::from_millis(350); 2]);
    }

    #[test]
    fn pagination_on_exact_multiple_ends_with_empty_page() {
        let (client, transport, throttle) = scripted_client();
        transport.push_data(domains(0, 100));
        transport.push_data(domains(100, 100));
        transport.push_data(Vec::new());

        let all = client.domains().all().unwrap();

        assert_eq!(all.len(), 200);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(throttle.pauses().len(), 2);
    }

    #[test]
    fn single_short_page_needs_no_pause() {
        let (client, transport, throttle) = scripted_client();
        transport.push_data(domains(0, 3));
        assert_eq!(client.domains().all().unwrap().len(), 3);
        assert_eq!(transport.request_count(), 1);
        assert!(throttle.pauses().is_empty());
    }

    #[test]
    fn pagination_starts_at_query_offset() {
        let (client, transport, _) = scripted_client();
        transport.push_data(domains(0, 2));
        client.domains().offset(40).all().unwrap();
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["view"], json!({"limit": 100, "offset": 40}));
    }

    #[test]
    fn results_are_cached_per_instance() {
        let (client, transport, _) = scripted_client();
        transport.push_data(domains(0, 2));
        transport.push_data(domains(0, 2));

        let query = client.domains().limit(2);
        query.all().unwrap();
        query.all().unwrap();
        assert_eq!(transport.request_count(), 1);

        query.limit(2).all().unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn client_collections_are_reused() {
        let (client, transport, _) = scripted_client();
        transport.push_data(domains(0, 1));
        client.domains().all().unwrap();
        client.domains().all().unwrap();
        assert_eq!(transport.request_count(), 1);
        assert!(std::ptr::eq(client.domains(), client.domains()));
    }

    #[test]
    fn chaining_never_mutates_the_receiver() {
        let (client, _, _) = scripted_client();
        let base = client.domains().filter([("tld", "com")]);
        let limited = base.limit(5);
        let _ = base.keys(["name"]);
        assert_eq!(base.query().limit, None);
        assert_eq!(base.query().keys, None);
        assert_eq!(limited.query().limit, Some(5));
    }

    #[test]
    fn keys_are_sent_with_search() {
        let (client, transport, _) = scripted_client();
        client.zones().keys(["origin", "created"]).limit(5).all().unwrap();
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["keys"], json!(["origin", "created"]));
        assert!(body.get("filters").is_none());
    }

    #[test]
    fn first_and_find_by_limit_to_one() {
        let (client, transport, _) = scripted_client();
        transport.push_data(domains(7, 1));
        let found = client.domains().find_by([("name", "domain-7.com")]).unwrap().unwrap();
        assert_eq!(found.str_field("name"), Some("domain-7.com"));
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["view"]["limit"], 1);
        assert!(client.domains().first().unwrap().is_none());
    }

    #[test]
    fn find_gets_by_id() {
        let (client, transport, _) = scripted_client();
        transport.push_data(vec![json!({"name": "example.com", "type": "NOT_A_KIND"})]);
        let domain = client.domains().find("example.com").unwrap().unwrap();
        assert_eq!(domain.kind(), EntityKind::Domain);
        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.path.ends_with("/domain/example.com"));

        assert!(client.domains().find("missing.com").unwrap().is_none());
    }

    #[test]
    fn find_propagates_not_found() {
        let (client, transport, _) = scripted_client();
        transport.push_response(404, "");
        assert!(matches!(client.contacts().find(1), Err(ApiError::NotFound)));
    }

    #[test]
    fn create_accepts_map_or_entity() {
        let (client, transport, _) = scripted_client();
        transport.push_data(vec![json!({"id": 11, "fname": "John"})]);
        transport.push_json(200, json!({"status": {"type": "success"}, "object": {"id": 12}}));
        transport.push_data(Vec::new());

        let created = client.contacts().create(json!({"fname": "John"})).unwrap().unwrap();
        assert_eq!(created.id(), Some(&crate::Value::from(11)));

        let from_object = client.contacts().create(&created).unwrap().unwrap();
        assert_eq!(from_object.id(), Some(&crate::Value::from(12)));

        assert!(client.contacts().create(json!({})).unwrap().is_none());

        let requests = transport.requests();
        assert!(requests[0].path.ends_with("/contact"));
        assert_eq!(requests[1].json_body().unwrap(), json!({"id": 11, "fname": "John"}));
    }

    #[test]
    fn update_puts_to_resource_id() {
        let (client, transport, _) = scripted_client();
        transport.push_data(vec![json!({"id": 3, "target": "https://b.example"})]);
        let updated = client
            .redirects()
            .update(3, json!({"target": "https://b.example"}))
            .unwrap()
            .unwrap();
        assert_eq!(updated.str_field("target"), Some("https://b.example"));
        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.path.ends_with("/redirect/3"));
    }

    #[test]
    fn delete_swallows_errors() {
        let (client, transport, _) = scripted_client();
        transport.push_data(Vec::new());
        transport.push_response(500, r#"{"status":{"text":"locked"}}"#);
        transport.push_error("connection reset");
        assert!(client.zones().delete("a.com/ns1.example.com"));
        assert!(!client.zones().delete("b.com/ns1.example.com"));
        assert!(!client.zones().delete("c.com/ns1.example.com"));
        assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
    }

    #[test]
    fn count_prefers_summary() {
        let (client, transport, _) = scripted_client();
        transport.push_json(
            200,
            json!({"status": {"type": "success"}, "data": [{"id": 1}], "object": {"summary": 1234}}),
        );
        transport.push_data(domains(0, 1));
        assert_eq!(client.domains().count().unwrap(), 1234);
        assert_eq!(client.domains().count().unwrap(), 1);
        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["view"], json!({"limit": 1, "offset": 0}));
    }

    #[test]
    fn iter_walks_materialized_results() {
        let (client, transport, _) = scripted_client();
        transport.push_data(domains(0, 3));
        let names: Vec<&str> = client
            .domains()
            .iter()
            .unwrap()
            .filter_map(|d| d.str_field("name"))
            .collect();
        assert_eq!(names, vec!["domain-0.com", "domain-1.com", "domain-2.com"]);
    }

    #[test]
    fn released_client_is_an_error() {
        let (client, _, _) = scripted_client();
        let query = client.domains().limit(1);
        drop(client);
        assert!(matches!(query.all(), Err(ApiError::ClientReleased)));
        assert!(!query.delete(1));
    }

    #[test]
    fn search_errors_propagate() {
        let (client, transport, _) = scripted_client();
        transport.push_response(429, "Too Many Requests");
        assert!(matches!(client.domains().all(), Err(ApiError::RateLimit)));
    }
}
