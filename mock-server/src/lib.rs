//! In-memory stand-in for the AutoDNS JSON API.
//!
//! Every resource is a flat list of JSON objects keyed by `id` (or `name`
//! when an object has no id). Requests must carry HTTP basic credentials
//! matching the store's; responses use the AutoDNS envelope
//! (`stid`, `status`, `data`, `object`).

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const USERNAME: &str = "demo-user";
pub const PASSWORD: &str = "demo-pass";

/// Items per resource, in insertion order.
#[derive(Debug, Clone)]
pub struct Store {
    username: String,
    password: String,
    resources: HashMap<String, Vec<Value>>,
    next_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(USERNAME, PASSWORD)
    }
}

impl Store {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            resources: HashMap::new(),
            next_id: 1,
        }
    }

    /// Adds `items` to `resource`, assigning ids to objects without one.
    pub fn with_items(mut self, resource: &str, items: impl IntoIterator<Item = Value>) -> Self {
        for item in items {
            self.insert(resource, item);
        }
        self
    }

    fn insert(&mut self, resource: &str, mut item: Value) -> Value {
        if let Some(map) = item.as_object_mut() {
            if map.get("id").map_or(true, Value::is_null) {
                map.insert("id".to_string(), json!(self.next_id));
                self.next_id += 1;
            }
        }
        self.resources
            .entry(resource.to_string())
            .or_default()
            .push(item.clone());
        item
    }

    fn position(&self, resource: &str, key: &str) -> Option<usize> {
        self.resources
            .get(resource)?
            .iter()
            .position(|item| matches_key(item, key))
    }

    fn authorized(&self, header: Option<&str>) -> bool {
        let expected = STANDARD.encode(format!("{}:{}", self.username, self.password));
        header
            .and_then(|value| value.strip_prefix("Basic "))
            .is_some_and(|token| token == expected)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    view: SearchView,
    #[serde(default)]
    filters: Vec<SearchFilter>,
}

#[derive(Debug, Deserialize)]
struct SearchView {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
}

impl Default for SearchView {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
struct SearchFilter {
    key: String,
    value: Value,
    #[serde(default = "default_operator")]
    operator: String,
}

fn default_operator() -> String {
    "EQUAL".to_string()
}

pub fn app() -> Router {
    app_with(Store::default())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/hello", get(hello))
        .route("/{resource}", post(create_item))
        .route("/{resource}/_search", post(search_items))
        .route(
            "/{resource}/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(middleware::from_fn_with_state(db.clone(), require_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock AutoDNS listening");
    }
    axum::serve(listener, router).await
}

fn envelope(data: Vec<Value>, object: Option<Value>) -> Value {
    let mut body = json!({
        "stid": Uuid::new_v4().to_string(),
        "status": {"code": "S0000", "text": "OK", "type": "SUCCESS"},
        "data": data,
    });
    if let Some(object) = object {
        body["object"] = object;
    }
    body
}

fn error_response(status: StatusCode, text: &str) -> Response {
    let body = json!({
        "stid": Uuid::new_v4().to_string(),
        "status": {"code": format!("E{}", status.as_u16()), "text": text, "type": "ERROR"},
    });
    (status, Json(body)).into_response()
}

fn matches_key(item: &Value, key: &str) -> bool {
    ["id", "name"]
        .iter()
        .filter_map(|field| item.get(field))
        .any(|value| text(value).as_deref() == Some(key))
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `*` matches any run of characters; everything else literally.
fn wildcard_match(pattern: &str, candidate: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return candidate.is_empty(),
    };
    let Some(mut remaining) = candidate.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for part in middle {
        match remaining.find(part) {
            Some(at) => remaining = &remaining[at + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}

fn filter_matches(item: &Value, filter: &SearchFilter) -> bool {
    let Some(actual) = item.get(&filter.key).and_then(text) else {
        return false;
    };
    let Some(expected) = text(&filter.value) else {
        return false;
    };
    match filter.operator.as_str() {
        "LIKE" => wildcard_match(&expected, &actual),
        _ => actual == expected,
    }
}

async fn require_auth(State(db): State<Db>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !db.read().await.authorized(authorization) {
        debug!(path = %request.uri().path(), "rejected credentials");
        return error_response(StatusCode::UNAUTHORIZED, "Authentication failed");
    }
    next.run(request).await
}

async fn hello() -> Json<Value> {
    Json(envelope(Vec::new(), None))
}

async fn search_items(
    State(db): State<Db>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Json<Value> {
    let search: SearchBody = serde_json::from_slice(&body).unwrap_or_default();
    let store = db.read().await;
    let matching: Vec<&Value> = store
        .resources
        .get(&resource)
        .map(|items| {
            items
                .iter()
                .filter(|item| search.filters.iter().all(|f| filter_matches(item, f)))
                .collect()
        })
        .unwrap_or_default();
    let summary = matching.len();
    let page = matching
        .into_iter()
        .skip(search.view.offset)
        .take(search.view.limit)
        .cloned()
        .collect();
    debug!(%resource, summary, "search");
    Json(envelope(page, Some(json!({"type": resource, "summary": summary}))))
}

async fn create_item(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(input): Json<Map<String, Value>>,
) -> Json<Value> {
    let created = db.write().await.insert(&resource, Value::Object(input));
    Json(envelope(vec![created], None))
}

async fn get_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let store = db.read().await;
    match store.position(&resource, &id) {
        Some(at) => Json(envelope(vec![store.resources[&resource][at].clone()], None)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Object not found"),
    }
}

async fn update_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(input): Json<Map<String, Value>>,
) -> Response {
    let mut store = db.write().await;
    let Some(at) = store.position(&resource, &id) else {
        return error_response(StatusCode::NOT_FOUND, "Object not found");
    };
    let Some(items) = store.resources.get_mut(&resource) else {
        return error_response(StatusCode::NOT_FOUND, "Object not found");
    };
    if let Some(existing) = items[at].as_object_mut() {
        for (key, value) in input {
            if key != "id" {
                existing.insert(key, value);
            }
        }
    }
    Json(envelope(vec![items[at].clone()], None)).into_response()
}

async fn delete_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let mut store = db.write().await;
    let Some(at) = store.position(&resource, &id) else {
        return error_response(StatusCode::NOT_FOUND, "Object not found");
    };
    if let Some(items) = store.resources.get_mut(&resource) {
        items.remove(at);
    }
    Json(envelope(Vec::new(), None)).into_response()
}
