//! Authenticated request building and response interpretation.
//!
//! # Design
//! `Connection` mirrors the build/parse split: [`Connection::build_request`]
//! turns a verb, a resource path and an optional JSON body into an
//! `HttpRequest` carrying credentials, and [`Connection::parse_response`]
//! maps the status code to an `ApiError` or decodes the envelope. The
//! [`Transport`] sits in between and is the only part that touches a socket.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

pub const CONTEXT_HEADER: &str = "X-Domainrobot-Context";

pub struct Connection {
    base_url: String,
    authorization: String,
    context: String,
    user_agent: String,
    transport: Box<dyn Transport>,
}

impl Connection {
    pub fn new(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        let credentials = format!("{}:{}", config.username, config.password);
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            context: config.context.clone(),
            user_agent: config.user_agent.clone(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![
            ("authorization".to_string(), self.authorization.clone()),
            (CONTEXT_HEADER.to_string(), self.context.clone()),
            ("user-agent".to_string(), self.user_agent.clone()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        let body = match body {
            Some(value) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(value)?)
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            path: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            query: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers,
            body,
        })
    }

    pub fn parse_response(&self, response: &HttpResponse) -> Result<Envelope, ApiError> {
        if response.is_success() {
            return Ok(Envelope::from_body(&response.body));
        }
        let err = match response.status {
            401 => ApiError::Authentication,
            404 => ApiError::NotFound,
            429 => ApiError::RateLimit,
            status => ApiError::Api {
                status,
                message: extract_error_message(&response.body),
            },
        };
        warn!(status = response.status, error = %err, "AutoDNS request rejected");
        Err(err)
    }

    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
    ) -> Result<Envelope, ApiError> {
        let request = self.build_request(method, path, body, params)?;
        debug!(%method, url = %request.path, "sending AutoDNS request");
        let response = self.transport.execute(&request)?;
        debug!(%method, url = %request.path, status = response.status, "received AutoDNS response");
        self.parse_response(&response)
    }

    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Envelope, ApiError> {
        self.request(HttpMethod::Get, path, None, params)
    }

    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.request(HttpMethod::Post, path, body, &[])
    }

    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.request(HttpMethod::Put, path, body, &[])
    }

    pub fn patch(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.request(HttpMethod::Patch, path, body, &[])
    }

    pub fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        self.request(HttpMethod::Delete, path, None, &[])
    }

    /// `GET hello`; true when the server answers with a success status.
    pub fn test_connection(&self) -> bool {
        match self.get("hello", &[]) {
            Ok(envelope) => envelope.is_success(),
            Err(err) => {
                debug!(error = %err, "connection test failed");
                false
            }
        }
    }
}

/// Prefers `status.text`, then the first `messages[].text`, then the raw body.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    if !value.is_object() {
        return body.to_string();
    }
    value
        .pointer("/status/text")
        .and_then(Value::as_str)
        .or_else(|| value.pointer("/messages/0/text").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}
