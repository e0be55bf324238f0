//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::throttle::Throttle;
use crate::transport::Transport;

/// Replays queued responses in order and records every request it sees.
/// Once the queue is empty it answers with an empty success envelope.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(status, &body.to_string());
    }

    /// Queues a success envelope whose `data` is `items`.
    pub fn push_data(&self, items: Vec<Value>) {
        self.push_json(200, json!({"status": {"type": "success"}, "data": items}));
    }

    pub fn push_error(&self, message: &str) {
        self.responses.borrow_mut().push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ApiError::Transport(message)),
            None => Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: json!({"status": {"type": "success"}, "data": []}).to_string(),
            }),
        }
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingThrottle {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingThrottle {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Throttle for RecordingThrottle {
    fn pause(&self, delay: Duration) {
        self.pauses.borrow_mut().push(delay);
    }
}

/// A client wired to fresh doubles.
pub fn scripted_client() -> (Client, Rc<ScriptedTransport>, Rc<RecordingThrottle>) {
    let transport = Rc::new(ScriptedTransport::new());
    let throttle = Rc::new(RecordingThrottle::default());
    let client = Client::builder(ClientConfig::new("testuser", "testpass"))
        .transport(transport.clone())
        .throttle(throttle.clone())
        .build();
    (client, transport, throttle)
}

/// `count` domain payloads named `domain-<start+i>.com` with numeric ids.
pub fn domains(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|i| json!({"id": i, "name": format!("domain-{i}.com")}))
        .collect()
}
