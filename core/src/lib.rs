//! Synchronous client for the AutoDNS (Domainrobot) JSON API.
//!
//! # Overview
//! Exposes typed entities (domains, contacts, zones, jobs, ...), chainable
//! collections over the `_search` endpoints, and an authenticated
//! connection that maps HTTP statuses to [`ApiError`] variants.
//!
//! # Design
//! - Requests and responses are plain values ([`HttpRequest`],
//!   [`HttpResponse`]); only the [`Transport`] performs I/O, so tests script
//!   responses without a socket.
//! - [`Client`] owns one [`Collection`] per [`EntityKind`]. Collections and
//!   entities hold a weak [`ClientRef`] back to it.
//! - Payloads decode into [`Value`] trees: objects whose `type` or field name
//!   names a registered kind become [`Entity`] values, the rest stay records.
//! - Full listings are fetched page by page with a pause between requests
//!   to stay under the server's rate limit.

pub mod client;
pub mod collection;
pub mod config;
pub mod connection;
pub mod entities;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod http;
pub mod inflect;
pub mod mapper;
pub mod query;
pub mod registry;
pub mod throttle;
pub mod transport;
pub mod value;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientBuilder, ClientRef};
pub use collection::{Collection, IntoPayload};
pub use config::{ClientConfig, BASE_URL, DEMO_URL};
pub use connection::Connection;
pub use entity::Entity;
pub use envelope::Envelope;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{Filter, Operator, Query, SearchRequest};
pub use registry::EntityKind;
pub use throttle::{ThreadSleep, Throttle};
pub use transport::{Transport, UreqTransport};
pub use value::{Record, Value};
