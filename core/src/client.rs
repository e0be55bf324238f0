//! Top-level entry point owning the connection and the per-kind collections.
//!
//! # Design
//! `Client` is a cheap `Rc` handle. Collections and entities hold a
//! [`ClientRef`] (a weak handle) back to it so that cached results do not
//! keep the client alive through a reference cycle. One root [`Collection`]
//! per [`EntityKind`] is created on first access and reused afterwards; its
//! slot is addressed by the kind's registry index.
//!
//! ```rust,ignore
//! let client = Client::new(ClientConfig::new("user", "pass"));
//! for domain in client.domains().filter([("name", "*.com")]).iter()? {
//!     println!("{domain}");
//! }
//! ```

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde_json::Value;

use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::registry::{EntityKind, REGISTRY};
use crate::throttle::{ThreadSleep, Throttle};
use crate::transport::{Transport, UreqTransport};

struct ClientInner {
    config: ClientConfig,
    connection: Connection,
    throttle: Box<dyn Throttle>,
    collections: [OnceCell<Collection>; REGISTRY.len()],
}

#[derive(Clone)]
pub struct Client {
    inner: Rc<ClientInner>,
}

/// Weak handle to a [`Client`]; the default handle is detached.
#[derive(Clone, Default)]
pub struct ClientRef(Weak<ClientInner>);

impl ClientRef {
    pub fn upgrade(&self) -> Option<Client> {
        self.0.upgrade().map(|inner| Client { inner })
    }
}

pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Box<dyn Transport>>,
    throttle: Option<Box<dyn Throttle>>,
}

impl ClientBuilder {
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn throttle(mut self, throttle: impl Throttle + 'static) -> Self {
        self.throttle = Some(Box::new(throttle));
        self
    }

    pub fn build(self) -> Client {
        let transport = self
            .transport
            .unwrap_or_else(|| Box::new(UreqTransport::new(self.config.timeout)) as Box<dyn Transport>);
        let throttle = self
            .throttle
            .unwrap_or_else(|| Box::new(ThreadSleep) as Box<dyn Throttle>);
        Client {
            inner: Rc::new(ClientInner {
                connection: Connection::new(&self.config, transport),
                config: self.config,
                throttle,
                collections: std::array::from_fn(|_| OnceCell::new()),
            }),
        }
    }
}

macro_rules! collection_accessors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name(&self) -> &Collection {
                self.collection(EntityKind::$kind)
            }
        )*
    };
}

impl Client {
    /// Client using the blocking ureq transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            throttle: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    pub fn downgrade(&self) -> ClientRef {
        ClientRef(Rc::downgrade(&self.inner))
    }

    pub(crate) fn pause(&self, delay: Duration) {
        self.inner.throttle.pause(delay);
    }

    /// The root collection for `kind`, created on first use.
    pub fn collection(&self, kind: EntityKind) -> &Collection {
        self.inner.collections[kind.index()].get_or_init(|| Collection::new(kind, self.downgrade()))
    }

    /// Looks a collection up by name (`"domains"`, `"zone_records"`) or type
    /// name (`"Domain"`).
    pub fn collection_named(&self, name: &str) -> Option<&Collection> {
        EntityKind::from_collection_name(name).map(|kind| self.collection(kind))
    }

    collection_accessors! {
        domains => Domain,
        contacts => Contact,
        zones => Zone,
        zone_records => ZoneRecord,
        certificates => Certificate,
        name_servers => NameServer,
        jobs => Job,
        poll_messages => PollMessage,
        whois => Whois,
        redirects => Redirect,
        ssl_contacts => SslContact,
        transfer_outs => TransferOut,
        domain_studios => DomainStudio,
        domain_cancelations => DomainCancelation,
    }

    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Envelope, ApiError> {
        self.connection().get(path, params)
    }

    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.connection().post(path, body)
    }

    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.connection().put(path, body)
    }

    pub fn patch(&self, path: &str, body: Option<&Value>) -> Result<Envelope, ApiError> {
        self.connection().patch(path, body)
    }

    pub fn delete(&self, path: &str) -> Result<Envelope, ApiError> {
        self.connection().delete(path)
    }

    pub fn test_connection(&self) -> bool {
        self.connection().test_connection()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.config.url)
            .field("context", &self.inner.config.context)
            .finish()
    }
}
