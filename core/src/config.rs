//! Client configuration.

use std::env;
use std::time::Duration;

use crate::error::ApiError;

/// Production API endpoint.
pub const BASE_URL: &str = "https://api.autodns.com/v1";

/// Demo system endpoint.
pub const DEMO_URL: &str = "https://api.demo.autodns.com/v1";

/// Items requested per page when a query has no explicit limit.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// Pause between pages. AutoDNS allows 3 requests per second.
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_millis(350);

const DEFAULT_CONTEXT: &str = "4";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub context: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub batch_size: u32,
    pub rate_limit_delay: Duration,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
            context: DEFAULT_CONTEXT.to_string(),
            user_agent: concat!("domainrobot-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
        }
    }

    /// Loads credentials from `AUTODNS_USERNAME` / `AUTODNS_PASSWORD`, plus the
    /// optional `AUTODNS_URL` and `AUTODNS_CONTEXT`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let username = lookup("AUTODNS_USERNAME")
            .ok_or_else(|| ApiError::Config("AUTODNS_USERNAME is not set".into()))?;
        let password = lookup("AUTODNS_PASSWORD")
            .ok_or_else(|| ApiError::Config("AUTODNS_PASSWORD is not set".into()))?;
        let mut config = Self::new(username, password);
        if let Some(url) = lookup("AUTODNS_URL") {
            config = config.with_url(&url);
        }
        if let Some(context) = lookup("AUTODNS_CONTEXT") {
            config = config.with_context(context);
        }
        Ok(config)
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Page size for auto-pagination. Zero is clamped to one.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }
}
