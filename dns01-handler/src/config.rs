use std::fmt;

use serde::{Deserialize, Serialize};

/// Default prefix prepended to a host for propagation lookups.
pub const DEFAULT_ACME_DNS_PREFIX: &str = "_acme-challenge.";

/// Per-handler configuration, fixed at construction.
#[derive(Clone, Deserialize, Serialize, bon::Builder)]
#[builder(on(String, into))]
#[serde(default)]
pub struct HandlerConfig {
    /// Emit diagnostic log events for every registrar round trip.
    #[builder(default)]
    pub debug: bool,
    /// Prefix of the challenge record used by loopback lookups.
    #[builder(default = DEFAULT_ACME_DNS_PREFIX.to_string())]
    pub acme_dns_prefix: String,
    /// Credential for the registrar API.
    pub api_key: Option<String>,
    /// Extra prefix for loopback lookups in test DNS setups.
    #[builder(default)]
    pub loopback_prefix: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("debug", &self.debug)
            .field("acme_dns_prefix", &self.acme_dns_prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("loopback_prefix", &self.loopback_prefix)
            .finish()
    }
}
