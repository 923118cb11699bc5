//! An ACME DNS-01 challenge handler backed by a registrar's DNS record API.
//!
//! The handler publishes the `_acme-challenge` TXT record an ACME server
//! checks during DNS-01 validation, and removes it afterwards.
//!
//! # Features
//!
//! - Record name and value derivation from the host and key authorization
//! - Idempotent create-or-update of the challenge record
//! - Teardown that reports a missing record instead of ignoring it
//! - Loopback lookups to confirm propagation before telling the ACME server
//!
//! # Usage
//!
//! The registrar is injected through [`RegistrarClient`], DNS lookups through
//! [`TxtResolver`]. [`HickoryResolver`] resolves against the system's
//! resolver configuration.
//!
//! ```rust,ignore
//! use dns01_handler::{Dns01Handler, HandlerConfig, HickoryResolver, PropagationPolicy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HandlerConfig::builder().debug(true).build();
//!     let handler = Dns01Handler::new(config, my_registrar(), HickoryResolver::from_system_conf()?);
//!
//!     handler.set("www.example.com", Some(&key_authorization)).await?;
//!     handler
//!         .wait_for_propagation("www.example.com", Some(&key_authorization), &PropagationPolicy::default())
//!         .await?;
//!     // ... tell the ACME server the challenge is ready ...
//!     handler.remove("www.example.com").await?;
//!     Ok(())
//! }
//! ```
//!
//! Operations are single attempts; retry policy belongs to the caller.

pub use config::{HandlerConfig, DEFAULT_ACME_DNS_PREFIX};
pub use error::{Error, Result};
pub use handler::{ChallengeRecord, Dns01Handler};
pub use names::{
    challenge_record_name_of, digest_of, subdomain_of, zone_of, ChallengeName,
    ACME_RECORD_PREFIX,
};
pub use registrar::{DnsRecord, NewRecord, RegistrarClient};
pub use resolver::{HickoryResolver, Loopback, NoRecords, PropagationPolicy, TxtResolver};

mod config;
mod error;
mod handler;
mod names;
mod registrar;
mod resolver;
