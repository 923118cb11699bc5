use std::{future::Future, time::Duration};

use anyhow::Context;
use hickory_resolver::{error::ResolveErrorKind, TokioAsyncResolver};
use tokio::time::sleep;
use tracing::debug;

use crate::{Error, HandlerConfig, Result};

/// TXT lookups against public DNS.
pub trait TxtResolver {
    /// Resolve all TXT values published at `fqdn`.
    fn resolve_txt(&self, fqdn: &str) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;
}

/// The name exists nowhere or has no TXT records.
///
/// Resolvers attach this as context on top of the resolver's own error, so
/// propagation checks can tell "not yet" apart from a broken lookup while
/// the original answer (NXDOMAIN or NODATA) stays in the chain.
#[derive(Debug, thiserror::Error)]
#[error("no TXT records found for {0}")]
pub struct NoRecords(pub String);

impl NoRecords {
    pub fn wrap(
        fqdn: &str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> anyhow::Error {
        anyhow::Error::new(err).context(Self(fqdn.to_string()))
    }
}

/// [`TxtResolver`] backed by the system's resolver configuration.
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryResolver {
    pub fn from_system_conf() -> anyhow::Result<Self> {
        let resolver =
            TokioAsyncResolver::tokio_from_system_conf().context("failed to create dns resolver")?;
        Ok(Self { resolver })
    }
}

impl From<TokioAsyncResolver> for HickoryResolver {
    fn from(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }
}

impl TxtResolver for HickoryResolver {
    async fn resolve_txt(&self, fqdn: &str) -> anyhow::Result<Vec<String>> {
        match self.resolver.txt_lookup(fqdn).await {
            Ok(lookup) => Ok(lookup.iter().map(|txt| txt.to_string()).collect()),
            Err(err) => {
                if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
                    return Err(NoRecords::wrap(fqdn, err));
                }
                Err(anyhow::Error::new(err).context(format!("failed to lookup {fqdn}")))
            }
        }
    }
}

/// Backoff for [`Loopback::wait_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationPolicy {
    /// Delay before the first lookup, doubled after every miss.
    pub initial_delay: Duration,
    /// Total number of lookups before giving up.
    pub max_tries: u32,
}

impl Default for PropagationPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_tries: 10,
        }
    }
}

/// Read-only view of published challenge records.
pub struct Loopback<S> {
    resolver: S,
    acme_dns_prefix: String,
    default_prefix: String,
    debug: bool,
}

impl<S: TxtResolver> Loopback<S> {
    pub fn new(config: &HandlerConfig, resolver: S) -> Self {
        Self {
            resolver,
            acme_dns_prefix: config.acme_dns_prefix.clone(),
            default_prefix: config.loopback_prefix.clone(),
            debug: config.debug,
        }
    }

    /// The name queried for `host`: `test_prefix + acme_dns_prefix + host`.
    pub fn challenge_fqdn(&self, host: &str, test_prefix: Option<&str>) -> String {
        let test_prefix = test_prefix.unwrap_or(&self.default_prefix);
        format!("{test_prefix}{}{host}", self.acme_dns_prefix)
    }

    /// Resolve the challenge TXT values currently visible for `host`.
    pub async fn lookup(&self, host: &str, test_prefix: Option<&str>) -> Result<Vec<String>> {
        let fqdn = self.challenge_fqdn(host, test_prefix);
        if self.debug {
            debug!(fqdn = %fqdn, "resolving challenge TXT records");
        }
        match self.resolver.resolve_txt(&fqdn).await {
            Ok(values) => Ok(values),
            Err(source) => Err(Error::ResolutionFailed { fqdn, source }),
        }
    }

    /// Poll until `expected` is among the TXT values published for `host`.
    pub async fn wait_for(
        &self,
        host: &str,
        expected: &str,
        policy: &PropagationPolicy,
    ) -> Result<()> {
        let mut delay = policy.initial_delay;
        for tries in 1..=policy.max_tries {
            sleep(delay).await;
            let settled = match self.lookup(host, None).await {
                Ok(values) => values.iter().any(|value| value == expected),
                Err(Error::ResolutionFailed { source, .. })
                    if source.downcast_ref::<NoRecords>().is_some() =>
                {
                    false
                }
                Err(err) => return Err(err),
            };
            if settled {
                return Ok(());
            }
            delay *= 2;
            if self.debug {
                debug!(tries, host, "challenge not found, waiting {delay:?}");
            }
        }
        Err(Error::NotPropagated {
            fqdn: self.challenge_fqdn(host, None),
            tries: policy.max_tries,
        })
    }
}
