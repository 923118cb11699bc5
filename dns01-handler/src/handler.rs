use tracing::{info, warn};

use crate::{
    names::{digest_of, ChallengeName},
    registrar::{DnsRecord, NewRecord, RegistrarClient},
    resolver::{Loopback, PropagationPolicy, TxtResolver},
    Error, HandlerConfig, Result,
};

/// Logs only when the handler was configured with `debug`.
macro_rules! diag {
    ($handler:expr, $($arg:tt)+) => {
        if $handler.config.debug {
            info!($($arg)+);
        }
    };
}

/// The record `set` would publish for a host, without touching the registrar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRecord {
    pub zone: String,
    pub record: NewRecord,
}

/// Publishes and removes DNS-01 challenge records through a registrar.
///
/// Every call re-reads the zone from the registrar. Calls for the same host
/// must be serialized by the caller: two concurrent `set`s can both miss the
/// existing record and create duplicates.
pub struct Dns01Handler<R, S> {
    config: HandlerConfig,
    registrar: R,
    loopback: Loopback<S>,
}

impl<R: RegistrarClient, S: TxtResolver> Dns01Handler<R, S> {
    pub fn new(config: HandlerConfig, registrar: R, resolver: S) -> Self {
        let loopback = Loopback::new(&config, resolver);
        Self {
            config,
            registrar,
            loopback,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn registrar(&self) -> &R {
        &self.registrar
    }

    /// Compute the zone and TXT record for `host` and `key_authorization`.
    pub fn challenge_record(
        &self,
        host: &str,
        key_authorization: Option<&str>,
    ) -> Result<ChallengeRecord> {
        let name = ChallengeName::parse(host)?;
        let value = digest_of(key_authorization.unwrap_or_default());
        Ok(ChallengeRecord {
            zone: name.zone,
            record: NewRecord::txt(name.record_name, value),
        })
    }

    /// Create or update the challenge TXT record for `host`.
    pub async fn set(&self, host: &str, key_authorization: Option<&str>) -> Result<()> {
        let ChallengeRecord { zone, record } = self.challenge_record(host, key_authorization)?;
        let existing = self.find_record(&zone, &record.name).await?;
        match existing {
            Some(existing) => {
                diag!(
                    self,
                    zone = %zone,
                    id = %existing.id,
                    name = %record.name,
                    "updating acme record"
                );
                self.registrar
                    .update_record(&zone, &existing.id, &record)
                    .await
                    .map_err(|source| Error::UpdateFailed {
                        zone: zone.clone(),
                        name: record.name.clone(),
                        id: existing.id.clone(),
                        source,
                    })?;
                diag!(self, zone = %zone, name = %record.name, "updated acme record");
            }
            None => {
                diag!(self, zone = %zone, name = %record.name, "creating acme record");
                let created = self
                    .registrar
                    .create_record(&zone, &record)
                    .await
                    .map_err(|source| Error::CreateFailed {
                        zone: zone.clone(),
                        name: record.name.clone(),
                        source,
                    })?;
                diag!(
                    self,
                    zone = %zone,
                    id = %created.id,
                    name = %record.name,
                    "created acme record"
                );
            }
        }
        Ok(())
    }

    /// Delete the challenge TXT record for `host`.
    ///
    /// A missing record is an error: it usually means `set` never completed.
    pub async fn remove(&self, host: &str) -> Result<()> {
        let name = ChallengeName::parse(host)?;
        let Some(existing) = self.find_record(&name.zone, &name.record_name).await? else {
            diag!(
                self,
                zone = %name.zone,
                name = %name.record_name,
                "could not find acme record"
            );
            return Err(Error::RecordNotFound {
                zone: name.zone,
                name: name.record_name,
            });
        };
        self.registrar
            .delete_record(&name.zone, &existing.id)
            .await
            .map_err(|source| Error::DeleteFailed {
                zone: name.zone.clone(),
                name: name.record_name.clone(),
                id: existing.id.clone(),
                source,
            })?;
        diag!(self, zone = %name.zone, id = %existing.id, "deleted acme record");
        Ok(())
    }

    /// Not supported: the ACME server validates against DNS directly.
    pub async fn get(&self, host: &str) -> Result<()> {
        warn!(host, "get is not supported for dns-01 challenges");
        Err(Error::Unsupported)
    }

    /// Resolve the published challenge TXT values for `host` from public DNS.
    pub async fn loopback(&self, host: &str, test_prefix: Option<&str>) -> Result<Vec<String>> {
        self.loopback.lookup(host, test_prefix).await
    }

    /// Wait until public DNS serves the value `set` publishes for `host`.
    pub async fn wait_for_propagation(
        &self,
        host: &str,
        key_authorization: Option<&str>,
        policy: &PropagationPolicy,
    ) -> Result<()> {
        let expected = digest_of(key_authorization.unwrap_or_default());
        self.loopback.wait_for(host, &expected, policy).await
    }

    async fn find_record(&self, zone: &str, name: &str) -> Result<Option<DnsRecord>> {
        let records = self
            .registrar
            .list_records(zone)
            .await
            .map_err(|source| Error::LookupFailed {
                zone: zone.to_string(),
                source,
            })?;
        Ok(records.into_iter().find(|record| record.name == name))
    }
}
