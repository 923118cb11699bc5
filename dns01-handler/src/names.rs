//! Record name and value derivation for DNS-01 challenges.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Label of the TXT record an ACME server queries for DNS-01.
pub const ACME_RECORD_PREFIX: &str = "_acme-challenge";

/// The names derived from a host under validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeName {
    /// Registrable domain, the last two labels of the host.
    pub zone: String,
    /// Labels preceding the zone, empty for a bare two-label host.
    pub subdomain: String,
    /// Record name relative to the zone, e.g. `_acme-challenge.www`.
    pub record_name: String,
}

impl ChallengeName {
    pub fn parse(host: &str) -> Result<Self> {
        let labels = split_labels(host)?;
        let (sub, zone) = labels.split_at(labels.len() - 2);
        let subdomain = sub.join(".");
        let record_name = if subdomain.is_empty() {
            ACME_RECORD_PREFIX.to_string()
        } else {
            format!("{ACME_RECORD_PREFIX}.{subdomain}")
        };
        Ok(Self {
            zone: zone.join("."),
            subdomain,
            record_name,
        })
    }
}

/// Splits a host into labels, requiring at least two non-empty ones.
///
/// A single trailing root dot is tolerated.
fn split_labels(host: &str) -> Result<Vec<&str>> {
    let trimmed = host.strip_suffix('.').unwrap_or(host);
    let labels: Vec<&str> = trimmed.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(Error::InvalidHost(host.to_string()));
    }
    Ok(labels)
}

pub fn zone_of(host: &str) -> Result<String> {
    Ok(ChallengeName::parse(host)?.zone)
}

pub fn subdomain_of(host: &str) -> Result<String> {
    Ok(ChallengeName::parse(host)?.subdomain)
}

pub fn challenge_record_name_of(host: &str) -> Result<String> {
    Ok(ChallengeName::parse(host)?.record_name)
}

/// TXT value for a key authorization: unpadded base64url of its SHA-256.
pub fn digest_of(key_authorization: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(key_authorization.as_bytes()))
}
