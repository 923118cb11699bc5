use std::future::Future;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One entry of a zone listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DnsRecord {
    /// Key for updates and deletes, opaque to the handler
    pub id: String,
    /// `A`, `CNAME`, `TXT`, ...
    pub r#type: String,
    /// Owner name without the zone suffix; `_acme-challenge.www` in `example.com`
    pub name: String,
    pub value: String,
}

/// Body of a create or update request.
///
/// `priority`, `port` and `weight` only matter for MX/SRV records, but some
/// registrar schemas require them to be present, so they are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewRecord {
    pub r#type: String,
    pub name: String,
    pub value: String,
    pub priority: Option<u16>,
    pub port: Option<u16>,
    pub weight: Option<u16>,
}

impl NewRecord {
    pub fn txt(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            r#type: "TXT".into(),
            name: name.into(),
            value: value.into(),
            priority: None,
            port: None,
            weight: None,
        }
    }
}

/// Access to the DNS records of the zones managed at a registrar.
///
/// Implementations own transport, authentication and timeouts.
pub trait RegistrarClient {
    /// List all records of a zone.
    fn list_records(&self, zone: &str) -> impl Future<Output = Result<Vec<DnsRecord>>> + Send;

    /// Create a record in a zone, returning the stored record.
    fn create_record(
        &self,
        zone: &str,
        record: &NewRecord,
    ) -> impl Future<Output = Result<DnsRecord>> + Send;

    /// Replace the fields of an existing record.
    fn update_record(
        &self,
        zone: &str,
        id: &str,
        record: &NewRecord,
    ) -> impl Future<Output = Result<DnsRecord>> + Send;

    /// Delete a record by its identifier.
    fn delete_record(&self, zone: &str, id: &str) -> impl Future<Output = Result<()>> + Send;
}
