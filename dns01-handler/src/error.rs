use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid host {0:?}: expected at least two non-empty labels")]
    InvalidHost(String),

    #[error("failed to list dns records of zone {zone}")]
    LookupFailed {
        zone: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to create TXT record {name} in zone {zone}")]
    CreateFailed {
        zone: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to update TXT record {name} ({id}) in zone {zone}")]
    UpdateFailed {
        zone: String,
        name: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to delete TXT record {name} ({id}) in zone {zone}")]
    DeleteFailed {
        zone: String,
        name: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no challenge record {name} found in zone {zone}")]
    RecordNotFound { zone: String, name: String },

    #[error("failed to resolve TXT records of {fqdn}")]
    ResolutionFailed {
        fqdn: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("TXT record {fqdn} did not show the expected value after {tries} tries")]
    NotPropagated { fqdn: String, tries: u32 },

    #[error("operation not supported for dns-01 challenges")]
    Unsupported,
}
