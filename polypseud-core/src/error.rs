use thiserror::Error;

use crate::store::StoreError;

/// Error outputs from `polypseud-core`.
#[derive(Debug, Error)]
pub enum PolyPseudError {
    /// The dispatcher received a query name outside the supported set.
    #[error("unknown_query: '{0}' is not recognized")]
    UnknownQuery(String),
    /// A query was submitted with the wrong number of positional parameters.
    #[error("invalid_parameters: {query} requires {expected} parameter(s), got {got}")]
    InvalidParameters {
        /// Name of the query as submitted.
        query: &'static str,
        /// Number of parameters the query requires.
        expected: usize,
        /// Number of parameters actually supplied.
        got: usize,
    },
    /// A string presented by the caller is not a valid encoded pseudonym.
    #[error("decode_error: {0}")]
    Decode(String),
    /// The initialization configuration is missing an entry or holds a
    /// malformed value.
    #[error("invalid_config: {0}")]
    InvalidConfig(String),
    /// The crypto capability failed to generate or randomize a pseudonym.
    #[error("crypto_error: {0}")]
    Crypto(String),
    /// A pseudonym store read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The remote pseudonym provider could not be reached or answered with a
    /// failure status.
    #[error("provider_unavailable: request to {url} failed: {error}")]
    ProviderUnavailable {
        /// The URL the exchange request was sent to.
        url: String,
        /// HTTP status code, when a response was received at all.
        status: Option<u16>,
        /// Transport-level or HTTP-level failure detail.
        error: String,
    },
    /// The remote pseudonym provider answered, but the body is not a valid
    /// encoded pseudonym.
    #[error("provider_response: {0}")]
    ProviderResponse(String),
    /// A dispatched query task panicked or was cancelled before completing.
    #[error("task_failed: {0}")]
    Task(String),
}
