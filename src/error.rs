use thiserror::Error;

/// Request-level failures. The whole batch is rejected with HTTP 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The request schema does not match expected schema.")]
    SchemaMismatch,

    #[error("The request schema does not match expected schema. Could not find values array.")]
    MissingValues,
}

/// Failure while searching for a single record. Recovered at the record
/// boundary and reported in that record's `errors`.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("record has no data object")]
    MissingData,

    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("search request timed out")]
    Timeout,

    #[error("search request cancelled")]
    Cancelled,

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("search response body was empty")]
    EmptyBody,

    #[error("could not parse search response: {0}")]
    Parse(String),

    #[error("search response has no webPages")]
    MissingWebPages,

    #[error("search response has no webPages.value")]
    MissingHits,
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}
