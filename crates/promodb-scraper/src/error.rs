use promodb_core::{StoreId, ValidationError};
use thiserror::Error;

use crate::pagination::PageLimitExceeded;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store {store_id}: record at offset {offset} failed validation: {source}")]
    Validation {
        store_id: StoreId,
        offset: u64,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    PaginationLimit(#[from] PageLimitExceeded),

    #[error("invalid promotions API URL \"{url}\": {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("invalid client settings: {0}")]
    InvalidSettings(String),
}

/// One store's failure, as surfaced by [`crate::Retrieval::into_strict`].
#[derive(Debug, Error)]
#[error("store {store_id} failed: {source}")]
pub struct StoreFailure {
    pub store_id: StoreId,
    #[source]
    pub source: ScraperError,
}
