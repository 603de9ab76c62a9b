//! Wire types for the promotions endpoint.
//!
//! A successful response is an envelope whose `data` field holds the page's
//! records in display order. Other envelope fields (paging hints, request ids)
//! are ignored. Records are kept as raw JSON here and validated one by one
//! with [`promodb_core::parse_promotion`], so that a bad record can be
//! reported with its id and offset.

use serde::Deserialize;

/// Top-level response from `GET <api_url>?storeId=...`.
#[derive(Debug, Deserialize)]
pub struct PromotionsPage {
    pub data: Vec<serde_json::Value>,
}
