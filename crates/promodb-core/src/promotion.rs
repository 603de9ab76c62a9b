//! Promotion records returned by the promotions API.
//!
//! ## Observed shape
//!
//! Every record in the `data` array of a promotions page is a flat JSON
//! object with camelCase keys. `price` and `oldPrice` are integers and are
//! either omitted or `null` for promotions that do not advertise a price
//! (e.g. "2 for 1" offers). Dates are plain `YYYY-MM-DD` strings.
//!
//! Everything except the two price fields is required: a record missing any
//! of them is rejected rather than defaulted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single validated promotion.
///
/// Constructed only through [`parse_promotion`] (or deserialization) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    /// Opaque promotion identifier. Uniqueness is not enforced.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Category display name. Empty string means "uncategorized".
    pub category_name: String,
    pub article_category: String,
    pub discount_category: String,
    /// Current price. `None` when the API does not report one.
    #[serde(default)]
    pub price: Option<i64>,
    /// Price before the promotion. `None` when the API does not report one.
    #[serde(default)]
    pub old_price: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub product_code: String,
    pub priority: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub alcohol: bool,
    pub image: String,
    pub image_url: String,
}

/// A raw promotion record did not match the expected schema.
#[derive(Debug, Error)]
#[error("invalid promotion record (id: {record_id}): {source}")]
pub struct ValidationError {
    /// The record's `id` if it could be read as a string, `"<unknown>"` otherwise.
    pub record_id: String,
    #[source]
    pub source: serde_json::Error,
}

/// Validates one raw API record into a [`Promotion`].
///
/// # Errors
///
/// Returns [`ValidationError`] if a required field is missing or any field
/// has the wrong type or format.
pub fn parse_promotion(raw: serde_json::Value) -> Result<Promotion, ValidationError> {
    let record_id = raw
        .get("id")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| "<unknown>".to_owned(), str::to_owned);

    serde_json::from_value(raw).map_err(|source| ValidationError { record_id, source })
}

#[cfg(test)]
#[path = "promotion_test.rs"]
mod tests;
