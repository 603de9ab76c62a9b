//! Discount statistics over already-retrieved promotions.
//!
//! Everything here is pure: no I/O, no caching. Results are recomputed on
//! every call.
//!
//! ## Exclusion rules
//!
//! A promotion only contributes to an average when [`discount`] succeeds for
//! it, i.e. both prices are present and strictly positive. Promotions without
//! usable prices are dropped from both the sum and the count. A collection in
//! which nothing contributes is [`AnalysisError::NoPromotionsFound`], except in
//! [`category_average_discounts`] where such a category reports `0.0`.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::promotion::Promotion;

pub const DEFAULT_DECIMAL_POINTS: u32 = 2;

/// Label for promotions whose `category_name` is empty.
pub const DEFAULT_NO_CATEGORY_LABEL: &str = "Без категории";

/// Beyond this `f64` has no more decimal digits to offer.
const MAX_DECIMAL_POINTS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("promotion {id} has unusable price data: {reason}")]
    WrongPrice { id: String, reason: &'static str },

    #[error("no promotions with correct prices")]
    NoPromotionsFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Knobs shared by the report-level helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub decimal_points: u32,
    pub category_order: SortDirection,
    pub no_category_label: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            decimal_points: DEFAULT_DECIMAL_POINTS,
            category_order: SortDirection::Descending,
            no_category_label: DEFAULT_NO_CATEGORY_LABEL.to_owned(),
        }
    }
}

/// Promotions sharing one category label, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: String,
    pub promotions: Vec<&'a Promotion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDiscount {
    pub category: String,
    pub average_discount: f64,
    pub promotion_count: usize,
}

/// Per-store statistics as shown in the CLI report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub promotion_count: usize,
    /// Promotions that contributed to `average_discount`.
    pub priced_count: usize,
    /// `None` when no promotion has usable prices.
    pub average_discount: Option<f64>,
    pub categories: Vec<CategoryDiscount>,
}

/// Percentage reduction from `old_price` to `price`, rounded to
/// `decimal_points` decimals.
///
/// # Errors
///
/// Returns [`AnalysisError::WrongPrice`] if either price is missing, zero, or
/// negative.
pub fn discount(promotion: &Promotion, decimal_points: u32) -> Result<f64, AnalysisError> {
    let wrong_price = |reason| AnalysisError::WrongPrice {
        id: promotion.id.clone(),
        reason,
    };

    let price = promotion.price.ok_or_else(|| wrong_price("missing current price"))?;
    let old_price = promotion.old_price.ok_or_else(|| wrong_price("missing old price"))?;
    if price <= 0 || old_price <= 0 {
        return Err(wrong_price("price cannot be zero or negative"));
    }

    #[allow(clippy::cast_precision_loss)]
    let percent = 100.0 * (old_price - price) as f64 / old_price as f64;
    Ok(round_to(percent, decimal_points))
}

/// Mean of [`discount`] over the promotions that have usable prices.
///
/// # Errors
///
/// Returns [`AnalysisError::NoPromotionsFound`] if `promotions` is empty or
/// none of them has usable prices.
pub fn average_discount(
    promotions: &[Promotion],
    decimal_points: u32,
) -> Result<f64, AnalysisError> {
    mean_discount(promotions.iter(), decimal_points).map(|(average, _)| average)
}

/// Groups promotions by category, in order of first appearance.
///
/// Empty category names are filed under `no_category_label`.
#[must_use]
pub fn group_by_category<'a>(
    promotions: &'a [Promotion],
    no_category_label: &str,
) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for promotion in promotions {
        let category = if promotion.category_name.is_empty() {
            no_category_label
        } else {
            promotion.category_name.as_str()
        };

        let slot = *index.entry(category).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: category.to_owned(),
                promotions: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].promotions.push(promotion);
    }

    groups
}

/// Average discount per category, sorted by average.
///
/// Categories without any priced promotion are reported as `0.0`. The sort is
/// stable, so categories with equal averages keep their order of first
/// appearance.
#[must_use]
pub fn category_average_discounts(
    promotions: &[Promotion],
    order: SortDirection,
    no_category_label: &str,
    decimal_points: u32,
) -> Vec<CategoryDiscount> {
    let mut result: Vec<CategoryDiscount> = group_by_category(promotions, no_category_label)
        .into_iter()
        .map(|group| {
            let average_discount =
                match mean_discount(group.promotions.iter().copied(), decimal_points) {
                    Ok((average, _)) => average,
                    Err(_) => 0.0,
                };
            CategoryDiscount {
                category: group.category,
                average_discount,
                promotion_count: group.promotions.len(),
            }
        })
        .collect();

    result.sort_by(|a, b| {
        let ordering = a
            .average_discount
            .partial_cmp(&b.average_discount)
            .unwrap_or(Ordering::Equal);
        match order {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    result
}

/// Overall and per-category statistics for one store's promotions.
#[must_use]
pub fn summarize(promotions: &[Promotion], options: &AnalysisOptions) -> StoreSummary {
    let (average_discount, priced_count) =
        match mean_discount(promotions.iter(), options.decimal_points) {
            Ok((average, count)) => (Some(average), count),
            Err(_) => (None, 0),
        };

    StoreSummary {
        promotion_count: promotions.len(),
        priced_count,
        average_discount,
        categories: category_average_discounts(
            promotions,
            options.category_order,
            &options.no_category_label,
            options.decimal_points,
        ),
    }
}

/// Returns the rounded mean and the number of contributing promotions.
///
/// Each promotion's discount is rounded to [`DEFAULT_DECIMAL_POINTS`] before
/// summing; only the mean uses `decimal_points`.
fn mean_discount<'a>(
    promotions: impl Iterator<Item = &'a Promotion>,
    decimal_points: u32,
) -> Result<(f64, usize), AnalysisError> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for promotion in promotions {
        if let Ok(value) = discount(promotion, DEFAULT_DECIMAL_POINTS) {
            sum += value;
            count += 1;
        }
    }

    if count == 0 {
        return Err(AnalysisError::NoPromotionsFound);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = sum / count as f64;
    Ok((round_to(mean, decimal_points), count))
}

/// Rounds half to even on the scaled value, so `0.125` becomes `0.12`.
fn round_to(value: f64, decimal_points: u32) -> f64 {
    let exponent = i32::try_from(decimal_points.min(MAX_DECIMAL_POINTS)).unwrap_or(0);
    let factor = 10f64.powi(exponent);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
