//! `report` command: fetch promotions for every requested store and print
//! per-store discount statistics.
//!
//! Store failures are reported next to the successful stores rather than
//! aborting the run, unless `--strict` is given. The command only fails as a
//! whole when every store failed.

use std::collections::HashSet;
use std::fmt::{self, Write as _};

use promodb_core::{
    summarize, AnalysisOptions, AppConfig, Promotion, SortDirection, StoreConfig, StoreId,
    StoreSummary, DEFAULT_DECIMAL_POINTS,
};
use promodb_scraper::{PromotionsClient, ScraperError};
use serde::Serialize;

#[derive(Debug, Clone)]
pub(crate) struct ReportOptions {
    /// Empty means "use the stores file".
    pub store_ids: Vec<StoreId>,
    pub category_id: Option<u64>,
    pub analysis: AnalysisOptions,
    pub strict: bool,
    pub json: bool,
}

impl ReportOptions {
    pub(crate) fn new(
        store_ids: Vec<StoreId>,
        category_id: Option<u64>,
        ascending: bool,
        no_category_label: String,
        strict: bool,
        json: bool,
    ) -> Self {
        let category_order = if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        Self {
            store_ids,
            category_id,
            analysis: AnalysisOptions {
                decimal_points: DEFAULT_DECIMAL_POINTS,
                category_order,
                no_category_label,
            },
            strict,
            json,
        }
    }
}

/// One store's section of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StoreReport {
    pub store_id: StoreId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<StoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch, summarize, and print promotions for the requested stores.
///
/// # Errors
///
/// Returns an error if the stores file cannot be loaded, the client cannot be
/// built, the run is interrupted, every store fails, or (with `strict`) any
/// store fails.
pub(crate) async fn run_report(config: &AppConfig, options: &ReportOptions) -> anyhow::Result<()> {
    let stores = resolve_stores(config, &options.store_ids)?;
    let client = PromotionsClient::from_config(config)?;

    tracing::info!(
        stores = stores.len(),
        category_id = options.category_id,
        "retrieving promotions"
    );

    let retrieval = tokio::select! {
        retrieval = client.retrieve(stores.iter().map(|s| s.id), options.category_id) => retrieval,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            anyhow::bail!("interrupted; in-flight store fetches were cancelled");
        }
    };

    if options.strict {
        if let Some((store_id, error)) = retrieval.failures().next() {
            anyhow::bail!("store {store_id} failed: {error}");
        }
    }

    let reports: Vec<StoreReport> = stores
        .iter()
        .map(|store| store_report(store, retrieval.get(store.id), &options.analysis))
        .collect();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", render_text(&reports)?);
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 && failed == reports.len() {
        anyhow::bail!("all {failed} stores failed");
    }
    Ok(())
}

/// Stores given on the command line, in order and without duplicates, or the
/// stores file when none were given.
fn resolve_stores(config: &AppConfig, store_ids: &[StoreId]) -> anyhow::Result<Vec<StoreConfig>> {
    if store_ids.is_empty() {
        let file = promodb_core::load_stores(&config.stores_path)?;
        return Ok(file.stores);
    }

    let mut seen = HashSet::new();
    Ok(store_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|&id| StoreConfig { id, name: None })
        .collect())
}

fn store_report(
    store: &StoreConfig,
    outcome: Option<&Result<Vec<Promotion>, ScraperError>>,
    analysis: &AnalysisOptions,
) -> StoreReport {
    let (summary, error) = match outcome {
        Some(Ok(promotions)) => (Some(summarize(promotions, analysis)), None),
        Some(Err(e)) => (None, Some(e.to_string())),
        None => (None, Some("store was not retrieved".to_owned())),
    };

    StoreReport {
        store_id: store.id,
        name: store.name.clone(),
        summary,
        error,
    }
}

fn render_text(reports: &[StoreReport]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for report in reports {
        match &report.name {
            Some(name) => writeln!(out, "Store {} ({name}):", report.store_id)?,
            None => writeln!(out, "Store {}:", report.store_id)?,
        }

        if let Some(error) = &report.error {
            writeln!(out, "\tFetch failed: {error}")?;
            continue;
        }
        let Some(summary) = &report.summary else {
            continue;
        };

        writeln!(
            out,
            "\t{} promotions, {} with prices",
            summary.promotion_count, summary.priced_count
        )?;
        match summary.average_discount {
            Some(average) => writeln!(out, "\tAverage discount is {average:.2}%")?,
            None => writeln!(out, "\tNo promotions with correct prices")?,
        }

        if summary.categories.is_empty() {
            continue;
        }
        writeln!(out, "\tCategory average discounts:")?;
        for category in &summary.categories {
            writeln!(
                out,
                "\t\t{} - {:.2}% ({} promotions)",
                category.category, category.average_discount, category.promotion_count
            )?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
