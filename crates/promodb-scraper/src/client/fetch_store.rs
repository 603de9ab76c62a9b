//! Full-listing fetch for a single store.

use promodb_core::Promotion;

use crate::error::ScraperError;
use crate::pagination::fetch_all;
use crate::query::StoreQuery;

use super::PromotionsClient;

impl PromotionsClient {
    /// Fetches every promotion for one store by paging through the listing
    /// until the API returns an empty page.
    ///
    /// **All-or-nothing semantics**: a failed page or a single invalid record
    /// fails the whole store. Promotions from earlier pages are discarded
    /// rather than returned as a silently truncated listing.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`]. Returns
    /// [`ScraperError::PaginationLimit`] if the store has more than the
    /// configured number of pages.
    pub async fn fetch_store(&self, query: &StoreQuery) -> Result<Vec<Promotion>, ScraperError> {
        let promotions = fetch_all(self.page_size, self.max_pages, |window| {
            let page = query.page(window);
            async move { self.fetch_page(&page).await }
        })
        .await?;

        tracing::info!(
            store_id = query.store_id,
            category_id = query.category_id,
            promotions = promotions.len(),
            "fetched store promotions"
        );
        Ok(promotions)
    }
}
