//! Concurrent multi-store retrieval.
//!
//! Every store is fetched by its own future, all of them polled from one
//! `buffer_unordered` stream owned by the [`PromotionsClient::retrieve`]
//! future. Dropping that future (timeout, Ctrl-C) drops every in-flight store
//! fetch with it; nothing keeps running in the background.

use std::collections::btree_map;
use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use promodb_core::{Promotion, StoreId};

use crate::error::{ScraperError, StoreFailure};
use crate::query::StoreQuery;

use super::PromotionsClient;

/// Per-store outcome of a retrieval, keyed by store id.
///
/// A failure for one store never hides the promotions of another.
#[derive(Debug)]
pub struct Retrieval {
    stores: BTreeMap<StoreId, Result<Vec<Promotion>, ScraperError>>,
}

impl Retrieval {
    #[must_use]
    pub fn get(&self, store_id: StoreId) -> Option<&Result<Vec<Promotion>, ScraperError>> {
        self.stores.get(&store_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// All stores in ascending id order.
    pub fn iter(&self) -> btree_map::Iter<'_, StoreId, Result<Vec<Promotion>, ScraperError>> {
        self.stores.iter()
    }

    pub fn successes(&self) -> impl Iterator<Item = (StoreId, &[Promotion])> {
        self.stores
            .iter()
            .filter_map(|(id, result)| result.as_ref().ok().map(|p| (*id, p.as_slice())))
    }

    pub fn failures(&self) -> impl Iterator<Item = (StoreId, &ScraperError)> {
        self.stores
            .iter()
            .filter_map(|(id, result)| result.as_ref().err().map(|e| (*id, e)))
    }

    /// Collapses the retrieval into an all-or-nothing result: either every
    /// store's promotions, or the failure of the lowest failing store id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFailure`] if any store failed.
    pub fn into_strict(self) -> Result<BTreeMap<StoreId, Vec<Promotion>>, StoreFailure> {
        self.stores
            .into_iter()
            .map(|(store_id, result)| {
                result
                    .map(|promotions| (store_id, promotions))
                    .map_err(|source| StoreFailure { store_id, source })
            })
            .collect()
    }
}

impl IntoIterator for Retrieval {
    type Item = (StoreId, Result<Vec<Promotion>, ScraperError>);
    type IntoIter = btree_map::IntoIter<StoreId, Result<Vec<Promotion>, ScraperError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.stores.into_iter()
    }
}

impl PromotionsClient {
    /// Fetches the promotions of every store in `store_ids` concurrently,
    /// optionally restricted to one category.
    ///
    /// Duplicate ids are fetched once. Returns only after every store has
    /// finished; each store's entry holds either its promotions or its error.
    pub async fn retrieve<I>(&self, store_ids: I, category_id: Option<u64>) -> Retrieval
    where
        I: IntoIterator<Item = StoreId>,
    {
        let queries = store_ids
            .into_iter()
            .map(|store_id| StoreQuery::new(store_id).with_category(category_id));
        self.retrieve_queries(queries).await
    }

    /// Like [`Self::retrieve`], with full control over each store's query.
    ///
    /// If two queries share a store id, the later one wins.
    pub async fn retrieve_queries<I>(&self, queries: I) -> Retrieval
    where
        I: IntoIterator<Item = StoreQuery>,
    {
        let queries: BTreeMap<StoreId, StoreQuery> = queries
            .into_iter()
            .map(|query| (query.store_id, query))
            .collect();

        let max_concurrent = if self.max_concurrent_stores == 0 {
            queries.len().max(1)
        } else {
            self.max_concurrent_stores
        };

        let stores: BTreeMap<StoreId, Result<Vec<Promotion>, ScraperError>> =
            stream::iter(queries.values())
                .map(|query| async move { (query.store_id, self.fetch_store(query).await) })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;

        let mut failed = 0usize;
        for (store_id, error) in stores
            .iter()
            .filter_map(|(id, result)| result.as_ref().err().map(|e| (id, e)))
        {
            tracing::warn!(store_id, error = %error, "store promotions fetch failed");
            failed += 1;
        }
        tracing::info!(
            stores = stores.len(),
            succeeded = stores.len() - failed,
            failed,
            "retrieval finished"
        );

        Retrieval { stores }
    }
}
