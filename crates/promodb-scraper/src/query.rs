//! Query parameters for the promotions endpoint.

use promodb_core::StoreId;

use crate::pagination::PageWindow;

pub const DEFAULT_SORT_BY: &str = "priority";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for one store's promotion listing. Pagination is not part of it:
/// offsets are chosen by the paginator, one [`PageQuery`] per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub store_id: StoreId,
    /// `None` requests promotions from every category.
    pub category_id: Option<u64>,
    pub sort_by: String,
    pub order: SortOrder,
    /// Whether age-restricted goods are included.
    pub adult: bool,
}

impl StoreQuery {
    /// Query for every category, sorted by priority, descending, adult goods included.
    #[must_use]
    pub fn new(store_id: StoreId) -> Self {
        Self {
            store_id,
            category_id: None,
            sort_by: DEFAULT_SORT_BY.to_owned(),
            order: SortOrder::default(),
            adult: true,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category_id: Option<u64>) -> Self {
        self.category_id = category_id;
        self
    }

    #[must_use]
    pub fn page(&self, window: PageWindow) -> PageQuery<'_> {
        PageQuery {
            store: self,
            offset: window.offset,
            limit: window.limit,
        }
    }
}

/// A single page request: store filters plus an offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery<'a> {
    pub store: &'a StoreQuery,
    pub offset: u64,
    pub limit: u32,
}

impl PageQuery<'_> {
    /// Query-string pairs in the order the API documents them. Unset filters
    /// produce no pair at all.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(7);
        if let Some(category_id) = self.store.category_id {
            pairs.push(("categoryId", category_id.to_string()));
        }
        pairs.push(("storeId", self.store.store_id.to_string()));
        pairs.push(("sortBy", self.store.sort_by.clone()));
        pairs.push(("order", self.store.order.as_str().to_owned()));
        pairs.push(("adult", self.store.adult.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&'static str, String)]) -> Vec<&'static str> {
        pairs.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn defaults_match_api_expectations() {
        let query = StoreQuery::new(8958);
        assert_eq!(query.sort_by, "priority");
        assert_eq!(query.order, SortOrder::Desc);
        assert!(query.adult);
        assert_eq!(query.category_id, None);
    }

    #[test]
    fn unset_category_sends_no_key() {
        let query = StoreQuery::new(8958);
        let pairs = query.page(PageWindow { offset: 0, limit: 36 }).query_pairs();

        assert_eq!(
            keys(&pairs),
            ["storeId", "sortBy", "order", "adult", "offset", "limit"]
        );
        assert_eq!(
            pairs,
            vec![
                ("storeId", "8958".to_owned()),
                ("sortBy", "priority".to_owned()),
                ("order", "desc".to_owned()),
                ("adult", "true".to_owned()),
                ("offset", "0".to_owned()),
                ("limit", "36".to_owned()),
            ]
        );
    }

    #[test]
    fn category_is_sent_first_when_set() {
        let query = StoreQuery::new(1).with_category(Some(4242));
        let pairs = query.page(PageWindow { offset: 72, limit: 36 }).query_pairs();

        assert_eq!(pairs[0], ("categoryId", "4242".to_owned()));
        assert_eq!(pairs[5], ("offset", "72".to_owned()));
    }

    #[test]
    fn adult_flag_is_lowercase() {
        let mut query = StoreQuery::new(1);
        query.adult = false;
        query.order = SortOrder::Asc;
        let pairs = query.page(PageWindow { offset: 0, limit: 1 }).query_pairs();

        assert!(pairs.contains(&("adult", "false".to_owned())));
        assert!(pairs.contains(&("order", "asc".to_owned())));
    }

    #[test]
    fn pages_share_filters_but_not_offsets() {
        let query = StoreQuery::new(1);
        let first = query.page(PageWindow { offset: 0, limit: 36 });
        let second = query.page(PageWindow { offset: 36, limit: 36 });

        assert_eq!(first.store, second.store);
        assert_ne!(first.offset, second.offset);
    }
}
