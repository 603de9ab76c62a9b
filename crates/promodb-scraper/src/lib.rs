pub mod client;
pub mod error;
pub mod pagination;
pub mod query;
pub mod types;

pub use client::{ClientSettings, PromotionsClient, Retrieval, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
pub use error::{ScraperError, StoreFailure};
pub use pagination::{fetch_all, PageLimitExceeded, PageWindow};
pub use query::{PageQuery, SortOrder, StoreQuery};
