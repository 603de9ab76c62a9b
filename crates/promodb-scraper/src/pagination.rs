//! Offset-based pagination for the promotions API.
//!
//! The API has no cursor or total count. A listing is read by requesting
//! `limit` records at `offset = 0, limit, 2 * limit, ...` until a page comes
//! back empty. The loop therefore assumes the server never returns a short
//! page before the end and never repeats records across offsets.
//!
//! [`fetch_all`] is the loop on its own, independent of HTTP: it drives any
//! page-fetch closure. The promotions client plugs its single-page request
//! into it.

use std::future::Future;
use std::num::NonZeroU32;

use thiserror::Error;

/// The offset/limit pair for one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

/// More than `max_pages` non-empty pages were returned for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pagination limit reached: exceeded {max_pages} pages")]
pub struct PageLimitExceeded {
    pub max_pages: usize,
}

/// Fetches every page of a listing and returns all items in page order.
///
/// `fetch_page` is called with `offset = 0` first, then with the offset
/// advanced by `page_size` after each page, strictly one page at a time. The
/// loop stops after the first empty page, so a listing of `n` non-empty pages
/// costs `n + 1` requests and an empty listing costs exactly one.
///
/// # Errors
///
/// Any error from `fetch_page` aborts the loop and is returned as-is; items
/// from earlier pages are discarded. If `max_pages` pages in a row were
/// non-empty, no further request is made and [`PageLimitExceeded`] is
/// returned.
pub async fn fetch_all<T, E, F, Fut>(
    page_size: NonZeroU32,
    max_pages: usize,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(PageWindow) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    E: From<PageLimitExceeded>,
{
    let limit = page_size.get();
    let mut all_items: Vec<T> = Vec::new();
    let mut offset = 0u64;
    let mut page_count = 0usize;

    loop {
        if page_count >= max_pages {
            return Err(PageLimitExceeded { max_pages }.into());
        }
        page_count += 1;

        let page = fetch_page(PageWindow { offset, limit }).await?;
        if page.is_empty() {
            break;
        }

        all_items.extend(page);
        offset += u64::from(limit);
    }

    Ok(all_items)
}
