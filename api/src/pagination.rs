//! Sequential page loop for listings upstream only serves page by page.
//! Each page decides whether the next one is fetched, so pages are never
//! requested concurrently.

use crate::client::ApiResult;
use log::{debug, warn};

pub const PAGE_SIZE: usize = 10;
pub const MAX_PAGES: u32 = 20;

/// Calls `fetch_page(1)`, `fetch_page(2)`, … and concatenates the mapped
/// rows. `fetch_page` yields the page's upstream row count alongside the
/// records mapped from it, since unmappable rows are dropped before they
/// get here. Stops when upstream sent fewer than [`PAGE_SIZE`] rows, when
/// nothing on a page could be mapped, on a 400 (upstream's "past the
/// end"), on any other error, or after [`MAX_PAGES`]. Whatever was
/// accumulated is returned in every case.
pub async fn collect_pages<T, F, Fut>(what: &str, mut fetch_page: F) -> Vec<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ApiResult<(usize, Vec<T>)>>,
{
    let mut items = Vec::new();
    for page in 1..=MAX_PAGES {
        match fetch_page(page).await {
            Ok((rows, batch)) => {
                let mapped = batch.len();
                debug!("{what}: page {page} returned {rows} rows, {mapped} mapped");
                items.extend(batch);
                if rows < PAGE_SIZE || mapped == 0 {
                    return items;
                }
            }
            Err(e) if e.is_bad_request() => {
                debug!("{what}: page {page} is past the end");
                return items;
            }
            Err(e) => {
                warn!("{what}: stopping at page {page} with {} rows: {e}", items.len());
                return items;
            }
        }
    }
    debug!("{what}: page ceiling of {MAX_PAGES} reached");
    items
}
