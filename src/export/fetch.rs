//! Page content fetching
//!
//! `fetch_all` launches one request per path and returns the results in the
//! order of the input paths, whatever order the responses arrive in. The
//! first failure aborts the whole batch.

use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::client::WikiApi;
use crate::types::{PageContent, Result};

/// Fetch one page, substituting an empty string for a missing `content` field
pub async fn fetch_content(api: &dyn WikiApi, wiki: &str, path: &str) -> Result<PageContent> {
    let page = api.get_page(wiki, path).await?;
    Ok(PageContent::new(path, page.content.unwrap_or_default()))
}

/// Fetch every path of a wiki concurrently.
///
/// `max_concurrency` caps the requests in flight; `None` launches all of them
/// at once.
pub async fn fetch_all(
    api: &dyn WikiApi,
    wiki: &str,
    paths: &[String],
    max_concurrency: Option<usize>,
) -> Result<Vec<PageContent>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let limit = max_concurrency.unwrap_or(paths.len()).max(1);
    debug!(
        "Fetching {} pages of '{}' ({} in flight)",
        paths.len(),
        wiki,
        limit
    );

    // `buffered` yields in submission order, which keeps results aligned with `paths`
    stream::iter(paths)
        .map(|path| fetch_content(api, wiki, path))
        .buffered(limit)
        .try_collect()
        .await
}
