//! In-memory wiki service for tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::WikiApi;
use crate::types::{ApiError, ErrorCategory, Page, PageNode, Result, Wiki};

#[derive(Default)]
pub struct MockApi {
    wikis: Vec<Wiki>,
    trees: HashMap<String, PageNode>,
    pages: HashMap<(String, String), Option<String>>,
    delays: HashMap<String, Duration>,
    failing: HashSet<(String, String)>,
    fail_listing: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    page_requests: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wiki(mut self, name: &str, tree: PageNode) -> Self {
        self.wikis.push(Wiki::new(name));
        self.trees.insert(name.to_string(), tree);
        self
    }

    /// Page answered with `content`; `None` omits the field
    pub fn with_page(mut self, wiki: &str, path: &str, content: Option<&str>) -> Self {
        self.pages.insert(
            (wiki.to_string(), path.to_string()),
            content.map(str::to_string),
        );
        self
    }

    /// Delay applied to every page request for `path`
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, wiki: &str, path: &str) -> Self {
        self.failing.insert((wiki.to_string(), path.to_string()));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Highest number of page requests that were in flight together
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    fn url(wiki: &str, path: &str) -> String {
        format!("mock://{}{}", wiki, path)
    }
}

#[async_trait]
impl WikiApi for MockApi {
    async fn list_wikis(&self) -> Result<Vec<Wiki>> {
        if self.fail_listing {
            return Err(ApiError::new(ErrorCategory::Auth, "mock://wikis", "Unauthorized")
                .with_status(401)
                .into());
        }
        Ok(self.wikis.clone())
    }

    async fn get_page_tree(&self, wiki: &str) -> Result<PageNode> {
        self.trees.get(wiki).cloned().ok_or_else(|| {
            ApiError::new(ErrorCategory::NotFound, Self::url(wiki, "/"), "Not Found")
                .with_status(404)
                .into()
        })
    }

    async fn get_page(&self, wiki: &str, path: &str) -> Result<Page> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let key = (wiki.to_string(), path.to_string());
        if self.failing.contains(&key) {
            return Err(
                ApiError::new(ErrorCategory::Transient, Self::url(wiki, path), "Server Error")
                    .with_status(500)
                    .into(),
            );
        }

        match self.pages.get(&key) {
            Some(content) => Ok(Page {
                path: Some(path.to_string()),
                content: content.clone(),
            }),
            None => Err(
                ApiError::new(ErrorCategory::NotFound, Self::url(wiki, path), "Not Found")
                    .with_status(404)
                    .into(),
            ),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
