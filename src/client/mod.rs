//! Wiki Service Client
//!
//! Defines the `WikiApi` trait: the three read operations the exporter needs
//! from the remote service. `DevOpsClient` implements it over HTTPS.
//!
//! ## Modules
//!
//! - `auth`: personal access token handling and Basic header encoding
//! - `http`: reqwest-based Azure DevOps client
//! - `retry`: per-request timeout and exponential backoff

pub mod auth;
mod http;
#[cfg(test)]
pub(crate) mod mock;
pub mod retry;

pub use auth::{Credentials, basic_auth_header};
pub use http::DevOpsClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{Page, PageNode, Result, Wiki};

/// Shared client type for concurrent access across fetch tasks.
pub type SharedApi = Arc<dyn WikiApi + Send + Sync>;

/// Read access to the wikis of one project
#[async_trait]
pub trait WikiApi: Send + Sync {
    /// All wikis of the project, in the order the service lists them
    async fn list_wikis(&self) -> Result<Vec<Wiki>>;

    /// Root of the wiki's page tree, with all descendants
    async fn get_page_tree(&self, wiki: &str) -> Result<PageNode>;

    /// A single page including its content
    async fn get_page(&self, wiki: &str, path: &str) -> Result<Page>;

    /// Name for logging
    fn name(&self) -> &str;
}
