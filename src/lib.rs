//! azwiki - Azure DevOps Wiki Exporter
//!
//! Lists the wikis of an Azure DevOps project, flattens each wiki's page
//! tree and fetches every page's Markdown concurrently, then writes one
//! `<wiki>.json` file per wiki: an array of `{ "<page path>": "<markdown>" }`
//! objects in page-tree order.
//!
//! ## Quick Start
//!
//! ```ignore
//! use azwiki::{Credentials, export_all};
//!
//! let credentials = Credentials::new("contoso", "Fabrikam", pat);
//! let report = export_all(&credentials, None).await?;
//! ```
//!
//! ## Modules
//!
//! - [`client`]: service trait, HTTP client, authentication, retries
//! - [`export`]: page tree flattening, concurrent fetching, output files
//! - [`config`]: layered configuration (defaults, files, environment)
//! - [`types`]: wiki records and the error taxonomy

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod export;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ApiError, ErrorCategory, Result, WikiError};

// Domain
pub use types::{Page, PageContent, PageNode, Wiki, WikiExport};

// =============================================================================
// Client & Export Re-exports
// =============================================================================

pub use client::{Credentials, DevOpsClient, SharedApi, WikiApi};

pub use export::{
    ExportOptions, ExportReport, WikiExporter, export_all, fetch_all, fetch_content, flatten,
    write_export,
};
