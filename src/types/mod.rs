pub mod error;
pub mod wiki;

pub use error::{ApiError, ErrorCategory, ErrorClassifier, Result, WikiError};
pub use wiki::{Page, PageContent, PageNode, Wiki, WikiExport};
