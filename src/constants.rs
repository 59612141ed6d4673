//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Azure DevOps REST API constants
pub mod api {
    /// Default service root; organization and project are appended as path segments
    pub const DEFAULT_API_BASE: &str = "https://dev.azure.com";

    /// API version accepted by the wiki collection endpoint
    pub const WIKIS_API_VERSION: &str = "6.0";

    /// API version accepted by the page endpoints
    pub const PAGES_API_VERSION: &str = "7.1-preview.1";

    /// Recursion level requesting the whole page tree in one response
    pub const FULL_RECURSION: &str = "Full";

    /// Deepest array/object nesting accepted in a response body. Each page
    /// level of a tree takes two (the node and its `subPages`), so this admits
    /// trees about 500 pages deep.
    pub const MAX_JSON_DEPTH: usize = 1024;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
}

/// Retry policy constants
pub mod retry {
    /// Retries are opt-in
    pub const DEFAULT_MAX_RETRIES: u32 = 0;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Export output constants
pub mod export {
    /// Output directory, relative to the working directory
    pub const DEFAULT_OUTPUT_DIR: &str = "wikis";

    /// Extension of the per-wiki output file
    pub const FILE_EXTENSION: &str = "json";
}

/// Environment variables read in addition to the `AZWIKI_` prefix
pub mod env {
    pub const PREFIX: &str = "AZWIKI_";
    pub const PAT: &str = "AZURE_DEVOPS_PAT";
    pub const ORGANIZATION: &str = "ORGANIZATION";
    pub const PROJECT: &str = "PROJECT";
}
