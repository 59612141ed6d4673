//! Wiki Export Pipeline
//!
//! For every wiki of the project, in the order the service lists them:
//!
//! 1. Fetch the page tree and flatten it into page paths
//! 2. Fetch all page contents concurrently
//! 3. Write `<output_dir>/<wiki>.json`
//!
//! Wikis are processed one after another. By default the first failure
//! aborts the run; with `isolate_failures` the failing wiki is reported and
//! the next one is exported. A wiki's file is either written completely or
//! not at all.

pub mod fetch;
pub mod tree;

pub use fetch::{fetch_all, fetch_content};
pub use tree::flatten;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::client::{Credentials, DevOpsClient, SharedApi};
use crate::config::{Config, ExportConfig};
use crate::types::{Result, Wiki, WikiError, WikiExport};

// =============================================================================
// Options & Report
// =============================================================================

/// Export run options
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving the output files (created if missing)
    pub output_dir: PathBuf,
    /// Continue with the next wiki when one fails
    pub isolate_failures: bool,
    /// Cap on concurrent content requests per wiki
    pub max_concurrency: Option<usize>,
    /// Pretty-print output JSON
    pub pretty: bool,
    /// Export only these wikis (empty = all)
    pub only: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl ExportOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            isolate_failures: config.isolate_failures,
            max_concurrency: config.max_concurrency,
            pretty: config.pretty,
            only: Vec::new(),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_isolated_failures(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    pub fn with_only(mut self, wikis: Vec<String>) -> Self {
        self.only = wikis;
        self
    }
}

/// A wiki whose file was written
#[derive(Debug, Clone, Serialize)]
pub struct ExportedWiki {
    pub wiki: String,
    pub file: PathBuf,
    pub pages: usize,
    pub duration_ms: u64,
}

/// A wiki skipped after a failure (isolated mode only)
#[derive(Debug, Clone, Serialize)]
pub struct FailedWiki {
    pub wiki: String,
    pub error: String,
}

/// Outcome of an export run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub exported: Vec<ExportedWiki>,
    pub failed: Vec<FailedWiki>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_pages(&self) -> usize {
        self.exported.iter().map(|w| w.pages).sum()
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// Drives listing, flattening, fetching and writing for every wiki
pub struct WikiExporter {
    api: SharedApi,
    options: ExportOptions,
}

impl WikiExporter {
    pub fn new(api: SharedApi, options: ExportOptions) -> Self {
        Self { api, options }
    }

    /// Export every (selected) wiki of the project
    #[instrument(skip(self), fields(project = self.api.name()))]
    pub async fn export_all(&self) -> Result<ExportReport> {
        let wikis = self.select(self.api.list_wikis().await?)?;
        info!("Exporting {} wikis", wikis.len());

        let mut report = ExportReport::default();
        for wiki in &wikis {
            match self.export_wiki(wiki).await {
                Ok(exported) => report.exported.push(exported),
                Err(e) if self.options.isolate_failures => {
                    warn!("Skipping wiki '{}': {}", wiki.identifier(), e);
                    report.failed.push(FailedWiki {
                        wiki: wiki.identifier().to_string(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e.in_wiki(wiki.identifier())),
            }
        }

        info!(
            "Exported {} pages from {} wikis ({} failed)",
            report.total_pages(),
            report.exported.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Fetch and write one wiki
    #[instrument(skip(self, wiki), fields(wiki = wiki.identifier()))]
    pub async fn export_wiki(&self, wiki: &Wiki) -> Result<ExportedWiki> {
        let start = Instant::now();
        let export = self.collect(wiki).await?;
        let file = write_export(&self.options.output_dir, &export, self.options.pretty).await?;

        info!("Wrote {} pages to {}", export.pages.len(), file.display());
        Ok(ExportedWiki {
            wiki: export.wiki,
            pages: export.pages.len(),
            file,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Fetch all pages of one wiki without writing anything
    pub async fn collect(&self, wiki: &Wiki) -> Result<WikiExport> {
        let name = wiki.identifier();
        validate_identifier(name)?;

        let paths = self.page_paths(name).await?;
        info!("Fetching {} pages of '{}'", paths.len(), name);

        let pages = fetch_all(
            self.api.as_ref(),
            name,
            &paths,
            self.options.max_concurrency,
        )
        .await?;
        Ok(WikiExport {
            wiki: name.to_string(),
            pages,
        })
    }

    /// Page paths of one wiki in page-tree order
    pub async fn page_paths(&self, wiki: &str) -> Result<Vec<String>> {
        let tree = self.api.get_page_tree(wiki).await?;
        flatten(&tree)
    }

    fn select(&self, wikis: Vec<Wiki>) -> Result<Vec<Wiki>> {
        if self.options.only.is_empty() {
            return Ok(wikis);
        }

        let unknown: Vec<&str> = self
            .options
            .only
            .iter()
            .filter(|name| !wikis.iter().any(|w| w.identifier() == name.as_str()))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            let available: Vec<&str> = wikis.iter().map(Wiki::identifier).collect();
            return Err(WikiError::Config(format!(
                "Unknown wiki(s): {}. Available: {}",
                unknown.join(", "),
                available.join(", ")
            )));
        }

        Ok(wikis
            .into_iter()
            .filter(|w| self.options.only.iter().any(|name| name == w.identifier()))
            .collect())
    }
}

/// Export all wikis of a project with default settings
///
/// `output_dir` defaults to `./wikis`.
pub async fn export_all(
    credentials: &Credentials,
    output_dir: Option<PathBuf>,
) -> Result<ExportReport> {
    let config = Config::default();
    let client = DevOpsClient::new(credentials, &config)?;

    let mut options = ExportOptions::from_config(&config.export);
    if let Some(dir) = output_dir {
        options.output_dir = dir;
    }

    WikiExporter::new(Arc::new(client), options)
        .export_all()
        .await
}

// =============================================================================
// Output
// =============================================================================

/// The wiki name becomes a file name, so it must stay inside the output directory
fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(WikiError::malformed(
            "wiki list",
            format!("wiki name '{}' cannot be used as a file name", name),
        ));
    }
    Ok(())
}

/// Write the export as a JSON array, replacing any previous file.
///
/// The content goes to a temporary sibling first and is renamed into place.
pub async fn write_export(dir: &Path, export: &WikiExport, pretty: bool) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| WikiError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let json = if pretty {
        serde_json::to_vec_pretty(export)?
    } else {
        serde_json::to_vec(export)?
    };

    let path = dir.join(export.file_name());
    let tmp = dir.join(format!(".{}.tmp", export.file_name()));

    // Either step can leave a (partial) temp file behind
    if let Err(source) = tokio::fs::write(&tmp, &json).await {
        discard(&tmp).await;
        return Err(WikiError::Write { path: tmp, source });
    }
    if let Err(source) = tokio::fs::rename(&tmp, &path).await {
        discard(&tmp).await;
        return Err(WikiError::Write { path, source });
    }

    Ok(path)
}

async fn discard(tmp: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Could not remove {}: {}", tmp.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockApi;
    use crate::types::{ErrorCategory, PageContent, PageNode};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    type Entries = Vec<BTreeMap<String, String>>;

    fn read_entries(path: &Path) -> Entries {
        let raw = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn entry(path: &str, content: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(path.to_string(), content.to_string())])
    }

    /// wiki1: Home{Sub1, Sub2}; wiki2: Home
    fn two_wikis() -> MockApi {
        MockApi::new()
            .with_wiki(
                "wiki1",
                PageNode::with_children(
                    "/Home",
                    vec![PageNode::leaf("/Home/Sub1"), PageNode::leaf("/Home/Sub2")],
                ),
            )
            .with_wiki("wiki2", PageNode::leaf("/Home"))
            .with_page("wiki1", "/Home", Some("# Home"))
            .with_page("wiki1", "/Home/Sub1", Some("sub one"))
            .with_page("wiki1", "/Home/Sub2", None)
            .with_page("wiki2", "/Home", Some("second wiki"))
    }

    fn exporter(api: MockApi, dir: &Path) -> WikiExporter {
        WikiExporter::new(
            Arc::new(api),
            ExportOptions::default().with_output_dir(dir),
        )
    }

    #[tokio::test]
    async fn test_exports_every_wiki() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out").join("wikis");

        let report = exporter(two_wikis(), &output).export_all().await.unwrap();

        assert!(output.is_dir());
        assert!(report.is_success());
        assert_eq!(report.exported.len(), 2);
        assert_eq!(report.total_pages(), 4);

        assert_eq!(
            read_entries(&output.join("wiki1.json")),
            vec![
                entry("/Home", "# Home"),
                entry("/Home/Sub1", "sub one"),
                entry("/Home/Sub2", ""),
            ]
        );
        assert_eq!(
            read_entries(&output.join("wiki2.json")),
            vec![entry("/Home", "second wiki")]
        );
    }

    #[tokio::test]
    async fn test_no_leftover_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        exporter(two_wikis(), temp_dir.path())
            .export_all()
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["wiki1.json", "wiki2.json"]);
    }

    #[tokio::test]
    async fn test_failed_page_aborts_run_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let api = two_wikis().with_failure("wiki2", "/Home");

        let err = exporter(api, temp_dir.path())
            .export_all()
            .await
            .unwrap_err();

        assert!(matches!(&err, WikiError::Export { wiki, .. } if wiki == "wiki2"));
        assert_eq!(err.category(), Some(ErrorCategory::Transient));
        // Earlier wikis stay written
        assert!(temp_dir.path().join("wiki1.json").exists());
        assert!(!temp_dir.path().join("wiki2.json").exists());
    }

    #[tokio::test]
    async fn test_failed_page_in_first_wiki_stops_before_second() {
        let temp_dir = TempDir::new().unwrap();
        let api = two_wikis().with_failure("wiki1", "/Home/Sub1");

        assert!(exporter(api, temp_dir.path()).export_all().await.is_err());
        assert!(!temp_dir.path().join("wiki1.json").exists());
        assert!(!temp_dir.path().join("wiki2.json").exists());
    }

    #[tokio::test]
    async fn test_isolated_failure_continues() {
        let temp_dir = TempDir::new().unwrap();
        let api = two_wikis().with_failure("wiki1", "/Home/Sub2");
        let options = ExportOptions::default()
            .with_output_dir(temp_dir.path())
            .with_isolated_failures(true);

        let report = WikiExporter::new(Arc::new(api), options)
            .export_all()
            .await
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].wiki, "wiki1");
        assert_eq!(report.exported.len(), 1);
        assert!(!temp_dir.path().join("wiki1.json").exists());
        assert!(temp_dir.path().join("wiki2.json").exists());
    }

    #[tokio::test]
    async fn test_listing_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("wikis");

        let err = exporter(two_wikis().failing_listing(), &output)
            .export_all()
            .await
            .unwrap_err();

        assert_eq!(err.category(), Some(ErrorCategory::Auth));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_page_fails_wiki() {
        let temp_dir = TempDir::new().unwrap();
        let api = two_wikis().with_wiki("ghost", PageNode::leaf("/"));
        // "ghost" lists a root page the service cannot return
        let err = exporter(api, temp_dir.path())
            .export_all()
            .await
            .unwrap_err();

        assert!(matches!(&err, WikiError::Export { wiki, .. } if wiki == "ghost"));
        assert_eq!(err.category(), Some(ErrorCategory::NotFound));
    }

    #[tokio::test]
    async fn test_cyclic_tree_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let tree = PageNode::with_children("/A", vec![PageNode::leaf("/A")]);
        let api = MockApi::new().with_wiki("loop", tree);

        let err = exporter(api, temp_dir.path())
            .export_all()
            .await
            .unwrap_err();

        match err {
            WikiError::Export { source, .. } => {
                assert!(matches!(*source, WikiError::Malformed { .. }))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_overwrites_previous_export() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("wiki2.json"), "stale").unwrap();

        exporter(two_wikis(), temp_dir.path())
            .export_all()
            .await
            .unwrap();

        assert_eq!(
            read_entries(&temp_dir.path().join("wiki2.json")),
            vec![entry("/Home", "second wiki")]
        );
    }

    #[tokio::test]
    async fn test_only_selected_wikis() {
        let temp_dir = TempDir::new().unwrap();
        let options = ExportOptions::default()
            .with_output_dir(temp_dir.path())
            .with_only(vec!["wiki2".to_string()]);

        let report = WikiExporter::new(Arc::new(two_wikis()), options)
            .export_all()
            .await
            .unwrap();

        assert_eq!(report.exported.len(), 1);
        assert!(!temp_dir.path().join("wiki1.json").exists());
        assert!(temp_dir.path().join("wiki2.json").exists());
    }

    #[tokio::test]
    async fn test_unknown_selected_wiki() {
        let temp_dir = TempDir::new().unwrap();
        let options = ExportOptions::default()
            .with_output_dir(temp_dir.path())
            .with_only(vec!["nope".to_string()]);

        let err = WikiExporter::new(Arc::new(two_wikis()), options)
            .export_all()
            .await
            .unwrap_err();

        assert!(matches!(err, WikiError::Config(_)));
        assert!(err.to_string().contains("wiki1"));
    }

    #[tokio::test]
    async fn test_rejects_path_like_wiki_name() {
        let temp_dir = TempDir::new().unwrap();
        let api = MockApi::new()
            .with_wiki("../escape", PageNode::leaf("/"))
            .with_page("../escape", "/", Some("x"));

        let err = exporter(api, temp_dir.path())
            .export_all()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("../escape"));
        assert!(!temp_dir.path().parent().unwrap().join("escape.json").exists());
    }

    #[tokio::test]
    async fn test_page_paths_in_tree_order() {
        let temp_dir = TempDir::new().unwrap();
        let paths = exporter(two_wikis(), temp_dir.path())
            .page_paths("wiki1")
            .await
            .unwrap();
        assert_eq!(paths, vec!["/Home", "/Home/Sub1", "/Home/Sub2"]);
    }

    #[tokio::test]
    async fn test_report_serializes_for_json_output() {
        let temp_dir = TempDir::new().unwrap();
        let api = two_wikis().with_failure("wiki1", "/Home");
        let options = ExportOptions::default()
            .with_output_dir(temp_dir.path())
            .with_isolated_failures(true);

        let report = WikiExporter::new(Arc::new(api), options)
            .export_all()
            .await
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["exported"][0]["wiki"], "wiki2");
        assert_eq!(json["exported"][0]["pages"], 1);
        assert_eq!(json["failed"][0]["wiki"], "wiki1");
        assert!(json["failed"][0]["error"].as_str().unwrap().contains("/Home"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory where the output file belongs blocks the rename
        let blocked = temp_dir.path().join("docs.json");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();
        let export = WikiExport {
            wiki: "docs".to_string(),
            pages: vec![PageContent::new("/", "root")],
        };

        let err = write_export(temp_dir.path(), &export, false)
            .await
            .unwrap_err();

        assert!(matches!(err, WikiError::Write { .. }));
        assert!(!temp_dir.path().join(".docs.json.tmp").exists());
        assert!(blocked.join("keep").exists());
    }

    #[tokio::test]
    async fn test_write_export_pretty() {
        let temp_dir = TempDir::new().unwrap();
        let export = WikiExport {
            wiki: "docs".to_string(),
            pages: vec![PageContent::new("/", "root")],
        };

        let path = write_export(temp_dir.path(), &export, true).await.unwrap();

        assert_eq!(path, temp_dir.path().join("docs.json"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        assert_eq!(read_entries(&path), vec![entry("/", "root")]);
    }
}
