//! Wiki Domain Types
//!
//! Shapes of the records exchanged with the wiki service and of the
//! exported artifact. All of them live only for the duration of a run.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::export::FILE_EXTENSION;

/// A wiki of the project, as listed by the service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wiki {
    /// Identifier used in every per-wiki request and as the output file stem
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub wiki_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_path: Option<String>,
}

impl Wiki {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn identifier(&self) -> &str {
        &self.name
    }
}

/// Envelope of the wiki collection endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct WikiCollection {
    pub value: Vec<Wiki>,
}

/// Node of a wiki's page tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    /// Slash-delimited page path, e.g. `/Home/Setup`
    pub path: String,
    #[serde(default)]
    pub sub_pages: Vec<PageNode>,
}

impl PageNode {
    pub fn leaf(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sub_pages: Vec::new(),
        }
    }

    pub fn with_children(path: impl Into<String>, sub_pages: Vec<PageNode>) -> Self {
        Self {
            path: path.into(),
            sub_pages,
        }
    }
}

/// Single page as returned by the content endpoint
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Page {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Markdown content of one page, keyed by its path
///
/// Serializes as a single-entry object: `{ "<path>": "<content>" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub path: String,
    pub content: String,
}

impl PageContent {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl Serialize for PageContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.path, &self.content)?;
        map.end()
    }
}

/// Everything exported for one wiki, in page-tree order
#[derive(Debug, Clone)]
pub struct WikiExport {
    pub wiki: String,
    pub pages: Vec<PageContent>,
}

impl WikiExport {
    /// Output file name for this wiki
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.wiki, FILE_EXTENSION)
    }
}

impl Serialize for WikiExport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pages.serialize(serializer)
    }
}
