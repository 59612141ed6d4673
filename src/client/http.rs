//! Azure DevOps REST client
//!
//! One `reqwest::Client` (and therefore one connection pool) serves every
//! request of a run, including the concurrent page fetches of a wiki.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::auth::Credentials;
use super::retry::{with_retry, with_timeout};
use super::WikiApi;
use crate::config::{Config, RetryConfig};
use crate::constants::api;
use crate::types::wiki::WikiCollection;
use crate::types::{ErrorClassifier, Page, PageNode, Result, Wiki, WikiError};

/// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY: usize = 300;

/// Wiki API client for one organization/project
pub struct DevOpsClient {
    organization: String,
    project: String,
    api_base: Url,
    timeout: Duration,
    retry: RetryConfig,
    /// Carries the Authorization header as a sensitive default header
    client: reqwest::Client,
}

impl std::fmt::Debug for DevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevOpsClient")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("api_base", &self.api_base.as_str())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl DevOpsClient {
    pub fn new(credentials: &Credentials, config: &Config) -> Result<Self> {
        let api_base = Url::parse(&config.connection.api_base).map_err(|e| {
            WikiError::Config(format!(
                "Invalid api_base '{}': {}",
                config.connection.api_base, e
            ))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(WikiError::Config(format!(
                "api_base '{}' cannot carry a path",
                api_base
            )));
        }

        let mut authorization =
            HeaderValue::from_str(credentials.authorization().expose_secret()).map_err(|_| {
                WikiError::Config("Personal access token contains invalid characters".to_string())
            })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.network.connect_timeout())
            .timeout(config.network.timeout())
            .build()
            .map_err(|e| WikiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            organization: credentials.organization().to_string(),
            project: credentials.project().to_string(),
            api_base,
            timeout: config.network.timeout(),
            retry: config.retry.clone(),
            client,
        })
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// `{base}/{org}/{project}/_apis/wiki/wikis[/{wiki}/pages]`
    fn wiki_url(&self, wiki: Option<&str>) -> Url {
        let mut url = self.api_base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.organization.as_str(), self.project.as_str()])
                .extend(["_apis", "wiki", "wikis"]);
            if let Some(wiki) = wiki {
                segments.push(wiki).push("pages");
            }
        }
        url
    }

    pub(crate) fn wikis_url(&self) -> Url {
        let mut url = self.wiki_url(None);
        url.query_pairs_mut()
            .append_pair("api-version", api::WIKIS_API_VERSION);
        url
    }

    pub(crate) fn page_tree_url(&self, wiki: &str) -> Url {
        let mut url = self.wiki_url(Some(wiki));
        url.query_pairs_mut()
            .append_pair("api-version", api::PAGES_API_VERSION)
            .append_pair("recursionLevel", api::FULL_RECURSION);
        url
    }

    pub(crate) fn page_url(&self, wiki: &str, path: &str) -> Url {
        let mut url = self.wiki_url(Some(wiki));
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("api-version", api::PAGES_API_VERSION)
            .append_pair("includeContent", "true");
        url
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// GET with timeout and retry, decoding the JSON body into `T`
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T> {
        let this = self;
        with_retry(&self.retry, context, move || {
            with_timeout(this.timeout, this.get_once(url.clone(), context), context)
        })
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(e, &url, context, self.timeout))?;

        let status = response.status();
        // A rejected token is answered with 203 and an HTML sign-in page
        if !status.is_success() || status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                url.as_str(),
                &summarize_body(status, &body),
            )
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, &url, context, self.timeout))?;

        parse_body(&bytes, context)
    }
}

#[async_trait]
impl WikiApi for DevOpsClient {
    async fn list_wikis(&self) -> Result<Vec<Wiki>> {
        let collection: WikiCollection = self.get_json(self.wikis_url(), "wiki list").await?;
        Ok(collection.value)
    }

    async fn get_page_tree(&self, wiki: &str) -> Result<PageNode> {
        let context = format!("page tree of '{}'", wiki);
        self.get_json(self.page_tree_url(wiki), &context).await
    }

    async fn get_page(&self, wiki: &str, path: &str) -> Result<Page> {
        let context = format!("page '{}' of '{}'", path, wiki);
        self.get_json(self.page_url(wiki, path), &context).await
    }

    fn name(&self) -> &str {
        &self.project
    }
}

/// Decode a JSON response body, reporting shape mismatches as malformed responses.
///
/// serde_json's built-in limit of 128 nesting levels would cap page trees at
/// 63 pages deep, so the limit is replaced by `api::MAX_JSON_DEPTH`, checked
/// before decoding.
pub(crate) fn parse_body<T: DeserializeOwned>(bytes: &[u8], context: &str) -> Result<T> {
    let depth = nesting_depth(bytes);
    if depth > api::MAX_JSON_DEPTH {
        return Err(WikiError::malformed(
            context,
            format!(
                "nesting depth {} exceeds the limit of {}",
                depth,
                api::MAX_JSON_DEPTH
            ),
        ));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let value: T = serde::Deserialize::deserialize(&mut deserializer)
        .map_err(|e| WikiError::malformed(context, e.to_string()))?;
    deserializer
        .end()
        .map_err(|e| WikiError::malformed(context, e.to_string()))?;
    Ok(value)
}

/// Deepest array/object nesting of a JSON document, ignoring brackets in strings
fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Transport failure of one request. reqwest's own request timeout surfaces
/// as the typed `Timeout`; a connect timeout stays a network error.
fn transport_error(
    err: reqwest::Error,
    url: &Url,
    context: &str,
    timeout: Duration,
) -> WikiError {
    if err.is_timeout() && !err.is_connect() {
        return WikiError::timeout(context, timeout);
    }
    ErrorClassifier::classify_transport(&err, url.as_str()).into()
}

fn summarize_body(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("HTTP error");
    let body = body.trim();
    if body.is_empty() {
        return reason.to_string();
    }
    let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{}: {}", reason, snippet)
}
