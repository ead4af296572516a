//! Asset fetching and image inlining.
//!
//! Exported documents must not depend on anything outside themselves, so
//! every `<img>` reference in the rendered markup is fetched and replaced
//! by a `data:` URI. A reference that cannot be fetched stays as it was
//! and is reported as an [`AssetWarning`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use thiserror::Error;

/// Non-fatal asset problems.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("no fetcher handles '{reference}'")]
    Unsupported { reference: String },

    #[error("asset not found: {reference}")]
    NotFound { reference: String },

    #[error("timed out after {timeout_ms} ms fetching '{reference}'")]
    Timeout { reference: String, timeout_ms: u64 },

    #[error("failed to fetch '{reference}': {reason}")]
    Fetch { reference: String, reason: String },

    #[error("failed to read '{reference}': {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    pub fn reference(&self) -> &str {
        match self {
            AssetError::Unsupported { reference }
            | AssetError::NotFound { reference }
            | AssetError::Timeout { reference, .. }
            | AssetError::Fetch { reference, .. }
            | AssetError::Io { reference, .. } => reference,
        }
    }
}

/// A degraded asset recorded on an export result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetWarning {
    pub reference: String,
    pub message: String,
}

impl From<&AssetError> for AssetWarning {
    fn from(err: &AssetError) -> Self {
        Self {
            reference: err.reference().to_string(),
            message: err.to_string(),
        }
    }
}

/// Raw bytes of a fetched asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    /// Content type reported by the source, if any.
    pub mime: Option<String>,
}

impl FetchedAsset {
    /// Encode as a `data:` URI.
    pub fn to_data_uri(&self, reference: &str) -> String {
        let mime = self
            .mime
            .as_deref()
            .filter(|m| m.starts_with("image/"))
            .map(str::to_string)
            .unwrap_or_else(|| sniff_mime(&self.bytes, reference).to_string());
        format!("data:{};base64,{}", mime, STANDARD.encode(&self.bytes))
    }
}

/// Source of asset bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Whether this fetcher handles `reference`.
    fn supports(&self, reference: &str) -> bool;

    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError>;
}

/// Already self-contained; nothing to fetch.
pub fn is_embedded(reference: &str) -> bool {
    reference.trim_start().starts_with("data:")
}

pub fn is_remote(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// In-memory object URLs; they only live inside the editing page.
pub fn is_blob(reference: &str) -> bool {
    reference.trim_start().starts_with("blob:")
}

/// Reads filesystem paths and `file://` URLs. Relative paths resolve
/// against the base directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct LocalAssetFetcher {
    base_dir: Option<PathBuf>,
}

impl LocalAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let raw = reference.strip_prefix("file://").unwrap_or(reference);
        let path = Path::new(raw);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl AssetFetcher for LocalAssetFetcher {
    fn supports(&self, reference: &str) -> bool {
        !reference.trim().is_empty()
            && !is_embedded(reference)
            && !is_remote(reference)
            && !is_blob(reference)
    }

    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError> {
        let path = self.resolve(reference);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(FetchedAsset { bytes, mime: None }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AssetError::NotFound {
                reference: reference.to_string(),
            }),
            Err(e) => Err(AssetError::Io {
                reference: reference.to_string(),
                source: e,
            }),
        }
    }
}

/// Fetches `http(s)` references.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    fn supports(&self, reference: &str) -> bool {
        is_remote(reference)
    }

    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError> {
        let fetch_err = |reason: String| AssetError::Fetch {
            reference: reference.to_string(),
            reason,
        };

        tracing::debug!(url = %reference, "fetching remote asset");
        let response = self
            .client
            .get(reference)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound {
                reference: reference.to_string(),
            });
        }
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        Ok(FetchedAsset {
            bytes: bytes.to_vec(),
            mime,
        })
    }
}

/// Dispatches each reference to the first fetcher that supports it.
#[derive(Clone, Default)]
pub struct CompositeFetcher {
    fetchers: Vec<Arc<dyn AssetFetcher>>,
}

impl CompositeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    /// Local files, plus HTTP when the `http` feature is on.
    pub fn standard(base_dir: Option<PathBuf>) -> Self {
        let local = match base_dir {
            Some(dir) => LocalAssetFetcher::with_base_dir(dir),
            None => LocalAssetFetcher::new(),
        };
        let composite = Self::new().with(Arc::new(local));
        #[cfg(feature = "http")]
        let composite = composite.with(Arc::new(HttpAssetFetcher::new()));
        composite
    }
}

#[async_trait]
impl AssetFetcher for CompositeFetcher {
    fn supports(&self, reference: &str) -> bool {
        self.fetchers.iter().any(|f| f.supports(reference))
    }

    async fn fetch(&self, reference: &str) -> Result<FetchedAsset, AssetError> {
        match self.fetchers.iter().find(|f| f.supports(reference)) {
            Some(fetcher) => fetcher.fetch(reference).await,
            None => Err(AssetError::Unsupported {
                reference: reference.to_string(),
            }),
        }
    }
}

/// MIME type from magic bytes, then from the file extension.
pub fn sniff_mime(bytes: &[u8], reference: &str) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if bytes.starts_with(b"BM") {
        return "image/bmp";
    }

    let ext = reference
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

static IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img src="([^"]*)""#).expect("static pattern"));

/// Attribute values come out of the renderer entity-escaped.
fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Every `<img>` source in the markup, in order, without duplicates.
pub fn image_references(markup: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in IMG_SRC.captures_iter(markup) {
        let src = caps[1].to_string();
        if !seen.contains(&src) {
            seen.push(src);
        }
    }
    seen
}

/// Markup with images inlined, plus what could not be inlined.
#[derive(Debug, Clone, PartialEq)]
pub struct InlinedMarkup {
    pub markup: String,
    pub inlined: usize,
    pub warnings: Vec<AssetWarning>,
}

/// Replace every non-embedded `<img>` source with a `data:` URI.
///
/// Each fetch is bounded by `timeout`. Failures keep the original
/// reference and add a warning; this function itself never fails.
pub async fn inline_images(
    markup: &str,
    fetcher: &dyn AssetFetcher,
    timeout: Duration,
) -> InlinedMarkup {
    let mut replacements: HashMap<String, String> = HashMap::new();
    let mut warnings = Vec::new();

    for src in image_references(markup) {
        if src.trim().is_empty() || is_embedded(&src) {
            continue;
        }
        let reference = unescape_attr(&src);
        let result = match tokio::time::timeout(timeout, fetcher.fetch(&reference)).await {
            Ok(result) => result,
            Err(_) => Err(AssetError::Timeout {
                reference: reference.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        };
        match result {
            Ok(asset) => {
                replacements.insert(src, asset.to_data_uri(&reference));
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "image not inlined, keeping original reference");
                warnings.push(AssetWarning::from(&e));
            }
        }
    }

    let inlined = replacements.len();
    let markup = IMG_SRC
        .replace_all(markup, |caps: &Captures<'_>| match replacements.get(&caps[1]) {
            Some(data_uri) => format!("<img src=\"{}\"", data_uri),
            None => caps[0].to_string(),
        })
        .into_owned();

    InlinedMarkup {
        markup,
        inlined,
        warnings,
    }
}
