use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Why a cached page produced no output document.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The fixed content-container selector matched nothing; the page does
    /// not follow the article template and is skipped whole.
    #[error("content container not found")]
    MissingContent,
    #[error("decode error: {0}")]
    Decode(#[from] crate::decode::DecodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("sitemap error: {0}")]
    Sitemap(#[from] crate::sitemap::SitemapError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("manifest serialization: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Counts and per-article records for one migration run; serialized to the
/// run manifest next to the index document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub pages_discovered: usize,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub articles_written: usize,
    pub pages_skipped: usize,
    pub articles: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub path: String,
}
