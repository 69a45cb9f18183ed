//! Typed errors for the notifier.
//!
//! Each stage of a run has its own error type so the binary can decide what is
//! fatal: configuration, extraction and persistence failures end the run,
//! notification failures are logged per post and never abort the batch.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or invalid settings. Always fatal, raised before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "config file not found: {}\nCopy config.example.json to config.json and fill in your values.",
        .path.display()
    )]
    NotFound { path: PathBuf },

    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// The source could not be turned into posts. Fatal for the run.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("feed could not be parsed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),

    #[error("Apify scrape failed: {0}")]
    Apify(#[from] apify_client::ApifyError),

    #[error("no posts found at {source_name}")]
    Empty { source_name: String },
}

/// A single notification could not be delivered. Logged, never fatal.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("ntfy error: {0}")]
    Ntfy(#[from] ntfy::NtfyError),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Reading or writing the seen-set failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access seen-set {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seen-set {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that can end a run early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RunError>;
