//! Error types for trawl

use thiserror::Error;

/// Main error type for trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    /// An XPath expression could not be parsed
    #[error("invalid XPath `{expr}`: {reason}")]
    InvalidXPath { expr: String, reason: String },

    /// A CSS selector could not be parsed
    #[error("invalid CSS selector `{0}`")]
    InvalidSelector(String),

    /// A path or selector resolved to no node
    #[error("no node matches `{0}`")]
    NodeNotFound(String),

    /// List selection was requested without a root path
    #[error("list selection needs a root path")]
    EmptyRootPath,

    /// Fetching a page failed
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A page source was not a usable URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The message channel failed
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Transport outcomes of the agent message channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Nobody is listening on the other end
    #[error("no receiver on the other end of the channel")]
    Disconnected,
    /// The request was accepted but its reply was dropped
    #[error("request was dropped without a response")]
    NoResponse,
}

impl TrawlError {
    /// Build an XPath error
    pub fn xpath(expr: &str, reason: impl Into<String>) -> Self {
        Self::InvalidXPath {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;
