//! Pages and how they are loaded
//!
//! A [`Page`] couples the parsed document with its layout and with the
//! interactive state drawn over it (overlays, captured listeners, cursor,
//! pending flash outlines). [`PageLoader`] turns a source string into one:
//! 1. Classify the source as an HTTP(S) URL, a `file://` URL or a path
//! 2. Fetch the markup
//! 3. Parse it and compute layout

pub mod events;
pub mod overlay;
mod page;

pub use events::{EventData, EventTarget, EventType, InputEvent, ListenerId, ListenerRegistry};
pub use overlay::{Overlay, OverlayId, OverlayKind, OverlayLayer};
pub use page::{Cursor, Page};

use crate::config::TrawlConfig;
use crate::utils::{Result, TrawlError};
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Where page markup comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    File(PathBuf),
}

impl Source {
    /// Classify a URL or filesystem path
    pub fn parse(source: &str) -> Result<Self> {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Http(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::File)
                .map_err(|_| TrawlError::Config(format!("not a local file url: {source}"))),
            Ok(url) if url.scheme().len() > 1 => Err(TrawlError::Config(format!(
                "unsupported scheme {:?} in {source}",
                url.scheme()
            ))),
            // Plain paths, including Windows drive letters parsed as a scheme
            _ => Ok(Self::File(PathBuf::from(source))),
        }
    }

    /// URL recorded on the page
    pub fn url(&self) -> String {
        match self {
            Self::Http(url) => url.to_string(),
            Self::File(path) => std::path::absolute(path)
                .ok()
                .and_then(|p| Url::from_file_path(p).ok())
                .map(|u| u.to_string())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// Loads pages over HTTP or from disk
pub struct PageLoader {
    client: reqwest::Client,
    viewport_width: f32,
}

impl PageLoader {
    /// Create a loader using the configured user agent and viewport
    pub fn new(config: &TrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            viewport_width: config.viewport_width,
        })
    }

    /// Fetch and parse a page
    pub async fn load(&self, source: &str) -> Result<Page> {
        let source = Source::parse(source)?;
        let html = match &source {
            Source::Http(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?;
                response.text().await?
            }
            Source::File(path) => tokio::fs::read_to_string(path).await?,
        };
        let url = source.url();
        info!("loaded {} bytes from {url}", html.len());
        Page::from_html(url, &html, self.viewport_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_classification() {
        assert!(matches!(
            Source::parse("https://example.com/a").unwrap(),
            Source::Http(_)
        ));
        assert_eq!(
            Source::parse("pages/list.html").unwrap(),
            Source::File(PathBuf::from("pages/list.html"))
        );
        assert_eq!(
            Source::parse("file:///tmp/list.html").unwrap(),
            Source::File(PathBuf::from("/tmp/list.html"))
        );
        assert!(Source::parse("ftp://example.com/x").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("trawl-loader-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("page.html");
        tokio::fs::write(&path, "<ul><li>A</li></ul>").await.unwrap();

        let loader = PageLoader::new(&TrawlConfig::default()).unwrap();
        let page = loader.load(path.to_str().unwrap()).await.unwrap();
        assert!(page.url().starts_with("file://"));
        assert_eq!(page.document().text_content(page.document().root()), "A");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let loader = PageLoader::new(&TrawlConfig::default()).unwrap();
        let err = loader.load("/definitely/not/here.html").await.unwrap_err();
        assert!(matches!(err, TrawlError::Io(_)));
    }
}
