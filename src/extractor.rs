//! Re-resolve stored selectors against a live page

use crate::config::TrawlConfig;
use crate::dom::{Document, NodeId};
use crate::engine::Page;
use crate::matcher::find_matches;
use crate::model::{ExtractionRecord, FieldValue, SelectorSpec};
use crate::query::{query_selector, resolve_first};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Turns named selector specs into an [`ExtractionRecord`]
pub struct Extractor<'a> {
    config: &'a TrawlConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a TrawlConfig) -> Self {
        Self { config }
    }

    /// Extract every key. Keys that fail to resolve are left out (single)
    /// or come back empty (list); extraction itself never fails.
    ///
    /// List matches are outlined on the page for the configured flash
    /// duration.
    pub fn extract(
        &self,
        page: &mut Page,
        selectors: &BTreeMap<String, SelectorSpec>,
    ) -> ExtractionRecord {
        let mut data = BTreeMap::new();
        let mut flashed = Vec::new();

        for (key, spec) in selectors {
            match spec {
                SelectorSpec::Single {
                    full_xpath,
                    specific_xpath,
                    css_selector,
                } => {
                    let found = resolve_single(
                        page.document(),
                        full_xpath,
                        specific_xpath.as_deref(),
                        css_selector.as_deref(),
                    );
                    match found {
                        Some(node) => {
                            let text = page.document().text_content(node).trim().to_string();
                            data.insert(key.clone(), FieldValue::Text(text));
                        }
                        None => debug!("{key}: no selector resolved"),
                    }
                }
                SelectorSpec::List {
                    root_full_xpath,
                    relative_xpath,
                } => {
                    let nodes = self.resolve_list(
                        page.document(),
                        key,
                        root_full_xpath,
                        relative_xpath.as_deref(),
                    );
                    let texts = nodes
                        .iter()
                        .map(|n| page.document().text_content(*n).trim().to_string())
                        .collect();
                    flashed.extend(nodes);
                    data.insert(key.clone(), FieldValue::List(texts));
                }
            }
        }

        if !flashed.is_empty() {
            page.flash(
                &flashed,
                &self.config.colors.flash,
                Duration::from_millis(self.config.flash_duration_ms),
            );
        }
        info!("extracted {} of {} keys from {}", data.len(), selectors.len(), page.url());

        ExtractionRecord {
            url: page.url().to_string(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            data,
        }
    }

    fn resolve_list(
        &self,
        document: &Document,
        key: &str,
        root_xpath: &str,
        relative_xpath: Option<&str>,
    ) -> Vec<NodeId> {
        let root = match resolve_first(document, root_xpath) {
            Ok(Some(root)) => root,
            Ok(None) => {
                debug!("{key}: list root {root_xpath:?} not found");
                return Vec::new();
            }
            Err(e) => {
                warn!("{key}: list root {root_xpath:?}: {e}");
                return Vec::new();
            }
        };
        let Some(pattern) = relative_xpath.filter(|p| !p.trim().is_empty()) else {
            return Vec::new();
        };
        let outcome = find_matches(document, pattern, root, self.config.fallback_depth);
        debug!("{key}: {} matches ({:?})", outcome.len(), outcome.phase);
        outcome.nodes
    }
}

/// First of full XPath, specific XPath, CSS selector that finds a node
fn resolve_single(
    document: &Document,
    full_xpath: &str,
    specific_xpath: Option<&str>,
    css_selector: Option<&str>,
) -> Option<NodeId> {
    let xpaths = std::iter::once(full_xpath).chain(specific_xpath);
    for expr in xpaths.filter(|e| !e.trim().is_empty()) {
        match resolve_first(document, expr) {
            Ok(Some(node)) => return Some(node),
            Ok(None) => debug!("xpath {expr:?} matched nothing"),
            Err(e) => warn!("{e}"),
        }
    }
    let selector = css_selector.filter(|s| !s.trim().is_empty())?;
    match query_selector(document, selector) {
        Ok(node) => node,
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}
