//! Page representation

use super::events::ListenerRegistry;
use super::overlay::OverlayLayer;
use crate::dom::{Document, HtmlParser, LayoutEngine, LayoutMap, NodeId, Rect};
use crate::utils::Result;
use log::debug;
use std::time::Duration;
use tokio::time::Instant;

/// Mouse cursor shown over the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// A temporary outline applied by extraction
#[derive(Debug, Clone)]
struct Flash {
    node: NodeId,
    previous_style: Option<String>,
    deadline: Instant,
}

/// A loaded page: document, geometry and the interactive state drawn on it
#[derive(Debug)]
pub struct Page {
    /// The page URL
    url: String,
    /// The DOM document
    document: Document,
    layout: LayoutMap,
    overlays: OverlayLayer,
    listeners: ListenerRegistry,
    cursor: Cursor,
    flashes: Vec<Flash>,
}

impl Page {
    /// Create a page and lay it out at `viewport_width`
    pub fn new(url: impl Into<String>, document: Document, viewport_width: f32) -> Self {
        let mut engine = LayoutEngine::new();
        engine.set_viewport_width(viewport_width);
        let layout = engine.compute(&document);
        Self {
            url: url.into(),
            document,
            layout,
            overlays: OverlayLayer::new(),
            listeners: ListenerRegistry::new(),
            cursor: Cursor::default(),
            flashes: Vec::new(),
        }
    }

    /// Parse markup into a page
    pub fn from_html(url: impl Into<String>, html: &str, viewport_width: f32) -> Result<Self> {
        let document = HtmlParser::new().parse(html)?;
        Ok(Self::new(url, document, viewport_width))
    }

    /// Get the page URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the DOM document
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &LayoutMap {
        &self.layout
    }

    /// Border box of an element; `None` for hidden or detached nodes
    pub fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        self.layout.bounding_box(node)
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayLayer {
        &mut self.overlays
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Outline `nodes` until `duration` has passed.
    ///
    /// A node that is already flashing keeps its saved style and only gets a
    /// later deadline.
    pub fn flash(&mut self, nodes: &[NodeId], color: &str, duration: Duration) {
        let deadline = Instant::now() + duration;
        for &node in nodes {
            if let Some(existing) = self.flashes.iter_mut().find(|f| f.node == node) {
                existing.deadline = deadline;
                continue;
            }
            let previous_style = self.document.attribute(node, "style").map(str::to_string);
            let outline = format!("outline: 2px solid {color}");
            let style = match &previous_style {
                Some(style) if !style.trim().is_empty() => {
                    format!("{}; {outline}", style.trim().trim_end_matches(';'))
                }
                _ => outline,
            };
            self.document.set_attribute(node, "style", &style);
            self.flashes.push(Flash {
                node,
                previous_style,
                deadline,
            });
        }
    }

    /// Earliest pending flash deadline
    pub fn next_flash_deadline(&self) -> Option<Instant> {
        self.flashes.iter().map(|f| f.deadline).min()
    }

    pub fn flashing(&self) -> usize {
        self.flashes.len()
    }

    /// Restore the style of every flash due at `now`; returns how many ended
    pub fn revert_expired_flashes(&mut self, now: Instant) -> usize {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.flashes.drain(..).partition(|f| f.deadline <= now);
        self.flashes = pending;
        for flash in &due {
            self.restore_style(flash);
        }
        if !due.is_empty() {
            debug!("reverted {} flash highlights", due.len());
        }
        due.len()
    }

    /// Restore every flashed style immediately
    pub fn revert_all_flashes(&mut self) {
        for flash in std::mem::take(&mut self.flashes) {
            self.restore_style(&flash);
        }
    }

    fn restore_style(&mut self, flash: &Flash) {
        match &flash.previous_style {
            Some(style) => self.document.set_attribute(flash.node, "style", style),
            None => {
                self.document.remove_attribute(flash.node, "style");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::XPath;

    fn page(html: &str) -> Page {
        Page::from_html("https://example.com/", html, 800.0).unwrap()
    }

    #[test]
    fn test_page_layout_uses_viewport() {
        let page = page("<div>x</div>");
        let body = page.document().body().unwrap();
        assert_eq!(page.bounding_box(body).unwrap().width, 800.0);
        assert_eq!(page.url(), "https://example.com/");
    }

    #[test]
    fn test_deeply_nested_page_loads() {
        let depth = 20_000;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let page = page(&html);
        let innermost = page.document().elements().last().unwrap();
        assert!(page.bounding_box(innermost).is_some());
        assert_eq!(page.document().text_content(innermost), "deep");
    }

    #[test]
    fn test_flash_and_revert() {
        let mut page = page(r#"<p style="color: red;">a</p><p>b</p>"#);
        let nodes = XPath::parse("//p").unwrap().evaluate(page.document(), page.document().root());
        page.flash(&nodes, "orange", Duration::from_millis(50));
        assert_eq!(page.flashing(), 2);
        assert_eq!(
            page.document().attribute(nodes[0], "style"),
            Some("color: red; outline: 2px solid orange")
        );
        assert_eq!(
            page.document().attribute(nodes[1], "style"),
            Some("outline: 2px solid orange")
        );

        assert_eq!(page.revert_expired_flashes(Instant::now()), 0);
        let later = Instant::now() + Duration::from_millis(100);
        assert_eq!(page.revert_expired_flashes(later), 2);
        assert_eq!(page.document().attribute(nodes[0], "style"), Some("color: red;"));
        assert_eq!(page.document().attribute(nodes[1], "style"), None);
        assert!(page.next_flash_deadline().is_none());
    }

    #[test]
    fn test_reflash_keeps_original_style() {
        let mut page = page("<p>a</p>");
        let p = XPath::parse("//p").unwrap().first(page.document(), page.document().root()).unwrap();
        page.flash(&[p], "orange", Duration::from_secs(1));
        page.flash(&[p], "orange", Duration::from_secs(2));
        assert_eq!(page.flashing(), 1);
        page.revert_all_flashes();
        assert_eq!(page.document().attribute(p, "style"), None);
    }
}
