//! Layout engine for computing element bounding boxes
//!
//! A deliberately small block/inline flow: enough geometry for hit-testing
//! clicks against a locked element and for sizing highlight overlays.

use super::node::{Document, NodeId, NodeKind};
use std::collections::HashMap;

/// Rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if rectangle is empty
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether a point lies inside the rectangle, edges included
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Display type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayType {
    Block,
    Inline,
    InlineBlock,
    None,
}

/// Default font metrics for text layout
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Line height multiplier
    pub line_height: f32,
    /// Average character width (approximation)
    pub char_width: f32,
}

impl FontMetrics {
    fn line_px(&self) -> f32 {
        self.size * self.line_height
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            size: 16.0,
            line_height: 1.2,
            char_width: 8.0, // Approximate for monospace
        }
    }
}

/// Border boxes of every laid-out element
#[derive(Debug, Clone, Default)]
pub struct LayoutMap {
    boxes: HashMap<NodeId, Rect>,
}

impl LayoutMap {
    /// Bounding box of a node, if it was laid out
    pub fn bounding_box(&self, node: NodeId) -> Option<Rect> {
        self.boxes.get(&node).copied()
    }

    /// Number of laid-out nodes
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// An element whose children are still being placed
struct OpenBox {
    node: NodeId,
    display: DisplayType,
    slot: Rect,
    next_child: usize,
    cursor_y: f32,
    widest: f32,
}

impl OpenBox {
    fn place(&mut self, child: Rect) {
        self.cursor_y = child.bottom();
        self.widest = self.widest.max(child.width);
    }
}

enum Opened {
    Leaf(Rect),
    Open(OpenBox),
}

/// Layout engine for computing the layout tree
pub struct LayoutEngine {
    viewport_width: f32,
    font_metrics: FontMetrics,
}

impl LayoutEngine {
    /// Create a new layout engine
    pub fn new() -> Self {
        Self {
            viewport_width: 1920.0,
            font_metrics: FontMetrics::default(),
        }
    }

    /// Set viewport width
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Compute boxes for every rendered element of a document
    pub fn compute(&self, document: &Document) -> LayoutMap {
        let mut map = LayoutMap::default();
        let mut cursor_y = 0.0;
        for child in document.children(document.root()) {
            let slot = Rect::new(0.0, cursor_y, self.viewport_width, 0.0);
            let rect = self.layout_subtree(document, *child, slot, &mut map);
            cursor_y = rect.bottom();
        }
        map
    }

    /// Get display type for an element
    fn get_display_type(&self, tag_name: &str) -> DisplayType {
        match tag_name {
            // Inline elements
            "span" | "a" | "strong" | "em" | "b" | "i" | "u" | "code" | "small" | "sub" | "sup"
            | "label" | "abbr" | "cite" | "q" | "time" => DisplayType::Inline,
            // Inline-block elements
            "img" | "button" | "input" | "select" | "textarea" => DisplayType::InlineBlock,
            // Hidden elements
            "head" | "meta" | "title" | "link" | "style" | "script" | "noscript" | "template" => {
                DisplayType::None
            }
            // Default to block
            _ => DisplayType::Block,
        }
    }

    /// Lay out `node` and its subtree starting at `slot.x, slot.y` inside
    /// `slot.width`, with an explicit stack of open element boxes.
    /// Returns the node's border box (empty for hidden nodes).
    fn layout_subtree(
        &self,
        document: &Document,
        node: NodeId,
        slot: Rect,
        map: &mut LayoutMap,
    ) -> Rect {
        let mut stack = match self.open(document, node, slot) {
            Opened::Leaf(rect) => return rect,
            Opened::Open(frame) => vec![frame],
        };

        loop {
            let Some(frame) = stack.last_mut() else {
                return Rect::new(slot.x, slot.y, 0.0, 0.0);
            };
            let next = document.children(frame.node).get(frame.next_child).copied();
            if let Some(child) = next {
                frame.next_child += 1;
                let child_slot = Rect::new(frame.slot.x, frame.cursor_y, frame.slot.width, 0.0);
                match self.open(document, child, child_slot) {
                    Opened::Leaf(rect) => frame.place(rect),
                    Opened::Open(child_frame) => stack.push(child_frame),
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                return Rect::new(slot.x, slot.y, 0.0, 0.0);
            };
            let rect = self.close(done, map);
            match stack.last_mut() {
                Some(parent) => parent.place(rect),
                None => return rect,
            }
        }
    }

    /// Start a node: text and hidden nodes are sized at once, rendered
    /// elements become an open box whose children still need placing.
    fn open(&self, document: &Document, node: NodeId, slot: Rect) -> Opened {
        match document.kind(node) {
            Some(NodeKind::Text(text)) if !text.trim().is_empty() => {
                let text = text.trim();
                let width = (text.chars().count() as f32 * self.font_metrics.char_width)
                    .min(slot.width.max(self.font_metrics.char_width));
                let lines = self.calculate_text_lines(text, slot.width);
                Opened::Leaf(Rect::new(
                    slot.x,
                    slot.y,
                    width,
                    lines as f32 * self.font_metrics.line_px(),
                ))
            }
            Some(NodeKind::Element(data)) => match self.get_display_type(&data.tag_name) {
                DisplayType::None => Opened::Leaf(Rect::new(slot.x, slot.y, 0.0, 0.0)),
                display => Opened::Open(OpenBox {
                    node,
                    display,
                    slot,
                    next_child: 0,
                    cursor_y: slot.y,
                    widest: 0.0,
                }),
            },
            // Whitespace-only text, comments
            _ => Opened::Leaf(Rect::new(slot.x, slot.y, 0.0, 0.0)),
        }
    }

    /// Finish a box once all of its children are placed
    fn close(&self, open: OpenBox, map: &mut LayoutMap) -> Rect {
        let mut height = open.cursor_y - open.slot.y;
        if open.display == DisplayType::InlineBlock && height == 0.0 {
            height = self.font_metrics.line_px();
        }
        let width = match open.display {
            DisplayType::Block => open.slot.width,
            _ => open.widest.max(self.font_metrics.char_width),
        };
        let rect = Rect::new(open.slot.x, open.slot.y, width, height);
        map.boxes.insert(open.node, rect);
        rect
    }

    /// Calculate number of text lines
    fn calculate_text_lines(&self, text: &str, available_width: f32) -> usize {
        if available_width <= 0.0 {
            return 1;
        }
        let chars_per_line = (available_width / self.font_metrics.char_width).floor() as usize;
        if chars_per_line == 0 {
            return 1;
        }
        text.chars().count().div_ceil(chars_per_line).max(1)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;

    #[test]
    fn test_rect_contains_point() {
        let rect = Rect::new(10.0, 10.0, 100.0, 20.0);
        assert!(rect.contains_point(10.0, 10.0));
        assert!(rect.contains_point(60.0, 25.0));
        assert!(!rect.contains_point(60.0, 40.0));
        assert!(!rect.contains_point(5.0, 15.0));
    }

    #[test]
    fn test_display_type_detection() {
        let engine = LayoutEngine::new();
        assert_eq!(engine.get_display_type("div"), DisplayType::Block);
        assert_eq!(engine.get_display_type("span"), DisplayType::Inline);
        assert_eq!(engine.get_display_type("img"), DisplayType::InlineBlock);
        assert_eq!(engine.get_display_type("script"), DisplayType::None);
    }

    #[test]
    fn test_text_lines_calculation() {
        let engine = LayoutEngine::new();
        // With default char_width of 8.0, 100px fits 12 chars
        assert_eq!(engine.calculate_text_lines("Hello", 100.0), 1);
        assert_eq!(engine.calculate_text_lines("Hello World Test", 100.0), 2);
    }

    #[test]
    fn test_blocks_stack_vertically() {
        let doc = HtmlParser::new()
            .parse("<div>first</div><div>second</div>")
            .unwrap();
        let layout = LayoutEngine::new().compute(&doc);
        let body = doc.body().unwrap();
        let divs: Vec<_> = doc.element_children(body).collect();
        let first = layout.bounding_box(divs[0]).unwrap();
        let second = layout.bounding_box(divs[1]).unwrap();
        assert_eq!(first.width, 1920.0);
        assert!(first.height > 0.0);
        assert_eq!(second.y, first.bottom());
    }

    #[test]
    fn test_parent_box_encloses_children() {
        let doc = HtmlParser::new()
            .parse("<ul><li><a>A</a></li><li><a>B</a></li></ul>")
            .unwrap();
        let layout = LayoutEngine::new().compute(&doc);
        let ul = doc.first_element_child(doc.body().unwrap()).unwrap();
        let ul_box = layout.bounding_box(ul).unwrap();
        for li in doc.element_children(ul) {
            let li_box = layout.bounding_box(li).unwrap();
            assert!(ul_box.contains_point(li_box.x, li_box.y));
            assert!(ul_box.contains_point(li_box.x, li_box.bottom()));
        }
    }

    #[test]
    fn test_whitespace_text_takes_no_space() {
        let spaced = HtmlParser::new()
            .parse("<div>\n  <p>x</p>\n  <p>y</p>\n</div>")
            .unwrap();
        let tight = HtmlParser::new().parse("<div><p>x</p><p>y</p></div>").unwrap();
        let engine = LayoutEngine::new();
        let height = |doc: &Document| {
            let div = doc.first_element_child(doc.body().unwrap()).unwrap();
            engine.compute(doc).bounding_box(div).unwrap().height
        };
        assert_eq!(height(&spaced), height(&tight));
    }

    #[test]
    fn test_deep_nesting_lays_out_every_level() {
        let depth = 20_000;
        let html = format!("{}leaf{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = HtmlParser::new().parse(&html).unwrap();
        let layout = LayoutEngine::new().compute(&doc);

        let innermost = doc.elements().last().unwrap();
        let leaf_box = layout.bounding_box(innermost).unwrap();
        let outer = doc.first_element_child(doc.body().unwrap()).unwrap();
        let outer_box = layout.bounding_box(outer).unwrap();
        assert_eq!(leaf_box.height, outer_box.height);
        assert!(leaf_box.height > 0.0);
        assert!(layout.len() > depth);
    }

    #[test]
    fn test_hidden_elements_have_no_box() {
        let doc = HtmlParser::new()
            .parse("<head><title>t</title></head><body><p>x</p></body>")
            .unwrap();
        let layout = LayoutEngine::new().compute(&doc);
        let html = doc.document_element().unwrap();
        let head = doc.first_element_child(html).unwrap();
        assert!(layout.bounding_box(head).is_none());
    }
}
