//! Document model for trawl
//!
//! HTML parsing into an arena DOM and a minimal layout pass that gives every
//! rendered element a bounding box.

pub mod html;
mod layout;
mod node;

pub use html::HtmlParser;
pub use layout::{DisplayType, FontMetrics, LayoutEngine, LayoutMap, Rect};
pub use node::{Ancestors, Attribute, Descendants, Document, ElementData, NodeId, NodeKind};
