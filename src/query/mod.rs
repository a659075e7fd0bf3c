//! Node lookup: the XPath subset paths are written in, and CSS selectors

pub mod css;
pub mod xpath;

pub use css::{SelectorList, query_selector, query_selector_all};
pub use xpath::{XPath, resolve_first};
