//! Ancestor walk shared by every path function
//!
//! Full XPaths, CSS paths and relative patterns are all "one segment per
//! element from a boundary down to a node". They differ only in where the walk
//! stops and how a single step is spelled, so both are parameters here.

use crate::dom::{Document, NodeId};

/// Spelling of a single path step
pub trait StepFormat {
    fn segment(&self, document: &Document, node: NodeId) -> String;
}

/// `tag` or `tag[n]`, n counted among same-tag siblings (XPath position)
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedStep;

impl StepFormat for IndexedStep {
    fn segment(&self, document: &Document, node: NodeId) -> String {
        let tag = document.tag_name(node).unwrap_or_default();
        match document.same_tag_position(node) {
            Some((index, count)) if count > 1 => format!("{tag}[{index}]"),
            _ => tag.to_string(),
        }
    }
}

/// `tag` or `tag:nth-child(n)` when the parent has several same-tag children
#[derive(Debug, Clone, Copy, Default)]
pub struct NthChildStep;

impl StepFormat for NthChildStep {
    fn segment(&self, document: &Document, node: NodeId) -> String {
        let tag = document.tag_name(node).unwrap_or_default();
        let ambiguous = document
            .same_tag_position(node)
            .is_some_and(|(_, count)| count > 1);
        match document.element_index(node) {
            Some(index) if ambiguous => format!("{tag}:nth-child({index})"),
            _ => tag.to_string(),
        }
    }
}

/// Where a walk stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The document node; yields absolute paths
    Document,
    /// `<body>` (included as the literal `body`), or the document node for
    /// elements outside the body
    Body,
    /// A specific ancestor, excluded from the result
    Ancestor(NodeId),
}

/// Segments from just below `boundary` down to `node`, outermost first.
///
/// Returns `None` when the boundary is never reached, e.g. for a detached
/// node or an `Ancestor` that does not contain `node`.
pub fn ancestor_walk(
    document: &Document,
    node: NodeId,
    boundary: Boundary,
    format: &impl StepFormat,
) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = node;

    loop {
        match boundary {
            Boundary::Ancestor(stop) if current == stop => break,
            Boundary::Document | Boundary::Body if current == document.root() => break,
            Boundary::Body if document.tag_name(current) == Some("body") => {
                segments.push("body".to_string());
                break;
            }
            _ => {}
        }
        if !document.is_element(current) {
            return None;
        }
        segments.push(format.segment(document, current));
        current = document.parent(current)?;
    }

    segments.reverse();
    Some(segments)
}
