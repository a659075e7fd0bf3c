//! Turn one concrete element path into a pattern for its siblings

use super::walk::{Boundary, IndexedStep, ancestor_walk};
use crate::dom::{Document, NodeId};
use regex::Regex;
use std::sync::LazyLock;

static POSITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").expect("static regex"));

/// Tag path from `root` (exclusive) down to `node` with positions removed,
/// e.g. `li/div/h3/a`. Empty when `node` is `root` or lies outside it.
pub fn relative_path(document: &Document, node: NodeId, root: NodeId) -> String {
    if node == root || !document.contains(root, node) {
        return String::new();
    }
    ancestor_walk(document, node, Boundary::Ancestor(root), &IndexedStep)
        .map(|segments| strip_positions(&segments.join("/")))
        .unwrap_or_default()
}

/// Remove every `[n]` step qualifier
pub fn strip_positions(path: &str) -> String {
    POSITION.replace_all(path, "").into_owned()
}
