//! Apply a relative tag pattern under a root element

use crate::dom::{Document, NodeId};
use crate::paths::strip_positions;
use crate::query::XPath;
use log::{debug, warn};

/// Which phase produced a match set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Exact,
    Fallback,
    NoMatch,
}

/// Matched elements in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub nodes: Vec<NodeId>,
    pub phase: MatchPhase,
}

impl MatchOutcome {
    fn none() -> Self {
        Self {
            nodes: Vec::new(),
            phase: MatchPhase::NoMatch,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Elements under `root` that follow `pattern`.
///
/// The pattern is first evaluated as `./pattern`. Only when that finds
/// nothing, every descendant tagged like the last segment is kept if its
/// nearest `fallback_depth` ancestors carry the preceding segments.
pub fn find_matches(
    document: &Document,
    pattern: &str,
    root: NodeId,
    fallback_depth: usize,
) -> MatchOutcome {
    let pattern = pattern.trim().trim_start_matches("./");
    if pattern.is_empty() {
        return MatchOutcome::none();
    }

    let exact = match XPath::parse(&format!("./{pattern}")) {
        Ok(xpath) => xpath.evaluate(document, root),
        Err(e) => {
            warn!("pattern {pattern:?} is not a valid path: {e}");
            Vec::new()
        }
    };
    if !exact.is_empty() {
        return MatchOutcome {
            nodes: exact,
            phase: MatchPhase::Exact,
        };
    }

    let fallback = fallback_matches(document, pattern, root, fallback_depth);
    debug!(
        "pattern {pattern:?}: no exact match, fallback kept {}",
        fallback.len()
    );
    if fallback.is_empty() {
        MatchOutcome::none()
    } else {
        MatchOutcome {
            nodes: fallback,
            phase: MatchPhase::Fallback,
        }
    }
}

fn fallback_matches(
    document: &Document,
    pattern: &str,
    root: NodeId,
    depth: usize,
) -> Vec<NodeId> {
    let stripped = strip_positions(pattern);
    let segments: Vec<String> = stripped
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    let Some(last) = segments.last() else {
        return Vec::new();
    };
    let levels = depth.min(segments.len() - 1);

    document
        .descendant_elements(root)
        .filter(|candidate| tag_matches(document, *candidate, last))
        .filter(|candidate| {
            let mut current = *candidate;
            for level in 1..=levels {
                match document.parent_element(current) {
                    Some(parent)
                        if parent != root
                            && tag_matches(document, parent, &segments[segments.len() - 1 - level]) =>
                    {
                        current = parent;
                    }
                    _ => return false,
                }
            }
            true
        })
        .collect()
}

fn tag_matches(document: &Document, node: NodeId, segment: &str) -> bool {
    segment == "*" || document.tag_name(node) == Some(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;
    use pretty_assertions::assert_eq;

    fn texts(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|n| doc.text_content(*n)).collect()
    }

    fn root_of(doc: &Document, xpath: &str) -> NodeId {
        XPath::parse(xpath).unwrap().first(doc, doc.root()).unwrap()
    }

    #[test]
    fn test_exact_phase_in_document_order() {
        let doc = HtmlParser::new()
            .parse("<ul><li><a>A</a></li><li><a>B</a></li><li><a>C</a></li></ul>")
            .unwrap();
        let ul = root_of(&doc, "//ul");
        let outcome = find_matches(&doc, "li/a", ul, 3);
        assert_eq!(outcome.phase, MatchPhase::Exact);
        assert_eq!(texts(&doc, &outcome.nodes), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_pattern_has_no_fallback() {
        let doc = HtmlParser::new().parse("<ul><li>x</li></ul>").unwrap();
        let ul = root_of(&doc, "//ul");
        let outcome = find_matches(&doc, "", ul, 3);
        assert_eq!(outcome, MatchOutcome::none());
    }

    #[test]
    fn test_fallback_tolerates_extra_wrappers_above_checked_levels() {
        // Pattern built on a card with an extra wrapper; sibling cards lack it.
        let html = "<div id=\"r\">\
            <section><article><div><h3><a>one</a></h3></div></article></section>\
            <article><div><h3><a>two</a></h3></div></article>\
            </div>";
        let doc = HtmlParser::new().parse(html).unwrap();
        let root = root_of(&doc, "//div[@id=\"r\"]");
        let outcome = find_matches(&doc, "section/article/div/h3/a", root, 3);
        assert_eq!(outcome.phase, MatchPhase::Exact);
        assert_eq!(texts(&doc, &outcome.nodes), vec!["one"]);

        let outcome = find_matches(&doc, "main/article/div/h3/a", root, 3);
        assert_eq!(outcome.phase, MatchPhase::Fallback);
        assert_eq!(texts(&doc, &outcome.nodes), vec!["one", "two"]);
    }

    #[test]
    fn test_fallback_discards_on_mismatch_or_root() {
        let html = "<div id=\"r\"><p><a>in p</a></p><span><a>in span</a></span><a>bare</a></div>";
        let doc = HtmlParser::new().parse(html).unwrap();
        let root = root_of(&doc, "//div[@id=\"r\"]");
        let outcome = find_matches(&doc, "section/p/a", root, 3);
        // `section` would need to be the root's child wrapper; `p` is directly under root
        assert_eq!(outcome, MatchOutcome::none());

        let outcome = find_matches(&doc, "x/span/a", root, 1);
        assert_eq!(outcome.phase, MatchPhase::Fallback);
        assert_eq!(texts(&doc, &outcome.nodes), vec!["in span"]);
    }

    #[test]
    fn test_unparsable_pattern_recovers_through_fallback() {
        let doc = HtmlParser::new().parse("<ul><li><b>x</b></li></ul>").unwrap();
        let ul = root_of(&doc, "//ul");
        // Only the nearest ancestor is checked, so the broken first segment is never compared.
        let outcome = find_matches(&doc, "x[/li/b", ul, 1);
        assert_eq!(outcome.phase, MatchPhase::Fallback);
        assert_eq!(texts(&doc, &outcome.nodes), vec!["x"]);
    }

    #[test]
    fn test_unparsable_segment_within_depth_has_no_match() {
        let doc = HtmlParser::new().parse("<ul><li><b>x</b></li></ul>").unwrap();
        let ul = root_of(&doc, "//ul");
        let outcome = find_matches(&doc, "li[/b", ul, 3);
        assert_eq!(outcome.phase, MatchPhase::NoMatch);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let doc = HtmlParser::new()
            .parse("<ol><li><i>1</i></li><li><i>2</i></li></ol>")
            .unwrap();
        let ol = root_of(&doc, "//ol");
        assert_eq!(find_matches(&doc, "li/i", ol, 3), find_matches(&doc, "li/i", ol, 3));
    }
}
