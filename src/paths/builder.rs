//! Selector and XPath synthesis for a single element

use super::walk::{Boundary, IndexedStep, NthChildStep, ancestor_walk};
use crate::config::TrawlConfig;
use crate::dom::{Document, NodeId};
use crate::model::{AttributeDescriptor, NodeDescriptor};
use crate::query::query_selector_all;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static SIMPLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"));
static SIMPLE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("static regex"));

/// Absolute `/html/...` path of an element, one `tag[n]` step per level.
///
/// Returns an empty string for nodes that are not attached elements.
pub fn full_xpath(document: &Document, node: NodeId) -> String {
    match ancestor_walk(document, node, Boundary::Document, &IndexedStep) {
        Some(segments) if !segments.is_empty() => format!("/{}", segments.join("/")),
        _ => {
            debug!("no full xpath for detached node {node:?}");
            String::new()
        }
    }
}

/// Builds selectors for elements of one document
pub struct PathBuilder<'a> {
    document: &'a Document,
    config: &'a TrawlConfig,
}

impl<'a> PathBuilder<'a> {
    pub fn new(document: &'a Document, config: &'a TrawlConfig) -> Self {
        Self { document, config }
    }

    /// Shortest selector the heuristics can find: `#id`, `.class`,
    /// `tag.class`, or an `nth-child` chain from `body`.
    pub fn css_selector(&self, node: NodeId) -> String {
        let Some(tag) = self.document.tag_name(node) else {
            return String::new();
        };
        if let Some(id) = self.simple_id(node) {
            return format!("#{id}");
        }

        let counted = self.counted_classes(node);
        if let Some((class, _)) = counted.iter().find(|(_, count)| *count == 1) {
            return format!(".{class}");
        }
        if let Some((class, _)) = counted
            .iter()
            .find(|(_, count)| *count < self.config.rare_class_limit)
        {
            return format!("{tag}.{class}");
        }

        ancestor_walk(self.document, node, Boundary::Body, &NthChildStep)
            .map(|segments| segments.join(" > "))
            .unwrap_or_default()
    }

    /// `//tag[@id="…"]`, `//tag[contains(@class,"…")]`, or the full path
    pub fn specific_xpath(&self, node: NodeId) -> String {
        let Some(tag) = self.document.tag_name(node) else {
            return String::new();
        };
        if let Some(id) = self.simple_id(node) {
            return format!("//{tag}[@id=\"{id}\"]");
        }
        let rare = self
            .counted_classes(node)
            .into_iter()
            .find(|(_, count)| *count < self.config.rare_class_limit);
        match rare {
            Some((class, _)) => format!("//{tag}[contains(@class,\"{class}\")]"),
            None => self.full_xpath(node),
        }
    }

    pub fn full_xpath(&self, node: NodeId) -> String {
        full_xpath(self.document, node)
    }

    /// Full descriptor for the UI
    pub fn describe(&self, node: NodeId) -> Option<NodeDescriptor> {
        let element = self.document.element(node)?;

        let mut classes: Vec<String> = Vec::new();
        for class in element.classes() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }

        Some(NodeDescriptor {
            tag_name: element.tag_name.clone(),
            id: element.id().map(str::to_string),
            classes,
            attributes: element
                .attributes
                .iter()
                .map(|a| AttributeDescriptor {
                    name: a.name.clone(),
                    value: a.value.clone(),
                })
                .collect(),
            text_content: self.document.text_content(node).trim().to_string(),
            css_selector: self.css_selector(node),
            specific_xpath: self.specific_xpath(node),
            full_xpath: self.full_xpath(node),
        })
    }

    fn simple_id(&self, node: NodeId) -> Option<&'a str> {
        self.document
            .element(node)?
            .id()
            .filter(|id| id.len() < self.config.id_max_len && SIMPLE_ID.is_match(id))
    }

    /// Simple classes of `node` with their document-wide element counts
    fn counted_classes(&self, node: NodeId) -> Vec<(&'a str, usize)> {
        let Some(element) = self.document.element(node) else {
            return Vec::new();
        };
        element
            .classes()
            .into_iter()
            .filter(|c| c.len() < self.config.class_max_len && SIMPLE_CLASS.is_match(c))
            .filter_map(|class| match query_selector_all(self.document, &format!(".{class}")) {
                Ok(nodes) => Some((class, nodes.len())),
                Err(e) => {
                    debug!("skipping class {class:?}: {e}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;
    use crate::query::{XPath, query_selector};
    use pretty_assertions::assert_eq;

    fn parse(html: &str) -> Document {
        HtmlParser::new().parse(html).unwrap()
    }

    fn find(doc: &Document, xpath: &str) -> NodeId {
        XPath::parse(xpath).unwrap().first(doc, doc.root()).unwrap()
    }

    #[test]
    fn test_full_xpath_of_fixed_nodes() {
        let doc = parse("<p>x</p>");
        let html = doc.document_element().unwrap();
        assert_eq!(full_xpath(&doc, html), "/html");
        assert_eq!(full_xpath(&doc, doc.body().unwrap()), "/html/body");
    }

    #[test]
    fn test_full_xpath_indexes_same_tag_siblings_only() {
        let doc = parse("<div><span>a</span><p>b</p><p>c</p></div>");
        let span = find(&doc, "//span");
        let second = find(&doc, "//p[2]");
        assert_eq!(full_xpath(&doc, span), "/html/body/div/span");
        assert_eq!(full_xpath(&doc, second), "/html/body/div/p[2]");
    }

    #[test]
    fn test_css_prefers_simple_id() {
        let doc = parse(r#"<div id="main" class="solo">x</div>"#);
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        let div = find(&doc, "//div");
        assert_eq!(builder.css_selector(div), "#main");
        assert_eq!(builder.specific_xpath(div), r#"//div[@id="main"]"#);
    }

    #[test]
    fn test_css_skips_long_or_complex_ids() {
        let doc = parse(r#"<div id="an-identifier-that-is-long" class="solo">x</div><p id="a:b">y</p>"#);
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        assert_eq!(builder.css_selector(find(&doc, "//div")), ".solo");
        assert_eq!(builder.css_selector(find(&doc, "//p")), "body > p");
    }

    #[test]
    fn test_css_rare_class_gets_tag_prefix() {
        let doc = parse(r#"<i class="tag">1</i><i class="tag">2</i><i class="tag">3</i>"#);
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        let first = find(&doc, "//i");
        assert_eq!(builder.css_selector(first), "i.tag");
        assert_eq!(
            builder.specific_xpath(first),
            r#"//i[contains(@class,"tag")]"#
        );
    }

    #[test]
    fn test_css_falls_back_to_nth_child_chain() {
        let html = "<ul>\
            <li class=\"row\">a</li><li class=\"row\">b</li><li class=\"row\">c</li>\
            <li class=\"row\">d</li><li class=\"row\">e</li></ul>";
        let doc = parse(html);
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        let third = find(&doc, "//li[3]");
        let selector = builder.css_selector(third);
        assert_eq!(selector, "body > ul > li:nth-child(3)");
        assert_eq!(query_selector(&doc, &selector).unwrap(), Some(third));
        assert_eq!(builder.specific_xpath(third), "/html/body/ul/li[3]");
    }

    #[test]
    fn test_nth_child_counts_all_element_siblings() {
        let doc = parse("<div><h2>t</h2><p>a</p><p>b</p></div>");
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        let second_p = find(&doc, "//p[2]");
        let selector = builder.css_selector(second_p);
        assert_eq!(selector, "body > div > p:nth-child(3)");
        assert_eq!(query_selector(&doc, &selector).unwrap(), Some(second_p));
    }

    #[test]
    fn test_describe_collects_attributes_in_order() {
        let doc = parse(r#"<a href="/x" class="btn btn primary" id="go">  Go  </a>"#);
        let config = TrawlConfig::default();
        let builder = PathBuilder::new(&doc, &config);
        let descriptor = builder.describe(find(&doc, "//a")).unwrap();
        assert_eq!(descriptor.tag_name, "a");
        assert_eq!(descriptor.id.as_deref(), Some("go"));
        assert_eq!(descriptor.classes, vec!["btn", "primary"]);
        let names: Vec<_> = descriptor.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["href", "class", "id"]);
        assert_eq!(descriptor.text_content, "Go");
        assert_eq!(descriptor.css_selector, "#go");
        assert_eq!(descriptor.full_xpath, "/html/body/a");
    }

    #[test]
    fn test_describe_rejects_text_nodes() {
        let doc = parse("<p>text</p>");
        let config = TrawlConfig::default();
        let p = find(&doc, "//p");
        let text = doc.children(p)[0];
        assert!(PathBuilder::new(&doc, &config).describe(text).is_none());
    }
}
