//! HTML5 parser implementation using html5ever

use super::node::{Attribute, Document, NodeId};
use crate::utils::Result;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// HTML5 parser using html5ever
pub struct HtmlParser {
    opts: ParseOpts,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self {
            opts: ParseOpts {
                tree_builder: TreeBuilderOpts {
                    drop_doctype: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Parse HTML content into a DOM document.
    ///
    /// html5ever always synthesizes `<html>`, `<head>` and `<body>`, so even an
    /// empty input yields a document with a body to anchor paths on.
    pub fn parse(&self, content: &str) -> Result<Document> {
        let dom = parse_document(RcDom::default(), self.opts.clone()).one(content);

        let mut document = Document::new();
        let root = document.root();
        // Iterative copy: deeply nested real-world markup must not overflow the stack.
        let mut pending: Vec<(Handle, NodeId)> = dom
            .document
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), root))
            .collect();

        while let Some((handle, parent)) = pending.pop() {
            let Some(id) = Self::convert_node(&mut document, &handle) else {
                continue;
            };
            document.append_child(parent, id);
            for child in handle.children.borrow().iter().rev() {
                pending.push((child.clone(), id));
            }
        }

        Ok(document)
    }

    fn convert_node(document: &mut Document, handle: &Handle) -> Option<NodeId> {
        match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| Attribute {
                        name: attr.name.local.to_string(),
                        value: attr.value.to_string(),
                    })
                    .collect();
                Some(document.create_element_with(name.local.to_string(), attributes))
            }
            NodeData::Text { contents } => Some(document.create_text(contents.borrow().to_string())),
            NodeData::Comment { contents } => Some(document.create_comment(contents.to_string())),
            NodeData::Document | NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {
                None
            }
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_html() {
        let parser = HtmlParser::new();
        let doc = parser.parse("").unwrap();
        assert!(doc.document_element().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_parse_simple_html() {
        let parser = HtmlParser::new();
        let doc = parser.parse("<html><body>Hello</body></html>").unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.text_content(body), "Hello");
    }

    #[test]
    fn test_parse_keeps_attribute_order() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse(r#"<div id="main" class="container" data-role="x">Content</div>"#)
            .unwrap();
        let div = doc.first_element_child(doc.body().unwrap()).unwrap();
        let names: Vec<_> = doc
            .element(div)
            .unwrap()
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "class", "data-role"]);
    }

    #[test]
    fn test_parse_nested_elements() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse(
                r#"
            <html>
                <head><title>Test</title></head>
                <body>
                    <div>
                        <p>Paragraph 1</p>
                        <p>Paragraph 2</p>
                    </div>
                </body>
            </html>
        "#,
            )
            .unwrap();
        let div = doc.first_element_child(doc.body().unwrap()).unwrap();
        assert_eq!(doc.element_children(div).count(), 2);
    }

    #[test]
    fn test_parse_keeps_whitespace_between_inline_elements() {
        let parser = HtmlParser::new();
        let doc = parser
            .parse("<p><span>John</span> <span>Smith</span></p>")
            .unwrap();
        let p = doc.first_element_child(doc.body().unwrap()).unwrap();
        assert_eq!(doc.children(p).len(), 3);
        assert_eq!(doc.text_content(p), "John Smith");
    }

    #[test]
    fn test_parse_malformed_html() {
        // html5ever should handle malformed HTML gracefully
        let parser = HtmlParser::new();
        let doc = parser.parse("<p>Unclosed paragraph<div>Another").unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.element_children(body).count(), 2);
    }
}
