//! Arena-backed DOM (Document Object Model)
//!
//! Nodes live in a flat vector and refer to each other through [`NodeId`]
//! handles, so parent links and sibling lookups are cheap and the tree can be
//! walked upwards without reference counting.

use std::sync::OnceLock;

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single attribute, kept in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Node types in the DOM
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node (e.g., <div>)
    Element(ElementData),
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

/// Data for element nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lower-case tag name (e.g., "div", "span")
    pub tag_name: String,
    /// Element attributes in source order
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    /// Create a new element
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, replacing an existing one in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(pos).value)
    }

    /// Get the ID attribute
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id").filter(|id| !id.is_empty())
    }

    /// Get class names
    pub fn classes(&self) -> Vec<&str> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Check for a class name
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The DOM document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    // Document-order position per arena index, rebuilt after tree edits
    order: OnceLock<Vec<usize>>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeSlot {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            order: OnceLock::new(),
        }
    }

    /// The document node itself
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag_name)))
    }

    /// Create a detached element with attributes
    pub fn create_element_with(
        &mut self,
        tag_name: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        let mut data = ElementData::new(tag_name);
        data.attributes = attributes;
        self.push(NodeKind::Element(data))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(content.into()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(content.into()))
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.exists(parent) || !self.exists(child) {
            return;
        }
        self.detach(child);
        self.order.take();
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove a node from its parent. The node and its subtree stay allocated.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) {
            self.nodes[parent.0].children.retain(|c| *c != node);
            self.nodes[node.0].parent = None;
            self.order.take();
        }
    }

    fn exists(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// Node kind
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|n| &n.kind)
    }

    /// Element data if this is an element
    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable element data if this is an element
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// Lower-case tag name of an element
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    /// Parent node of any kind
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// Parent, only if it is an element (mirrors `parentElement`)
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    /// All child nodes
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children in order
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
    }

    /// First element child (mirrors `firstElementChild`)
    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.element_children(node).next()
    }

    /// 1-based index among all element siblings (`:nth-child`)
    pub fn element_index(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.element_children(parent)
            .position(|c| c == node)
            .map(|i| i + 1)
    }

    /// 1-based index among same-tag siblings, and how many such siblings exist
    pub fn same_tag_position(&self, node: NodeId) -> Option<(usize, usize)> {
        let tag = self.tag_name(node)?;
        let Some(parent) = self.parent(node) else {
            return Some((1, 1));
        };
        let mut index = 0;
        let mut count = 0;
        for sibling in self.element_children(parent) {
            if self.tag_name(sibling) == Some(tag) {
                count += 1;
                if sibling == node {
                    index = count;
                }
            }
        }
        Some((index, count))
    }

    /// The `<html>` element
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(self.root())
    }

    /// The `<body>` element
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|c| self.tag_name(*c) == Some("body"))
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(node),
        }
    }

    /// Inclusive containment, like `Node.contains`
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.exists(node) && self.contains(self.root(), node)
    }

    /// Descendants of `node` in document order, `node` excluded
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    /// Element descendants of `node` in document order
    pub fn descendant_elements(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(node).filter(|n| self.is_element(*n))
    }

    /// Every attached element in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendant_elements(self.root())
    }

    /// Position of a node in document order; detached nodes sort last
    pub fn order_position(&self, node: NodeId) -> usize {
        let order = self.order.get_or_init(|| {
            let mut order = vec![usize::MAX; self.nodes.len()];
            order[0] = 0;
            for (i, n) in self.descendants(self.root()).enumerate() {
                order[n.0] = i + 1;
            }
            order
        });
        order.get(node.0).copied().unwrap_or(usize::MAX)
    }

    /// Concatenated text of all descendant text nodes (`textContent`)
    pub fn text_content(&self, node: NodeId) -> String {
        match self.kind(node) {
            Some(NodeKind::Text(text)) | Some(NodeKind::Comment(text)) => text.clone(),
            _ => self
                .descendants(node)
                .filter_map(|n| match self.kind(n) {
                    Some(NodeKind::Text(text)) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Get an attribute of an element
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.get_attribute(name)
    }

    /// Set an attribute on an element; no-op for other node kinds
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.set_attribute(name, value);
        }
    }

    /// Remove an attribute from an element
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        self.element_mut(node)?.remove_attribute(name)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.document.children(current).iter().rev().copied());
        Some(current)
    }
}
