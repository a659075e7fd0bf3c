//! XPath subset evaluator
//!
//! Covers the location paths trawl produces and stores: absolute and relative
//! child steps, `//` descendant steps, `.`/`..`, `*`, and the predicates
//! `[n]`, `[@attr]`, `[@attr="v"]` and `[contains(@attr,"v")]`. Results are
//! always returned as an ordered snapshot in document order.

use crate::dom::{Document, NodeId};
use crate::utils::{Result, TrawlError};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    /// `//name`: descendant-or-self, then child
    Descendant,
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttribute(String),
    AttributeEquals(String, String),
    AttributeContains(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

/// A parsed XPath location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    source: String,
    absolute: bool,
    steps: Vec<Step>,
}

impl XPath {
    /// Parse an expression
    pub fn parse(expr: &str) -> Result<Self> {
        Parser::new(expr).parse()
    }

    /// Original expression text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the path starts at the document node
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// All matching nodes in document order. Absolute paths ignore `context`.
    pub fn evaluate(&self, document: &Document, context: NodeId) -> Vec<NodeId> {
        let mut current = vec![if self.absolute {
            document.root()
        } else {
            context
        }];

        for step in &self.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for ctx in &current {
                for node in step.apply(document, *ctx) {
                    if seen.insert(node) {
                        next.push(node);
                    }
                }
            }
            let scattered = current.len() > 1 || step.axis == Axis::Descendant;
            if scattered && next.len() > 1 {
                next.sort_by_key(|n| document.order_position(*n));
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }

        current
    }

    /// First match in document order
    pub fn first(&self, document: &Document, context: NodeId) -> Option<NodeId> {
        self.evaluate(document, context).into_iter().next()
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and evaluate `expr` from the document node, returning the first match
pub fn resolve_first(document: &Document, expr: &str) -> Result<Option<NodeId>> {
    let xpath = XPath::parse(expr)?;
    Ok(xpath.first(document, document.root()))
}

impl Step {
    fn apply(&self, document: &Document, ctx: NodeId) -> Vec<NodeId> {
        match self.axis {
            Axis::SelfNode => self.filter(document, vec![ctx]),
            Axis::Parent => self.filter(document, document.parent(ctx).into_iter().collect()),
            Axis::Child => self.filter(document, self.matching_children(document, ctx)),
            Axis::Descendant => {
                let mut out = Vec::new();
                let bases = std::iter::once(ctx).chain(document.descendant_elements(ctx));
                for base in bases {
                    out.extend(self.filter(document, self.matching_children(document, base)));
                }
                out
            }
        }
    }

    fn matching_children(&self, document: &Document, parent: NodeId) -> Vec<NodeId> {
        document
            .element_children(parent)
            .filter(|c| self.name_matches(document, *c))
            .collect()
    }

    fn name_matches(&self, document: &Document, node: NodeId) -> bool {
        match (&self.test, document.tag_name(node)) {
            (NameTest::Any, Some(_)) => true,
            (NameTest::Tag(name), Some(tag)) => name == tag,
            _ => false,
        }
    }

    fn filter(&self, document: &Document, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
        if matches!(self.axis, Axis::SelfNode | Axis::Parent) {
            nodes.retain(|n| match &self.test {
                NameTest::Any => true,
                NameTest::Tag(_) => self.name_matches(document, *n),
            });
        }
        for predicate in &self.predicates {
            nodes = match predicate {
                Predicate::Position(pos) => nodes.get(pos - 1).copied().into_iter().collect(),
                Predicate::HasAttribute(name) => nodes
                    .into_iter()
                    .filter(|n| document.attribute(*n, name).is_some())
                    .collect(),
                Predicate::AttributeEquals(name, value) => nodes
                    .into_iter()
                    .filter(|n| document.attribute(*n, name) == Some(value.as_str()))
                    .collect(),
                Predicate::AttributeContains(name, value) => nodes
                    .into_iter()
                    .filter(|n| {
                        document
                            .attribute(*n, name)
                            .is_some_and(|v| v.contains(value.as_str()))
                    })
                    .collect(),
            };
        }
        nodes
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> TrawlError {
        TrawlError::xpath(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{c}` at offset {}", self.pos)))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse(mut self) -> Result<XPath> {
        if self.chars.is_empty() {
            return Err(self.error("empty expression"));
        }

        let absolute = self.peek() == Some('/');
        let mut steps = Vec::new();
        let mut axis = Axis::Child;

        loop {
            if self.eat('/') {
                axis = if self.eat('/') {
                    Axis::Descendant
                } else {
                    Axis::Child
                };
            }
            steps.push(self.parse_step(axis)?);

            match self.peek() {
                None => break,
                Some('/') => {}
                Some(c) => return Err(self.error(format!("unexpected `{c}` at offset {}", self.pos))),
            }
        }

        Ok(XPath {
            source: self.source.trim().to_string(),
            absolute,
            steps,
        })
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step> {
        if self.peek() == Some('.') {
            self.pos += 1;
            let axis = if self.eat('.') {
                Axis::Parent
            } else {
                Axis::SelfNode
            };
            return Ok(Step {
                axis,
                test: NameTest::Any,
                predicates: Vec::new(),
            });
        }

        let test = if self.eat('*') {
            NameTest::Any
        } else {
            let name = self.parse_name();
            if name.is_empty() {
                return Err(self.error(format!("expected a name test at offset {}", self.pos)));
            }
            NameTest::Tag(name.to_ascii_lowercase())
        };

        let mut predicates = Vec::new();
        while self.eat('[') {
            self.skip_whitespace();
            predicates.push(self.parse_predicate()?);
            self.skip_whitespace();
            self.expect(']')?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':'))
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_predicate(&mut self) -> Result<Predicate> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                match digits.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Predicate::Position(n)),
                    _ => Err(self.error(format!("invalid position `{digits}`"))),
                }
            }
            Some('@') => {
                let name = self.parse_attribute_name()?;
                self.skip_whitespace();
                if self.eat('=') {
                    self.skip_whitespace();
                    let value = self.parse_literal()?;
                    Ok(Predicate::AttributeEquals(name, value))
                } else {
                    Ok(Predicate::HasAttribute(name))
                }
            }
            Some(_) => {
                let function = self.parse_name();
                if function != "contains" {
                    return Err(self.error(format!("unsupported predicate `{function}`")));
                }
                self.skip_whitespace();
                self.expect('(')?;
                self.skip_whitespace();
                let name = self.parse_attribute_name()?;
                self.skip_whitespace();
                self.expect(',')?;
                self.skip_whitespace();
                let value = self.parse_literal()?;
                self.skip_whitespace();
                self.expect(')')?;
                Ok(Predicate::AttributeContains(name, value))
            }
            None => Err(self.error("unterminated predicate")),
        }
    }

    fn parse_attribute_name(&mut self) -> Result<String> {
        self.expect('@')?;
        let name = self.parse_name();
        if name.is_empty() {
            return Err(self.error("expected an attribute name"));
        }
        Ok(name.to_ascii_lowercase())
    }

    fn parse_literal(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error(format!("expected a string literal at offset {}", self.pos))),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(self.error("unterminated string literal"));
        }
        let value: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(value)
    }
}
