//! CSS selector parsing and matching using cssparser
//!
//! Supports type, universal, `#id`, `.class`, `[attr]`, `[attr=value]`,
//! `:first-child`, `:nth-child(n)` and `:nth-of-type(n)` compounds joined by
//! descendant (whitespace) and child (`>`) combinators, plus selector lists.

use crate::dom::{Document, NodeId};
use crate::utils::{Result, TrawlError};
use cssparser::{ParseError, Parser, ParserInput, Token};

/// How a compound relates to the compound before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub value: Option<String>,
}

/// Structural pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    NthChild(i32),
    NthOfType(i32),
}

/// One compound selector, e.g. `li.item:nth-child(2)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag_name: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub pseudo_classes: Vec<PseudoClass>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag_name.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }

    fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some(element) = document.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag_name {
            if tag != "*" && *tag != element.tag_name {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        let attributes_match = self.attributes.iter().all(|attr| {
            match (element.get_attribute(&attr.name), &attr.value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        });
        if !attributes_match {
            return false;
        }
        self.pseudo_classes.iter().all(|pseudo| match pseudo {
            PseudoClass::FirstChild => document.element_index(node) == Some(1),
            PseudoClass::NthChild(n) => document
                .element_index(node)
                .is_some_and(|i| i as i64 == i64::from(*n)),
            PseudoClass::NthOfType(n) => document
                .same_tag_position(node)
                .is_some_and(|(i, _)| i as i64 == i64::from(*n)),
        })
    }
}

/// A complex selector: compounds with the combinator linking each to the previous one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    /// Check whether `node` matches, evaluating right to left
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        Self::matches_parts(document, node, &self.parts)
    }

    fn matches_parts(document: &Document, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
        let Some(((combinator, compound), rest)) = parts.split_last() else {
            return false;
        };
        if !compound.matches(document, node) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match combinator {
            Combinator::Child => document
                .parent_element(node)
                .is_some_and(|parent| Self::matches_parts(document, parent, rest)),
            Combinator::Descendant => document
                .ancestors(node)
                .filter(|a| document.is_element(*a))
                .any(|ancestor| Self::matches_parts(document, ancestor, rest)),
        }
    }
}

/// A comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self> {
        let pieces = tokenize(input).ok_or_else(|| TrawlError::InvalidSelector(input.to_string()))?;
        let selectors = pieces
            .split(|p| *p == Piece::Comma)
            .map(build_complex)
            .collect::<Option<Vec<_>>>()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TrawlError::InvalidSelector(input.to_string()))?;
        Ok(Self { selectors })
    }

    /// Whether any selector in the list matches `node`
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(document, node))
    }

    /// Every matching element in document order (`querySelectorAll`)
    pub fn select_all(&self, document: &Document) -> Vec<NodeId> {
        document
            .elements()
            .filter(|n| self.matches(document, *n))
            .collect()
    }

    /// First matching element in document order (`querySelector`)
    pub fn select_first(&self, document: &Document) -> Option<NodeId> {
        document.elements().find(|n| self.matches(document, *n))
    }
}

/// Parse `selector` and return every match in document order
pub fn query_selector_all(document: &Document, selector: &str) -> Result<Vec<NodeId>> {
    Ok(SelectorList::parse(selector)?.select_all(document))
}

/// Parse `selector` and return the first match
pub fn query_selector(document: &Document, selector: &str) -> Result<Option<NodeId>> {
    Ok(SelectorList::parse(selector)?.select_first(document))
}

/// Flattened, owned tokens; keeps cssparser lifetimes out of the grammar code
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Ident(String),
    Hash(String),
    Delim(char),
    Colon,
    Whitespace,
    Comma,
    Function(String, i32),
    Attribute(AttributeSelector),
}

fn tokenize(input: &str) -> Option<Vec<Piece>> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);
    let mut pieces = Vec::new();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let piece = match token {
            Token::Ident(name) => Piece::Ident(name.to_string()),
            Token::IDHash(name) | Token::Hash(name) => Piece::Hash(name.to_string()),
            Token::Delim(c) => Piece::Delim(c),
            Token::Colon => Piece::Colon,
            Token::WhiteSpace(_) => Piece::Whitespace,
            Token::Comma => Piece::Comma,
            Token::Function(name) => {
                let index = parser.parse_nested_block(parse_index).ok()?;
                Piece::Function(name.to_ascii_lowercase(), index)
            }
            Token::SquareBracketBlock => {
                Piece::Attribute(parser.parse_nested_block(parse_attribute).ok()?)
            }
            _ => return None,
        };
        pieces.push(piece);
    }

    Some(pieces)
}

fn parse_index<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<i32, ParseError<'i, ()>> {
    parser.skip_whitespace();
    let index = parser.expect_integer()?;
    parser.skip_whitespace();
    parser.expect_exhausted()?;
    Ok(index)
}

fn parse_attribute<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<AttributeSelector, ParseError<'i, ()>> {
    parser.skip_whitespace();
    let name = parser.expect_ident()?.to_ascii_lowercase();
    parser.skip_whitespace();
    if parser.is_exhausted() {
        return Ok(AttributeSelector { name, value: None });
    }
    parser.expect_delim('=')?;
    parser.skip_whitespace();
    let value = parser.expect_ident_or_string()?.to_string();
    parser.skip_whitespace();
    parser.expect_exhausted()?;
    Ok(AttributeSelector {
        name,
        value: Some(value),
    })
}

fn build_complex(pieces: &[Piece]) -> Option<ComplexSelector> {
    let mut parts: Vec<(Combinator, Compound)> = Vec::new();
    let mut current = Compound::default();
    let mut pending = Combinator::Descendant;
    let mut iter = pieces.iter().peekable();

    let flush = |parts: &mut Vec<(Combinator, Compound)>, current: &mut Compound, combinator| {
        if !current.is_empty() {
            parts.push((combinator, std::mem::take(current)));
        }
    };

    while let Some(piece) = iter.next() {
        match piece {
            Piece::Whitespace => {
                if !current.is_empty() {
                    flush(&mut parts, &mut current, pending);
                    pending = Combinator::Descendant;
                }
            }
            Piece::Delim('>') => {
                flush(&mut parts, &mut current, pending);
                if parts.is_empty() {
                    return None;
                }
                pending = Combinator::Child;
            }
            Piece::Delim('*') if current.is_empty() => current.tag_name = Some("*".to_string()),
            Piece::Ident(tag) if current.is_empty() => {
                current.tag_name = Some(tag.to_ascii_lowercase());
            }
            Piece::Hash(id) => current.id = Some(id.clone()),
            Piece::Delim('.') => match iter.next() {
                Some(Piece::Ident(class)) => current.classes.push(class.clone()),
                _ => return None,
            },
            Piece::Attribute(attr) => current.attributes.push(attr.clone()),
            Piece::Colon => match iter.next() {
                Some(Piece::Ident(name)) if name.eq_ignore_ascii_case("first-child") => {
                    current.pseudo_classes.push(PseudoClass::FirstChild);
                }
                Some(Piece::Function(name, n)) if name == "nth-child" => {
                    current.pseudo_classes.push(PseudoClass::NthChild(*n));
                }
                Some(Piece::Function(name, n)) if name == "nth-of-type" => {
                    current.pseudo_classes.push(PseudoClass::NthOfType(*n));
                }
                _ => return None,
            },
            _ => return None,
        }
    }

    if current.is_empty() {
        // A trailing combinator leaves nothing to anchor the match on.
        if pending == Combinator::Child || parts.is_empty() {
            return None;
        }
    } else {
        flush(&mut parts, &mut current, pending);
    }

    Some(ComplexSelector { parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlParser;

    fn doc(html: &str) -> Document {
        HtmlParser::new().parse(html).unwrap()
    }

    fn texts(document: &Document, nodes: Vec<NodeId>) -> Vec<String> {
        nodes
            .into_iter()
            .map(|n| document.text_content(n).trim().to_string())
            .collect()
    }

    #[test]
    fn test_simple_selectors() {
        let d = doc(r#"<div id="main" class="container active"><p class="note">x</p></div>"#);
        assert_eq!(query_selector_all(&d, "#main").unwrap().len(), 1);
        assert_eq!(query_selector_all(&d, ".container").unwrap().len(), 1);
        assert_eq!(query_selector_all(&d, "div.active").unwrap().len(), 1);
        assert_eq!(query_selector_all(&d, "p.active").unwrap().len(), 0);
        assert_eq!(query_selector_all(&d, "p").unwrap().len(), 1);
    }

    #[test]
    fn test_child_chain_with_nth_child() {
        let d = doc("<ul><li>a</li><li>b</li><li>c</li></ul>");
        let found = query_selector_all(&d, "body > ul > li:nth-child(2)").unwrap();
        assert_eq!(texts(&d, found), vec!["b"]);
    }

    #[test]
    fn test_descendant_combinator() {
        let d = doc("<section><div><span>deep</span></div></section><span>top</span>");
        let found = query_selector_all(&d, "section span").unwrap();
        assert_eq!(texts(&d, found), vec!["deep"]);
    }

    #[test]
    fn test_attribute_and_pseudo() {
        let d = doc(r#"<a href="/x" rel="next">1</a><a>2</a><p>p</p><a>3</a>"#);
        assert_eq!(texts(&d, query_selector_all(&d, "a[rel=next]").unwrap()), vec!["1"]);
        assert_eq!(texts(&d, query_selector_all(&d, "a[href]").unwrap()), vec!["1"]);
        assert_eq!(texts(&d, query_selector_all(&d, "a:nth-of-type(3)").unwrap()), vec!["3"]);
        assert_eq!(texts(&d, query_selector_all(&d, "body > :first-child").unwrap()), vec!["1"]);
    }

    #[test]
    fn test_selector_list() {
        let d = doc("<h1>t</h1><h2>s</h2>");
        assert_eq!(texts(&d, query_selector_all(&d, "h2, h1").unwrap()), vec!["t", "s"]);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "> a", "a >", "a:hover", "a:nth-child(2n+1)", "a..b", "[=x]"] {
            assert!(SelectorList::parse(bad).is_err(), "expected `{bad}` to be rejected");
        }
    }
}
