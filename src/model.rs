//! Data shared between the controller, the extractor and the wire protocol

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attribute as it appeared in the source, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,
    pub value: String,
}

/// Everything the UI needs to find a selected element again later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Distinct classes in source order
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeDescriptor>,
    pub text_content: String,
    pub css_selector: String,
    #[serde(rename = "specificXPath")]
    pub specific_xpath: String,
    #[serde(rename = "fullXPath")]
    pub full_xpath: String,
}

/// How to re-find a field at extraction time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectorSpec {
    Single {
        #[serde(rename = "fullXPath")]
        full_xpath: String,
        #[serde(
            rename = "specificXPath",
            alias = "xpath",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        specific_xpath: Option<String>,
        #[serde(
            rename = "cssSelector",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        css_selector: Option<String>,
    },
    List {
        #[serde(rename = "rootFullXPath")]
        root_full_xpath: String,
        #[serde(
            rename = "relativeXPath",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        relative_xpath: Option<String>,
    },
}

impl SelectorSpec {
    /// Single-node spec from a descriptor
    pub fn single(descriptor: &NodeDescriptor) -> Self {
        Self::Single {
            full_xpath: descriptor.full_xpath.clone(),
            specific_xpath: Some(descriptor.specific_xpath.clone()),
            css_selector: Some(descriptor.css_selector.clone()),
        }
    }

    /// List spec from a root path and a relative pattern
    pub fn list(root_full_xpath: impl Into<String>, relative_xpath: impl Into<String>) -> Self {
        Self::List {
            root_full_xpath: root_full_xpath.into(),
            relative_xpath: Some(relative_xpath.into()),
        }
    }
}

/// An extracted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }
}

/// Result of one extraction pass over a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub url: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub data: BTreeMap<String, FieldValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selector_spec_wire_format() {
        let spec: SelectorSpec = serde_json::from_str(
            r#"{"type":"single","fullXPath":"/html/body/h1","xpath":"//h1[@id=\"t\"]"}"#,
        )
        .unwrap();
        assert_eq!(
            spec,
            SelectorSpec::Single {
                full_xpath: "/html/body/h1".into(),
                specific_xpath: Some("//h1[@id=\"t\"]".into()),
                css_selector: None,
            }
        );

        let list: SelectorSpec =
            serde_json::from_str(r#"{"type":"list","rootFullXPath":"/html/body/ul"}"#).unwrap();
        assert_eq!(
            list,
            SelectorSpec::List {
                root_full_xpath: "/html/body/ul".into(),
                relative_xpath: None,
            }
        );
    }

    #[test]
    fn test_field_values_serialize_untagged() {
        let mut data = BTreeMap::new();
        data.insert("title".to_string(), FieldValue::Text("Hello".into()));
        data.insert(
            "items".to_string(),
            FieldValue::List(vec!["A".into(), "B".into()]),
        );
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"items": ["A", "B"], "title": "Hello"})
        );
    }
}
