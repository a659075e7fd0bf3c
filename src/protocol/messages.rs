//! Messages exchanged between a page agent and the UI
//!
//! Everything is tagged with `action` and uses camelCase names on the wire.

use crate::model::{ExtractionRecord, NodeDescriptor, SelectorSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// UI → agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ActivateSelectionMode,
    ActivateListItemSelectionMode {
        #[serde(rename = "rootXPath")]
        root_xpath: String,
    },
    DeactivateSelectionMode,
    Extract {
        selectors: BTreeMap<String, SelectorSpec>,
    },
}

/// Agent → UI reply to a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Response {
    Ack {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Extracted {
        record: ExtractionRecord,
    },
}

impl Response {
    pub fn ok() -> Self {
        Self::Ack {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Ack {
            success: false,
            error: Some(error.into()),
        }
    }

    /// Whether the request was carried out
    pub fn is_success(&self) -> bool {
        match self {
            Self::Ack { success, .. } => *success,
            Self::Extracted { .. } => true,
        }
    }
}

/// Preview sent while hovering or scrolling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPreview {
    pub tag_name: String,
    pub text: String,
    #[serde(
        rename = "relativeXPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_count: Option<usize>,
}

/// One matched element of a list selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(rename = "fullXPath")]
    pub full_xpath: String,
}

/// List fields attached to a selection made in list mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSelection {
    #[serde(rename = "rootXPath")]
    pub root_xpath: String,
    #[serde(rename = "relativeXPath")]
    pub relative_xpath: String,
    pub items: Vec<ListItem>,
}

/// A finalized selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(flatten)]
    pub descriptor: NodeDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListSelection>,
}

/// Agent → UI notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum AgentEvent {
    SelectionModeActive { active: bool },
    ScrollingModeActive { active: bool },
    ElementHighlighted(HighlightPreview),
    ElementSelected(Selection),
}
