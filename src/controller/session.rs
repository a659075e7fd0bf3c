//! State of one selection session

use super::highlight::Highlights;
use crate::dom::NodeId;
use crate::engine::ListenerId;

/// Interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Following the pointer
    Hover,
    /// A node is locked; the wheel walks the tree from it
    Scrolling,
}

/// List-mode root binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListBinding {
    #[default]
    Off,
    /// List mode requested, root not resolved yet
    RootPending,
    RootBound(NodeId),
}

/// Everything a session holds; dropped back to default on deactivation
#[derive(Debug, Default)]
pub struct SelectionSession {
    pub(super) mode: Mode,
    pub(super) list: ListBinding,
    pub(super) hovered: Option<NodeId>,
    pub(super) locked: Option<NodeId>,
    pub(super) matches: Vec<NodeId>,
    pub(super) pattern: String,
    pub(super) listeners: Vec<ListenerId>,
    pub(super) highlights: Highlights,
}

impl SelectionSession {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != Mode::Idle
    }

    pub fn list(&self) -> ListBinding {
        self.list
    }

    /// Bound list root, if any
    pub fn root(&self) -> Option<NodeId> {
        match self.list {
            ListBinding::RootBound(root) => Some(root),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn locked(&self) -> Option<NodeId> {
        self.locked
    }

    /// Current match set in document order
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    /// Pattern the current matches were computed from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }
}
