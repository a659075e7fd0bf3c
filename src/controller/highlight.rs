//! Overlays owned by a selection session

use crate::dom::NodeId;
use crate::engine::{Overlay, OverlayId, OverlayKind, Page};
use std::collections::HashMap;

/// Tracks the overlays a session has put on a page.
///
/// At most one primary and one root overlay exist at a time; showing a new
/// one moves the existing overlay instead of stacking another.
#[derive(Debug, Default)]
pub struct Highlights {
    primary: Option<OverlayId>,
    root: Option<OverlayId>,
    matches: HashMap<NodeId, OverlayId>,
}

impl Highlights {
    pub fn show_primary(&mut self, page: &mut Page, node: NodeId, color: &str) {
        Self::place(page, &mut self.primary, OverlayKind::Primary, node, color);
    }

    pub fn show_root(&mut self, page: &mut Page, node: NodeId, color: &str) {
        Self::place(page, &mut self.root, OverlayKind::Root, node, color);
    }

    /// Make the match overlays cover exactly `nodes`.
    ///
    /// Overlays of nodes that stay matched are left untouched. Returns the
    /// number of overlays added and removed.
    pub fn show_matches(&mut self, page: &mut Page, nodes: &[NodeId], color: &str) -> (usize, usize) {
        let stale: Vec<NodeId> = self
            .matches
            .keys()
            .filter(|n| !nodes.contains(n))
            .copied()
            .collect();
        for node in &stale {
            if let Some(id) = self.matches.remove(node) {
                page.overlays_mut().remove(id);
            }
        }

        let mut added = 0;
        for &node in nodes {
            if self.matches.contains_key(&node) {
                continue;
            }
            let bounds = page.bounding_box(node).unwrap_or_default();
            let id = page
                .overlays_mut()
                .insert(Overlay::new(OverlayKind::Match, node, bounds, color));
            self.matches.insert(node, id);
            added += 1;
        }
        (added, stale.len())
    }

    /// Remove every overlay this session created
    pub fn clear(&mut self, page: &mut Page) {
        let ids = self
            .primary
            .take()
            .into_iter()
            .chain(self.root.take())
            .chain(self.matches.drain().map(|(_, id)| id));
        for id in ids {
            page.overlays_mut().remove(id);
        }
    }

    pub fn primary(&self) -> Option<OverlayId> {
        self.primary
    }

    pub fn root(&self) -> Option<OverlayId> {
        self.root
    }

    fn place(
        page: &mut Page,
        slot: &mut Option<OverlayId>,
        kind: OverlayKind,
        node: NodeId,
        color: &str,
    ) {
        let bounds = page.bounding_box(node).unwrap_or_default();
        if let Some(id) = *slot {
            if page.overlays_mut().retarget(id, node, bounds) {
                return;
            }
        }
        *slot = Some(
            page.overlays_mut()
                .insert(Overlay::new(kind, node, bounds, color)),
        );
    }
}
