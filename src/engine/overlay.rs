//! Highlight overlays drawn above the page
//!
//! Overlays live outside the document so that highlighting never changes the
//! tree that paths are computed against.

use crate::dom::{NodeId, Rect};
use std::collections::BTreeMap;

/// Handle to an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

/// What an overlay marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Hovered or locked element
    Primary,
    /// One element of the current match set
    Match,
    /// Bound list root
    Root,
}

/// A highlight box
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub kind: OverlayKind,
    /// Element the overlay covers
    pub target: NodeId,
    pub bounds: Rect,
    pub color: String,
}

impl Overlay {
    pub fn new(kind: OverlayKind, target: NodeId, bounds: Rect, color: impl Into<String>) -> Self {
        Self {
            kind,
            target,
            bounds,
            color: color.into(),
        }
    }
}

/// All overlays of a page, in creation order
#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    overlays: BTreeMap<OverlayId, Overlay>,
    next_id: u64,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overlay
    pub fn insert(&mut self, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays.insert(id, overlay);
        id
    }

    /// Move an overlay onto another element; returns false for unknown ids
    pub fn retarget(&mut self, id: OverlayId, target: NodeId, bounds: Rect) -> bool {
        match self.overlays.get_mut(&id) {
            Some(overlay) => {
                overlay.target = target;
                overlay.bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: OverlayId) -> Option<Overlay> {
        self.overlays.remove(&id)
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.overlays.contains_key(&id)
    }

    /// Overlays of one kind
    pub fn of_kind(&self, kind: OverlayKind) -> impl Iterator<Item = (OverlayId, &Overlay)> + '_ {
        self.overlays
            .iter()
            .filter(move |(_, o)| o.kind == kind)
            .map(|(id, o)| (*id, o))
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_retarget_moves_existing_overlay() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let moved = Rect::new(0.0, 20.0, 10.0, 10.0);

        let mut layer = OverlayLayer::new();
        let id = layer.insert(Overlay::new(OverlayKind::Primary, a, rect, "red"));

        assert!(layer.retarget(id, b, moved));
        assert_eq!(layer.len(), 1);
        let overlay = layer.get(id).unwrap();
        assert_eq!(overlay.target, b);
        assert_eq!(overlay.bounds, moved);

        layer.remove(id);
        assert!(!layer.retarget(id, a, rect));
    }

    #[test]
    fn test_of_kind_and_remove() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let mut layer = OverlayLayer::new();
        let root = layer.insert(Overlay::new(OverlayKind::Root, a, Rect::default(), "y"));
        layer.insert(Overlay::new(OverlayKind::Match, a, Rect::default(), "g"));
        layer.insert(Overlay::new(OverlayKind::Match, a, Rect::default(), "g"));

        assert_eq!(layer.of_kind(OverlayKind::Match).count(), 2);
        assert!(layer.remove(root).is_some());
        assert!(!layer.contains(root));
        assert_eq!(layer.len(), 2);
    }
}
