//! Input events delivered to a page and the listeners that capture them

use super::overlay::OverlayId;
use crate::dom::NodeId;
use std::collections::HashMap;

/// Event types a page can capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerOver,
    Click,
    Wheel,
}

/// What an event was dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    Node(NodeId),
    /// One of the page's highlight overlays
    Overlay(OverlayId),
}

/// Event payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventData {
    Pointer { x: f32, y: f32 },
    Wheel { delta_y: f32 },
}

/// A single input event
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub event_type: EventType,
    pub data: EventData,
    pub target: EventTarget,
    pub cancelable: bool,
    pub default_prevented: bool,
}

impl InputEvent {
    fn new(event_type: EventType, data: EventData, target: EventTarget) -> Self {
        Self {
            event_type,
            data,
            target,
            cancelable: true,
            default_prevented: false,
        }
    }

    /// Pointer entered `target`
    pub fn pointer_over(target: NodeId, x: f32, y: f32) -> Self {
        Self::new(
            EventType::PointerOver,
            EventData::Pointer { x, y },
            EventTarget::Node(target),
        )
    }

    /// Click at page coordinates
    pub fn click(target: NodeId, x: f32, y: f32) -> Self {
        Self::new(
            EventType::Click,
            EventData::Pointer { x, y },
            EventTarget::Node(target),
        )
    }

    /// Wheel turn over `target`; positive `delta_y` scrolls down
    pub fn wheel(target: NodeId, delta_y: f32) -> Self {
        Self::new(
            EventType::Wheel,
            EventData::Wheel { delta_y },
            EventTarget::Node(target),
        )
    }

    /// Retarget at an overlay
    pub fn on_overlay(mut self, overlay: OverlayId) -> Self {
        self.target = EventTarget::Overlay(overlay);
        self
    }

    /// Node target, `None` for overlay targets
    pub fn target_node(&self) -> Option<NodeId> {
        match self.target {
            EventTarget::Node(node) => Some(node),
            EventTarget::Overlay(_) => None,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }
}

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy)]
struct Listener {
    id: ListenerId,
    capture: bool,
}

/// Registered listeners per event type
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<EventType, Vec<Listener>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener
    pub fn add(&mut self, event_type: EventType, capture: bool) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event_type)
            .or_default()
            .push(Listener { id, capture });
        id
    }

    /// Remove a listener; unknown ids are ignored
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|l| l.id != id);
            removed |= listeners.len() != before;
        }
        self.listeners.retain(|_, l| !l.is_empty());
        removed
    }

    /// Whether a capturing listener exists for `event_type`
    pub fn captures(&self, event_type: EventType) -> bool {
        self.listeners
            .get(&event_type)
            .is_some_and(|l| l.iter().any(|l| l.capture))
    }

    /// Get listener count for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map(|l| l.len()).unwrap_or(0)
    }

    /// Listeners across all event types
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
