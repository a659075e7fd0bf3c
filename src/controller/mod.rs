//! Interactive element selection
//!
//! [`SelectionController`] turns pointer, click and wheel input on a
//! [`Page`] into highlighted candidates and finally a selection:
//!
//! ```text
//! Idle --activate--> Hover --click--> Scrolling --click inside--> Idle
//!                      ^                  |
//!                      +--click outside---+
//! ```
//!
//! In list mode a root element is bound first; every hovered node is then
//! generalized into a pattern relative to that root and all its matches are
//! highlighted alongside it.

mod highlight;
mod session;
mod sink;

pub use highlight::Highlights;
pub use session::{ListBinding, Mode, SelectionSession};
pub use sink::EventSink;
#[cfg(test)]
pub use sink::MockEventSink;

use crate::config::TrawlConfig;
use crate::dom::NodeId;
use crate::engine::{Cursor, EventData, EventType, InputEvent, Page};
use crate::matcher::find_matches;
use crate::paths::{PathBuilder, full_xpath, relative_path};
use crate::protocol::{AgentEvent, HighlightPreview, ListItem, ListSelection, Selection};
use crate::query::resolve_first;
use crate::utils::{Result, TrawlError};
use log::{debug, info, warn};

const CAPTURED_EVENTS: [EventType; 3] = [EventType::PointerOver, EventType::Click, EventType::Wheel];

/// Owns the selection session of one page
pub struct SelectionController<S> {
    config: TrawlConfig,
    sink: S,
    session: SelectionSession,
}

impl<S: EventSink> SelectionController<S> {
    pub fn new(config: TrawlConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            session: SelectionSession::default(),
        }
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// Start hover selection. An active session is torn down first.
    pub fn activate(&mut self, page: &mut Page) {
        if self.session.is_active() {
            self.transition(page, Mode::Idle);
        }
        self.transition(page, Mode::Hover);
    }

    /// Start list selection under the first element matching `root_xpath`.
    ///
    /// An empty path is rejected without touching the session. A path that
    /// does not resolve deactivates the session again.
    pub fn activate_list(&mut self, page: &mut Page, root_xpath: &str) -> Result<NodeId> {
        let root_xpath = root_xpath.trim();
        if root_xpath.is_empty() {
            return Err(TrawlError::EmptyRootPath);
        }

        self.activate(page);
        self.session.list = ListBinding::RootPending;

        let root = match resolve_first(page.document(), root_xpath) {
            Ok(Some(root)) => root,
            Ok(None) => {
                warn!("list root {root_xpath:?} not found");
                self.deactivate(page);
                return Err(TrawlError::NodeNotFound(root_xpath.to_string()));
            }
            Err(e) => {
                warn!("list root {root_xpath:?} failed to evaluate: {e}");
                self.deactivate(page);
                return Err(e);
            }
        };

        self.session
            .highlights
            .show_root(page, root, &self.config.colors.root);
        self.session.list = ListBinding::RootBound(root);
        info!("list selection bound to {root_xpath}");
        Ok(root)
    }

    /// Return to idle from any state. Safe to call repeatedly.
    pub fn deactivate(&mut self, page: &mut Page) {
        self.transition(page, Mode::Idle);
    }

    /// Feed one input event through the session
    pub fn handle_event(&mut self, page: &mut Page, event: &mut InputEvent) {
        if !self.session.is_active() || !page.listeners().captures(event.event_type) {
            return;
        }
        let Some(target) = event.target_node() else {
            debug!("ignoring {:?} on a highlight overlay", event.event_type);
            return;
        };
        let target = if page.document().is_element(target) {
            target
        } else {
            match page.document().parent_element(target) {
                Some(parent) => parent,
                None => return,
            }
        };

        match (self.session.mode, event.event_type) {
            (Mode::Hover, EventType::PointerOver) => self.hover(page, target),
            (Mode::Hover, EventType::Click) => {
                event.prevent_default();
                self.lock(page, target);
            }
            (Mode::Scrolling, EventType::Click) => {
                event.prevent_default();
                self.click_while_scrolling(page, target, event.data);
            }
            (Mode::Scrolling, EventType::Wheel) => {
                if let EventData::Wheel { delta_y } = event.data {
                    event.prevent_default();
                    self.scroll(page, delta_y);
                }
            }
            _ => {}
        }
    }

    /// The single place where the mode changes
    fn transition(&mut self, page: &mut Page, to: Mode) {
        let from = self.session.mode;
        match (from, to) {
            (_, Mode::Idle) => {
                for id in self.session.listeners.drain(..) {
                    page.listeners_mut().remove(id);
                }
                page.set_cursor(Cursor::Default);
                self.session.highlights.clear(page);
                self.session = SelectionSession::default();
                self.sink.emit(AgentEvent::SelectionModeActive { active: false });
                self.sink.emit(AgentEvent::ScrollingModeActive { active: false });
            }
            (Mode::Idle, Mode::Hover) => {
                for event_type in CAPTURED_EVENTS {
                    let id = page.listeners_mut().add(event_type, true);
                    self.session.listeners.push(id);
                }
                page.set_cursor(Cursor::Crosshair);
                self.session.mode = Mode::Hover;
                self.sink.emit(AgentEvent::SelectionModeActive { active: true });
            }
            (Mode::Hover, Mode::Scrolling) => {
                self.session.locked = self.session.hovered;
                self.session.mode = Mode::Scrolling;
                self.sink.emit(AgentEvent::ScrollingModeActive { active: true });
            }
            (Mode::Scrolling, Mode::Hover) => {
                self.session.locked = None;
                self.session.mode = Mode::Hover;
                self.sink.emit(AgentEvent::ScrollingModeActive { active: false });
            }
            (from, to) if from == to => {}
            (from, to) => warn!("no transition from {from:?} to {to:?}"),
        }
        debug!("selection mode {from:?} -> {:?}", self.session.mode);
    }

    fn hover(&mut self, page: &mut Page, target: NodeId) {
        let node = self.promote(page, target);
        self.session.hovered = Some(node);
        self.focus(page, node);
    }

    fn lock(&mut self, page: &mut Page, target: NodeId) {
        if self.session.hovered.is_none() {
            self.session.hovered = Some(target);
        }
        self.transition(page, Mode::Scrolling);
        if let Some(locked) = self.session.locked {
            self.focus(page, locked);
        }
    }

    fn click_while_scrolling(&mut self, page: &mut Page, target: NodeId, data: EventData) {
        let Some(locked) = self.session.locked else {
            self.transition(page, Mode::Hover);
            return;
        };
        let inside = match data {
            EventData::Pointer { x, y } => page
                .bounding_box(locked)
                .is_some_and(|rect| rect.contains_point(x, y)),
            EventData::Wheel { .. } => false,
        };
        if inside {
            self.finalize(page, locked);
            self.deactivate(page);
        } else {
            self.transition(page, Mode::Hover);
            self.hover(page, target);
        }
    }

    fn scroll(&mut self, page: &mut Page, delta_y: f32) {
        let Some(locked) = self.session.locked else {
            return;
        };
        let document = page.document();
        let next = if delta_y > 0.0 {
            document.first_element_child(locked)
        } else if delta_y < 0.0 {
            document.parent_element(locked)
        } else {
            None
        };
        let Some(next) = next else {
            debug!("wheel at the edge of the tree");
            return;
        };
        self.session.locked = Some(next);
        self.session.hovered = Some(next);
        self.focus(page, next);
    }

    /// When the hovered node yields no matches, the first of its nearest
    /// ancestors inside the root that matches more takes its place.
    ///
    /// A node strictly inside the root always matches its own pattern, so
    /// only the root itself and nodes outside it reach the climb, and for
    /// those no ancestor qualifies.
    fn promote(&self, page: &Page, target: NodeId) -> NodeId {
        let Some(root) = self.session.root() else {
            return target;
        };
        let document = page.document();
        let count = |node: NodeId| {
            let pattern = relative_path(document, node, root);
            find_matches(document, &pattern, root, self.config.fallback_depth).len()
        };

        let base = count(target);
        if base > 0 {
            return target;
        }
        let mut current = target;
        for _ in 0..self.config.promotion_levels {
            let Some(parent) = document.parent_element(current) else {
                break;
            };
            if parent == root || !document.contains(root, parent) {
                break;
            }
            if count(parent) > base {
                debug!("promoted hover from {target:?} to {parent:?}");
                return parent;
            }
            current = parent;
        }
        target
    }

    /// Move the primary overlay to `node`, refresh list matches and emit a preview
    fn focus(&mut self, page: &mut Page, node: NodeId) {
        self.session
            .highlights
            .show_primary(page, node, &self.config.colors.primary);

        let document = page.document();
        let tag_name = document.tag_name(node).unwrap_or_default().to_string();
        let text: String = document
            .text_content(node)
            .trim()
            .chars()
            .take(self.config.preview_text_limit)
            .collect();

        let (relative_xpath, matching_count) = match self.session.root() {
            Some(root) => {
                let pattern = relative_path(document, node, root);
                let outcome = find_matches(document, &pattern, root, self.config.fallback_depth);
                debug!(
                    "pattern {pattern:?} matched {} ({:?})",
                    outcome.len(),
                    outcome.phase
                );
                let count = outcome.len();
                self.session
                    .highlights
                    .show_matches(page, &outcome.nodes, &self.config.colors.matches);
                self.session.matches = outcome.nodes;
                self.session.pattern = pattern.clone();
                (Some(pattern), Some(count))
            }
            None => (None, None),
        };

        self.sink.emit(AgentEvent::ElementHighlighted(HighlightPreview {
            tag_name,
            text,
            relative_xpath,
            matching_count,
        }));
    }

    fn finalize(&mut self, page: &Page, locked: NodeId) {
        let document = page.document();
        let Some(descriptor) = PathBuilder::new(document, &self.config).describe(locked) else {
            warn!("locked node {locked:?} is not an element");
            return;
        };
        let list = self.session.root().map(|root| ListSelection {
            root_xpath: full_xpath(document, root),
            relative_xpath: self.session.pattern.clone(),
            items: self
                .session
                .matches
                .iter()
                .map(|&node| ListItem {
                    text: document.text_content(node).trim().to_string(),
                    full_xpath: full_xpath(document, node),
                })
                .collect(),
        });
        info!("selected {}", descriptor.full_xpath);
        self.sink
            .emit(AgentEvent::ElementSelected(Selection { descriptor, list }));
    }
}
