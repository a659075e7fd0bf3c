//! Messaging between a page agent and the UI

mod agent;
mod channel;
mod messages;

pub use agent::PageAgent;
pub use channel::{AgentHandle, AgentInbox, AgentMessage, channel};
pub use messages::{
    AgentEvent, HighlightPreview, ListItem, ListSelection, Request, Response, Selection,
};
