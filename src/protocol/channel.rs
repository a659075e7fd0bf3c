//! Typed message channel between the UI and a page agent

use super::messages::{Request, Response};
use crate::engine::InputEvent;
use crate::utils::ChannelError;
use tokio::sync::{mpsc, oneshot};

/// Inbound traffic for an agent
#[derive(Debug)]
pub enum AgentMessage {
    /// A request expecting exactly one reply
    Request {
        request: Request,
        reply: oneshot::Sender<Response>,
    },
    /// Pointer or wheel input, processed in arrival order
    Input(InputEvent),
}

/// UI side of the channel
#[derive(Debug, Clone)]
pub struct AgentHandle {
    sender: mpsc::UnboundedSender<AgentMessage>,
}

impl AgentHandle {
    /// Send a request and wait for its reply
    pub async fn call(&self, request: Request) -> Result<Response, ChannelError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(AgentMessage::Request { request, reply })
            .map_err(|_| ChannelError::Disconnected)?;
        response.await.map_err(|_| ChannelError::NoResponse)
    }

    /// Like [`call`](Self::call), but any failure reads as "declined"
    pub async fn request(&self, request: Request) -> bool {
        matches!(self.call(request).await, Ok(response) if response.is_success())
    }

    /// Queue an input event
    pub fn send_input(&self, event: InputEvent) -> Result<(), ChannelError> {
        self.sender
            .send(AgentMessage::Input(event))
            .map_err(|_| ChannelError::Disconnected)
    }

    /// Whether the agent has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Agent side of the channel
#[derive(Debug)]
pub struct AgentInbox {
    receiver: mpsc::UnboundedReceiver<AgentMessage>,
}

impl AgentInbox {
    /// Next message; `None` once every handle is dropped
    pub async fn recv(&mut self) -> Option<AgentMessage> {
        self.receiver.recv().await
    }
}

/// Create a connected handle/inbox pair
pub fn channel() -> (AgentHandle, AgentInbox) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (AgentHandle { sender }, AgentInbox { receiver })
}
