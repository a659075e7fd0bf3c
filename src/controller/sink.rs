//! Where the controller sends its notifications

use crate::protocol::AgentEvent;
use log::debug;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of controller notifications
#[cfg_attr(test, mockall::automock)]
pub trait EventSink {
    fn emit(&self, event: AgentEvent);
}

impl EventSink for UnboundedSender<AgentEvent> {
    fn emit(&self, event: AgentEvent) {
        if self.send(event).is_err() {
            debug!("event receiver dropped, notification discarded");
        }
    }
}
