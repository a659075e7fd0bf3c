//! Per-page agent serving UI requests and input

use super::channel::{AgentHandle, AgentInbox, AgentMessage, channel};
use super::messages::{AgentEvent, Request, Response};
use crate::config::TrawlConfig;
use crate::controller::SelectionController;
use crate::engine::{InputEvent, Page};
use crate::extractor::Extractor;
use log::{debug, info};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Owns a page together with its selection controller
pub struct PageAgent {
    page: Page,
    controller: SelectionController<UnboundedSender<AgentEvent>>,
    config: TrawlConfig,
    inbox: AgentInbox,
}

impl PageAgent {
    /// Create an agent, the handle to talk to it and its event stream
    pub fn new(page: Page, config: TrawlConfig) -> (Self, AgentHandle, UnboundedReceiver<AgentEvent>) {
        let (handle, inbox) = channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let agent = Self {
            page,
            controller: SelectionController::new(config.clone(), events),
            config,
            inbox,
        };
        (agent, handle, event_rx)
    }

    /// Run an agent on the current runtime; the task yields the page back
    /// once every handle is dropped
    pub fn spawn(
        page: Page,
        config: TrawlConfig,
    ) -> (AgentHandle, UnboundedReceiver<AgentEvent>, JoinHandle<Page>) {
        let (agent, handle, events) = Self::new(page, config);
        (handle, events, tokio::spawn(agent.run()))
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn controller(&self) -> &SelectionController<UnboundedSender<AgentEvent>> {
        &self.controller
    }

    /// Serve messages until the channel closes, reverting flash outlines as
    /// their deadlines pass
    pub async fn run(mut self) -> Page {
        info!("agent started for {}", self.page.url());
        loop {
            let deadline = self.page.next_flash_deadline();
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.page.revert_expired_flashes(Instant::now());
                }
            }
        }
        self.controller.deactivate(&mut self.page);
        self.page.revert_all_flashes();
        info!("agent stopped for {}", self.page.url());
        self.page
    }

    fn handle_message(&mut self, message: AgentMessage) {
        match message {
            AgentMessage::Request { request, reply } => {
                let response = self.handle_request(request);
                if reply.send(response).is_err() {
                    debug!("caller went away before the reply");
                }
            }
            AgentMessage::Input(mut event) => self.handle_input(&mut event),
        }
    }

    /// Carry out one request
    pub fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::ActivateSelectionMode => {
                self.controller.activate(&mut self.page);
                Response::ok()
            }
            Request::ActivateListItemSelectionMode { root_xpath } => {
                match self.controller.activate_list(&mut self.page, &root_xpath) {
                    Ok(_) => Response::ok(),
                    Err(e) => Response::failed(e.to_string()),
                }
            }
            Request::DeactivateSelectionMode => {
                self.controller.deactivate(&mut self.page);
                Response::ok()
            }
            Request::Extract { selectors } => {
                let record = Extractor::new(&self.config).extract(&mut self.page, &selectors);
                Response::Extracted { record }
            }
        }
    }

    pub fn handle_input(&mut self, event: &mut InputEvent) {
        self.controller.handle_event(&mut self.page, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldValue, SelectorSpec};
    use std::collections::BTreeMap;
    use std::time::Duration;

    const LIST: &str = "<ul><li><a>A</a></li><li><a>B</a></li></ul>";

    fn page() -> Page {
        Page::from_html("https://example.com/", LIST, 800.0).unwrap()
    }

    #[tokio::test]
    async fn test_requests_through_spawned_agent() {
        let (handle, mut events, task) = PageAgent::spawn(page(), TrawlConfig::default());

        assert!(handle.request(Request::ActivateSelectionMode).await);
        assert_eq!(
            events.recv().await,
            Some(AgentEvent::SelectionModeActive { active: true })
        );

        let response = handle
            .call(Request::ActivateListItemSelectionMode {
                root_xpath: "//table".into(),
            })
            .await
            .unwrap();
        assert!(!response.is_success());

        drop(handle);
        let page = task.await.unwrap();
        assert!(page.listeners().is_empty());
        assert!(page.overlays().is_empty());
    }

    #[tokio::test]
    async fn test_extract_flash_is_reverted_by_timer() {
        let mut config = TrawlConfig::default();
        config.flash_duration_ms = 20;
        let (handle, _events, task) = PageAgent::spawn(page(), config);

        let mut selectors = BTreeMap::new();
        selectors.insert("links".to_string(), SelectorSpec::list("/html/body/ul", "li/a"));
        let response = handle.call(Request::Extract { selectors }).await.unwrap();
        let Response::Extracted { record } = response else {
            panic!("expected an extraction record");
        };
        assert_eq!(
            record.data.get("links"),
            Some(&FieldValue::List(vec!["A".into(), "B".into()]))
        );

        tokio::time::sleep(Duration::from_millis(80)).await;
        // a round trip guarantees the agent loop has run since the deadline
        assert!(handle.request(Request::DeactivateSelectionMode).await);
        drop(handle);
        let page = task.await.unwrap();
        assert_eq!(page.flashing(), 0);
        let a = page.document().elements().find(|n| page.document().tag_name(*n) == Some("a"));
        assert_eq!(page.document().attribute(a.unwrap(), "style"), None);
    }
}
