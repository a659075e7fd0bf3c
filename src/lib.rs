//! # Trawl - selector synthesis and list extraction for HTML pages
//!
//! Point at an element, get back selectors that find it again; point at one
//! item of a repeated structure, get back a pattern that finds all of them.
//!
//! ## Architecture
//!
//! - **dom**: arena document, HTML parsing and block/inline layout
//! - **query**: XPath subset and CSS selector evaluation
//! - **paths**: CSS/XPath synthesis for one node and relative patterns
//! - **matcher**: pattern matching under a root with a tolerant fallback
//! - **controller**: the interactive hover/scroll selection state machine
//! - **extractor**: re-resolving stored selectors into a record
//! - **engine**: pages, overlays, input events and page loading
//! - **protocol**: typed messages, the agent channel and the page agent
//! - **config**: tunable thresholds
//! - **utils**: shared error types

pub mod config;
pub mod controller;
pub mod dom;
pub mod engine;
pub mod extractor;
pub mod matcher;
pub mod model;
pub mod paths;
pub mod protocol;
pub mod query;
pub mod utils;

// Re-export main types for convenience
pub use config::TrawlConfig;
pub use controller::SelectionController;
pub use engine::{Page, PageLoader};
pub use extractor::Extractor;
pub use matcher::{MatchOutcome, MatchPhase, find_matches};
pub use model::{ExtractionRecord, FieldValue, NodeDescriptor, SelectorSpec};
pub use paths::{PathBuilder, full_xpath, relative_path};
pub use protocol::{AgentEvent, AgentHandle, PageAgent, Request, Response};
pub use utils::error::{ChannelError, Result, TrawlError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "trawl";
