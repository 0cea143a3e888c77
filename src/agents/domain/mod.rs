//! Domain types for the research agent
//!
//! Conversation messages, tool call requests, lifecycle events and the final
//! assessment. Everything here is owned by a single run.

mod assessment;
mod event;
mod message;
mod tool_call;

pub use assessment::{Assessment, FALLBACK_SCORE, MAX_SCORE, MIN_SCORE, REQUIRED_KEYS};
pub(crate) use assessment::ScoredReply;
pub use event::*;
pub use message::*;
pub use tool_call::*;
