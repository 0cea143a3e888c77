//! Research agent core
//!
//! - `research`: the tool-calling loop that drives one run and emits events
//! - `scoring`: the bounded-retry pass that turns a finished run into an assessment
//! - `retry`: the retry combinator the scorer is built on

mod research;
pub mod retry;
mod scoring;

pub use research::ResearchAgent;
pub use scoring::{extract_context_summary, Scorer};
