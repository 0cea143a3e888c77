//! Prospect research agent
//!
//! ## Architecture
//!
//! - `domain/` - Core types (Message, ToolCall, RunEvent, Assessment)
//! - `llm/` - Completion client and the OpenAI provider
//! - `core/` - Research loop and scoring pass
//! - `prompts` - System prompts and message templates

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod llm;
pub mod prompts;

// Re-export commonly used types
pub use config::*;
pub use core::ResearchAgent;
pub use domain::*;
pub use error::*;
