//! chat-relay - Streaming relay between a browser chat UI and LLM providers
//!
//! This library provides the core functionality for the relay,
//! including configuration, provider lookup, and SSE token extraction.

pub mod config;
pub mod error;
pub mod relay;

pub use config::Config;
pub use error::{Error, Result};
