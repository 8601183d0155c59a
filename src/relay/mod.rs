//! HTTP relay server module.
//!
//! This module provides the streaming endpoint that accepts a conversation
//! from the browser client and relays the selected provider's token stream.

mod handlers;
mod server;
pub mod stream;
pub mod types;

pub use handlers::RELAY_PROVIDER_HEADER;
pub use server::{
    build_state, create_router, run_server, AppState, RequestId, RELAY_REQUEST_ID_HEADER,
};
pub use stream::{token_stream, TokenExtractor};
pub use types::{ChatRequest, Message, UpstreamChatRequest};
