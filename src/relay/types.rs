//! Request and response types for the relay API.

use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

/// Chat request posted by the browser client.
///
/// The client sends the full conversation on every request; the relay
/// holds no conversation state.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Name of the configured provider to forward to.
    pub provider: Option<String>,
    /// Full message history, oldest first.
    pub messages: Vec<Message>,
}

/// A chat message.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Body forwarded to the upstream provider (OpenAI-compatible).
///
/// The model comes from provider config, never from the client, and
/// `stream` is always true: the relay only speaks streaming.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

impl<'a> UpstreamChatRequest<'a> {
    /// Build the upstream body for a chat request and its selected provider.
    pub fn build(request: &'a ChatRequest, provider: &'a ProviderConfig) -> Self {
        Self {
            model: &provider.model,
            messages: &request.messages,
            stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> ProviderConfig {
        ProviderConfig {
            name: "openrouter".to_string(),
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: None,
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
        }
    }

    #[test]
    fn chat_request_deserializes() {
        let json = r#"{
            "provider": "openrouter",
            "messages": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi there"},
                {"role": "user", "content": "how are you?"}
            ]
        }"#;

        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.provider.as_deref(), Some("openrouter"));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "how are you?");
    }

    #[test]
    fn chat_request_provider_may_be_absent() {
        // The handler rejects this with 400; deserialization must not.
        let json = r#"{"messages": [{"role": "user", "content": "hi"}]}"#;
        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert!(request.provider.is_none());
    }

    #[test]
    fn upstream_body_injects_model_and_stream() {
        let request = ChatRequest {
            provider: Some("openrouter".to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
        };
        let provider = test_provider();

        let upstream = UpstreamChatRequest::build(&request, &provider);
        let json = serde_json::to_value(&upstream).unwrap();

        assert_eq!(json["model"], "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(
            json.get("provider").is_none(),
            "provider selector must not leak upstream"
        );
    }
}
