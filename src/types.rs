//! Request and response types for the routing core
//!
//! A [`Request`] is immutable once constructed; each retry within a routing
//! call reuses the same logical request against a different provider. A
//! [`Response`] is constructed exactly once per successful dispatch.

use crate::provider::{Capability, ProviderDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One role/content pair in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Create a system message
pub fn system_message(content: impl Into<String>) -> Message {
    Message {
        role: Role::System,
        content: content.into(),
    }
}

/// Create a user message
pub fn user_message(content: impl Into<String>) -> Message {
    Message {
        role: Role::User,
        content: content.into(),
    }
}

/// An inference request to be routed to some provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Ordered conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate (None = provider default)
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether the caller wants a streamed response
    pub stream: bool,
    /// Image attachments (presence requires the Vision capability)
    #[serde(default)]
    pub images: Vec<String>,
    /// Tool definitions (presence requires the FunctionCalling capability)
    #[serde(default)]
    pub tools: Vec<serde_json::Value>,
}

impl Request {
    /// Create a request with default generation parameters
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: 0.7,
            stream: false,
            images: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Set the max token budget (builder pattern)
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature (builder pattern)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request a streamed response (builder pattern)
    pub fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Attach images (builder pattern)
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// Attach tool definitions (builder pattern)
    pub fn with_tools(mut self, tools: Vec<serde_json::Value>) -> Self {
        self.tools = tools;
        self
    }

    /// Capabilities a provider must have to serve this request
    ///
    /// Derived from the request content: images require Vision, tools
    /// require FunctionCalling.
    pub fn required_capabilities(&self) -> Vec<Capability> {
        let mut required = Vec::new();
        if !self.images.is_empty() {
            required.push(Capability::Vision);
        }
        if !self.tools.is_empty() {
            required.push(Capability::FunctionCalling);
        }
        required
    }

    /// Rough token estimate for cost scoring (word count x 1.3)
    pub fn estimated_tokens(&self) -> f64 {
        let words: usize = self
            .messages
            .iter()
            .map(|m| m.content.split_whitespace().count())
            .sum();
        words as f64 * 1.3
    }

    /// Estimated cost of this request against a given provider
    pub fn estimated_cost(&self, descriptor: &ProviderDescriptor) -> f64 {
        self.estimated_tokens() * descriptor.cost_per_token
    }
}

/// A successful routing outcome
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Generated content
    pub content: String,
    /// Id of the provider that served the request
    pub provider_id: String,
    /// Tokens consumed by the dispatch
    pub tokens_used: u64,
    /// Cost of the dispatch (tokens_used x cost_per_token)
    pub cost: f64,
    /// Wall-clock latency of the dispatch in seconds
    pub latency_secs: f64,
    /// Opaque provider metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_capabilities_derivation() {
        let plain = Request::new(vec![user_message("hello")]);
        assert!(plain.required_capabilities().is_empty());

        let vision = Request::new(vec![user_message("look")])
            .with_images(vec!["data:image/png;base64,...".to_string()]);
        assert_eq!(vision.required_capabilities(), vec![Capability::Vision]);

        let tools = Request::new(vec![user_message("call")])
            .with_tools(vec![serde_json::json!({"name": "search"})]);
        assert_eq!(
            tools.required_capabilities(),
            vec![Capability::FunctionCalling]
        );
    }

    #[test]
    fn test_estimated_tokens() {
        let request = Request::new(vec![
            user_message("one two three four"),
            system_message("five six"),
        ]);
        let estimate = request.estimated_tokens();
        assert!((estimate - 6.0 * 1.3).abs() < f64::EPSILON);
    }
}
