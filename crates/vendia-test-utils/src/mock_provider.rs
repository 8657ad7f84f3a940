// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! `MockProvider` implements `GenerationProvider` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use vendia_core::traits::GenerationProvider;
use vendia_core::types::{ChatRequest, ChatResponse};
use vendia_core::VendiaError;

/// A mock LLM provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. A provider built with
/// [`MockProvider::failing`] instead fails every call.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    failure: Option<String>,
    calls: AtomicU64,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            failure: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            failure: None,
            calls: AtomicU64::new(0),
        }
    }

    /// Create a mock provider that fails every call with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            failure: Some(message.to_string()),
            calls: AtomicU64::new(0),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Number of chat calls received, including failed ones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Pop the next response, or return the default.
    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, VendiaError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.failure {
            return Err(VendiaError::provider(message.clone()));
        }

        let content = self.next_response().await;
        let model = if request.model.is_empty() {
            self.model().to_string()
        } else {
            request.model
        };
        Ok(ChatResponse {
            content,
            model,
            input_tokens: 10,
            output_tokens: 20,
        })
    }
}

#[cfg(test)]
mod tests {
    use vendia_core::types::ChatMessage;

    use super::*;

    fn request() -> ChatRequest {
        ChatRequest {
            model: String::new(),
            messages: vec![ChatMessage::user("hola")],
            max_tokens: 100,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.chat(request()).await.unwrap();
        assert_eq!(resp.content, "mock response");
        assert_eq!(resp.model, "mock-model");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider =
            MockProvider::with_responses(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(provider.chat(request()).await.unwrap().content, "first");
        assert_eq!(provider.chat(request()).await.unwrap().content, "second");
        // Queue exhausted, falls back to default
        assert_eq!(
            provider.chat(request()).await.unwrap().content,
            "mock response"
        );
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn failing_provider_errors_every_call() {
        let provider = MockProvider::failing("api down");
        let err = provider.chat(request()).await.unwrap_err();
        assert!(err.to_string().contains("api down"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn add_response_after_construction() {
        let provider = MockProvider::new();
        provider.add_response("dynamic response".to_string()).await;
        assert_eq!(
            provider.chat(request()).await.unwrap().content,
            "dynamic response"
        );
    }
}
