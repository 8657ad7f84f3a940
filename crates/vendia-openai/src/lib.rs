// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible generation provider.
//!
//! Wraps [`OpenAiClient`] behind the `GenerationProvider` trait so the
//! model router can slot it into any tier.

pub mod client;
pub mod types;

use async_trait::async_trait;
use vendia_core::traits::GenerationProvider;
use vendia_core::types::{ChatRequest, ChatResponse};
use vendia_core::VendiaError;

pub use client::OpenAiClient;
use types::{ApiMessage, CompletionRequest};

/// `GenerationProvider` backed by an OpenAI-compatible endpoint.
pub struct OpenAiProvider {
    client: OpenAiClient,
    name: String,
}

impl OpenAiProvider {
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            client,
            name: "openai".to_string(),
        }
    }

    /// Names the provider slot for logs and usage records, e.g. "openai-l2".
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        self.client.default_model()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, VendiaError> {
        let model = if request.model.is_empty() {
            self.client.default_model().to_string()
        } else {
            request.model
        };

        let api_request = CompletionRequest {
            model: model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self.client.complete(&api_request).await?;
        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| VendiaError::provider("completion response had no content"))?;

        Ok(ChatResponse {
            content,
            model: response.model,
            input_tokens: response.usage.prompt_tokens,
            output_tokens: response.usage.completion_tokens,
        })
    }
}
