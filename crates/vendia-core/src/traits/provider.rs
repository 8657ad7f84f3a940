// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation provider trait for LLM integrations (OpenAI-compatible APIs, etc.).

use async_trait::async_trait;

use crate::error::VendiaError;
use crate::types::{ChatRequest, ChatResponse};

/// A single generation backend behind one provider slot.
///
/// Providers never execute side effects: they only produce text (which may
/// embed suggested actions that the booking layer validates and commits).
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Human-readable provider name used in routing decisions and usage records.
    fn name(&self) -> &str;

    /// Default model identifier this provider slot answers with.
    fn model(&self) -> &str;

    /// Sends a chat completion request and returns the full response.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, VendiaError>;
}
