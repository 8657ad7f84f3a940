// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vendia decision engine.
//!
//! This crate provides the foundational collaborator traits, error types, and
//! domain types used throughout the Vendia workspace. All external services
//! (generation providers, calendar, ephemeral store, usage persistence) are
//! consumed through traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VendiaError;
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, ChatRole, ClassificationMethod,
    ClassificationResult, ConversationContext, Entities, Intent, ProviderLevel, SalesPhase,
};

// Re-export all collaborator traits at crate root.
pub use traits::{AppointmentService, EphemeralStore, GenerationProvider, UsageStore};
