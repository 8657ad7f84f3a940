// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vendia integration tests.
//!
//! Provides mock collaborators for fast, deterministic, CI-runnable tests
//! without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with pre-configured responses
//! - [`MockCalendar`] - Mock appointment backend with scripted availability

pub mod mock_calendar;
pub mod mock_provider;

pub use mock_calendar::MockCalendar;
pub use mock_provider::MockProvider;
