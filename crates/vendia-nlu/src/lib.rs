// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic Spanish-language understanding: relative date and time
//! parsing plus the regex fallback classifier.

pub mod datetime;
pub mod fallback;

pub use fallback::FallbackClassifier;
