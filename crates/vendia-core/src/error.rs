// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vendia decision engine.

use thiserror::Error;

/// The primary error type used across all Vendia collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum VendiaError {
    /// Configuration errors (invalid TOML, missing required fields, no provider slots).
    #[error("configuration error: {0}")]
    Config(String),

    /// Generation provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Calendar/appointment collaborator errors (availability query failure,
    /// appointment creation failure).
    #[error("calendar error: {message}")]
    Calendar {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ephemeral or persistent store errors (connection, query, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VendiaError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        VendiaError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a calendar error without an underlying source.
    pub fn calendar(message: impl Into<String>) -> Self {
        VendiaError::Calendar {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let e = VendiaError::provider("rate limited");
        assert_eq!(e.to_string(), "provider error: rate limited");

        let e = VendiaError::Config("no provider slots configured".into());
        assert!(e.to_string().contains("no provider slots"));
    }

    #[test]
    fn store_error_wraps_source() {
        let e = VendiaError::Store {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(e.to_string().contains("disk full"));
    }
}
