// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as the at-least-one-provider requirement and
//! non-negative budgets.

use crate::diagnostic::ConfigError;
use crate::model::VendiaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VendiaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Zero configured generation providers is fatal at startup.
    if config.providers.configured() == 0 {
        errors.push(ConfigError::Validation {
            message: "no generation providers configured; add at least one of \
                      [providers.l1], [providers.l2], [providers.l3]"
                .to_string(),
        });
    }

    for (name, slot) in [
        ("l1", &config.providers.l1),
        ("l2", &config.providers.l2),
        ("l3", &config.providers.l3),
    ] {
        let Some(slot) = slot else { continue };
        if slot.api_key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name}.api_key must not be empty"),
            });
        }
        if slot.model.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("providers.{name}.model must not be empty"),
            });
        }
    }

    if let Some(daily) = config.cost.daily_budget_usd {
        if daily < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("cost.daily_budget_usd must be non-negative, got {daily}"),
            });
        }
    }

    if config.cost.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cost.database_path must not be empty".to_string(),
        });
    }

    if config.classifier.cache_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "classifier.cache_ttl_secs must be positive".to_string(),
        });
    }

    if config.booking.pending_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "booking.pending_ttl_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::ProviderSlotConfig;

    use super::*;

    fn config_with_l1() -> VendiaConfig {
        let mut config = VendiaConfig::default();
        config.providers.l1 = Some(ProviderSlotConfig {
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        });
        config
    }

    #[test]
    fn single_slot_config_validates() {
        assert!(validate_config(&config_with_l1()).is_ok());
    }

    #[test]
    fn zero_providers_fails_validation() {
        let errors = validate_config(&VendiaConfig::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("no generation providers")));
    }

    #[test]
    fn empty_api_key_fails_validation() {
        let mut config = config_with_l1();
        config.providers.l1.as_mut().unwrap().api_key = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("providers.l1.api_key")));
    }

    #[test]
    fn negative_budget_fails_validation() {
        let mut config = config_with_l1();
        config.cost.daily_budget_usd = Some(-1.0);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("daily_budget_usd")));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = VendiaConfig::default();
        config.cost.daily_budget_usd = Some(-1.0);
        config.classifier.cache_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
