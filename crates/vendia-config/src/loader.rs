// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./vendia.toml` > `~/.config/vendia/vendia.toml` >
//! `/etc/vendia/vendia.toml` with environment variable overrides via the
//! `VENDIA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VendiaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vendia/vendia.toml` (system-wide)
/// 3. `~/.config/vendia/vendia.toml` (user XDG config)
/// 4. `./vendia.toml` (local directory)
/// 5. `VENDIA_*` environment variables
pub fn load_config() -> Result<VendiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VendiaConfig::default()))
        .merge(Toml::file("/etc/vendia/vendia.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vendia/vendia.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("vendia.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<VendiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VendiaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VendiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VendiaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VENDIA_PROVIDERS_L1_API_KEY` must map
/// to `providers.l1.api_key`, not `providers.l1.api.key`.
fn env_provider() -> Env {
    Env::prefixed("VENDIA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("providers_l1_", "providers.l1.", 1)
            .replacen("providers_l2_", "providers.l2.", 1)
            .replacen("providers_l3_", "providers.l3.", 1)
            .replacen("classifier_", "classifier.", 1)
            .replacen("routing_", "routing.", 1)
            .replacen("booking_", "booking.", 1)
            .replacen("cost_", "cost.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "vendia");
        assert_eq!(config.classifier.cache_ttl_secs, 300);
        assert_eq!(config.routing.token_threshold, 800);
        assert_eq!(config.providers.configured(), 0);
    }

    #[test]
    fn provider_slots_parse() {
        let config = load_config_from_str(
            r#"
            [providers.l1]
            api_key = "sk-test"
            model = "gpt-4o-mini"

            [providers.l3]
            api_key = "sk-test"
            model = "gpt-4o"
            base_url = "https://gateway.example.com/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.providers.configured(), 2);
        let l3 = config.providers.l3.unwrap();
        assert_eq!(l3.model, "gpt-4o");
        assert_eq!(l3.base_url.as_deref(), Some("https://gateway.example.com/v1"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
            [agent]
            naem = "oops"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn env_vars_override_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "vendia.toml",
                r#"
                [agent]
                name = "from-file"
                log_level = "warn"
                "#,
            )?;
            jail.set_env("VENDIA_AGENT_LOG_LEVEL", "debug");
            jail.set_env("VENDIA_PROVIDERS_L1_API_KEY", "sk-env");
            jail.set_env("VENDIA_PROVIDERS_L1_MODEL", "gpt-4o-mini");
            jail.set_env("VENDIA_COST_DAILY_BUDGET_USD", "12.5");

            let config = load_config_from_path(&jail.directory().join("vendia.toml"))?;
            // File value survives where no env var overlaps.
            assert_eq!(config.agent.name, "from-file");
            // Section mapping: AGENT_LOG_LEVEL lands on agent.log_level,
            // not agent.log.level.
            assert_eq!(config.agent.log_level, "debug");
            let l1 = config.providers.l1.expect("l1 slot built from env alone");
            assert_eq!(l1.api_key, "sk-env");
            assert_eq!(l1.model, "gpt-4o-mini");
            assert_eq!(config.cost.daily_budget_usd, Some(12.5));
            Ok(())
        });
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = load_config_from_str(
            r#"
            [classifier]
            cache_ttl_secs = 30

            [cost]
            daily_budget_usd = 25.0
            "#,
        )
        .unwrap();
        assert_eq!(config.classifier.cache_ttl_secs, 30);
        assert_eq!(config.cost.daily_budget_usd, Some(25.0));
    }
}
