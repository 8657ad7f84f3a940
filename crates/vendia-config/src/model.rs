// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vendia configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values, except that at least one provider slot must end up configured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VendiaConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Generation provider slots per level.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Intent classification settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Generation-tier routing thresholds.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Booking protocol settings.
    #[serde(default)]
    pub booking: BookingConfig,

    /// Usage accounting and budget settings.
    #[serde(default)]
    pub cost: CostConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "vendia".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One provider slot per level; a missing slot disables that level.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Fast, cheap model.
    #[serde(default)]
    pub l1: Option<ProviderSlotConfig>,

    /// Contextual model.
    #[serde(default)]
    pub l2: Option<ProviderSlotConfig>,

    /// Complex-reasoning model.
    #[serde(default)]
    pub l3: Option<ProviderSlotConfig>,
}

impl ProvidersConfig {
    /// Number of configured slots.
    pub fn configured(&self) -> usize {
        [&self.l1, &self.l2, &self.l3]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }
}

/// Credentials and model for one provider slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSlotConfig {
    /// API key for the slot's endpoint.
    pub api_key: String,

    /// Model identifier, e.g. "gpt-4o-mini".
    pub model: String,

    /// Endpoint override for OpenAI-compatible gateways.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Intent classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Classification cache entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval of the background cache sweep in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Generation-tier routing thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Running token count above which a conversation routes expensive.
    #[serde(default = "default_token_threshold")]
    pub token_threshold: u32,

    /// Customer value above which the customer routes expensive.
    #[serde(default = "default_vip_customer_value")]
    pub vip_customer_value: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            token_threshold: default_token_threshold(),
            vip_customer_value: default_vip_customer_value(),
        }
    }
}

fn default_token_threshold() -> u32 {
    800
}

fn default_vip_customer_value() -> f64 {
    10_000.0
}

/// Booking protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookingConfig {
    /// Lifetime of a pending booking awaiting confirmation, in seconds.
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: default_pending_ttl_secs(),
        }
    }
}

fn default_pending_ttl_secs() -> u64 {
    300
}

/// Usage accounting and budget configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Advisory daily budget in USD. `None` disables the watermark warning.
    #[serde(default)]
    pub daily_budget_usd: Option<f64>,

    /// Path of the SQLite usage ledger.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            daily_budget_usd: None,
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "vendia.db".to_string()
}
