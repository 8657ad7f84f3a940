// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost estimation.
//!
//! Rates are USD per million tokens, verified against public provider price
//! lists on 2026-07-01.

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone)]
pub struct ModelPricing {
    /// Cost per million input tokens.
    pub input_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_per_mtok: f64,
}

/// Look up pricing for a given model identifier.
///
/// Matches on substrings so dated model snapshots resolve without a table
/// update. Unknown models fall back to mid-tier pricing so cost tracking
/// never silently drops records.
pub fn get_pricing(model: &str) -> ModelPricing {
    let lower = model.to_lowercase();

    if lower.contains("gpt-4o-mini") || lower.contains("haiku") || lower.contains("flash") {
        ModelPricing {
            input_per_mtok: 0.15,
            output_per_mtok: 0.60,
        }
    } else if lower.contains("opus") || lower.contains("o1") {
        ModelPricing {
            input_per_mtok: 15.0,
            output_per_mtok: 60.0,
        }
    } else if lower.contains("sonnet") {
        ModelPricing {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        }
    } else {
        // Default to gpt-4o class pricing (including unknown models).
        ModelPricing {
            input_per_mtok: 2.50,
            output_per_mtok: 10.0,
        }
    }
}

/// Estimate cost in USD for a completed generation call.
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let pricing = get_pricing(model);
    let input = (input_tokens as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (output_tokens as f64 / 1_000_000.0) * pricing.output_per_mtok;
    input + output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mini_pricing() {
        let p = get_pricing("gpt-4o-mini-2024-07-18");
        assert!((p.input_per_mtok - 0.15).abs() < f64::EPSILON);
        assert!((p.output_per_mtok - 0.60).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let p = get_pricing("totally-new-model");
        assert!((p.input_per_mtok - 2.50).abs() < f64::EPSILON);
        assert!((p.output_per_mtok - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_sums_input_and_output() {
        // input: 1000/1M * 2.50 = 0.0025
        // output: 500/1M * 10.0 = 0.005
        let cost = estimate_cost("gpt-4o", 1000, 500);
        assert!((cost - 0.0075).abs() < 1e-10, "expected 0.0075, got {cost}");
    }

    #[test]
    fn zero_tokens_zero_cost() {
        assert!((estimate_cost("gpt-4o", 0, 0) - 0.0).abs() < f64::EPSILON);
    }
}
