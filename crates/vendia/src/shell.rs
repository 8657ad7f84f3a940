// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vendia shell` command implementation.
//!
//! Launches an interactive REPL that runs every line through the full turn
//! pipeline: classification, tier routing, generation with failover, and
//! the booking protocol. Usage is recorded to the SQLite ledger and a day
//! total is printed on exit.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use vendia_agent::{BookingActivity, TurnOrchestrator, TurnRequest};
use vendia_booking::{BookingSafety, MemoryEphemeralStore};
use vendia_classifier::{ClassificationCache, IntentClassifier};
use vendia_config::model::{ProviderSlotConfig, VendiaConfig};
use vendia_core::traits::{AppointmentService, EphemeralStore, GenerationProvider};
use vendia_core::types::ConversationContext;
use vendia_core::VendiaError;
use vendia_cost::{CostTracker, UsageLedger};
use vendia_openai::{OpenAiClient, OpenAiProvider};
use vendia_router::{IntelligentRouter, ModelRouter, RoutingThresholds, TierModel};

use crate::calendar::LocalCalendar;

/// Shell sessions account usage under this tenant id.
const SHELL_ORGANIZATION: &str = "local";

/// Rough token estimate for the running context counter.
fn approx_tokens(text: &str) -> u32 {
    (text.len() / 4) as u32
}

/// Runs the `vendia shell` interactive REPL.
///
/// Builds the full decision pipeline from configuration, then prompts for
/// customer messages and prints the agent reply plus a dimmed decision
/// trace per turn.
pub async fn run_shell(config: VendiaConfig) -> Result<(), VendiaError> {
    let l1 = build_slot(&config.providers.l1, "l1")?;
    let l2 = build_slot(&config.providers.l2, "l2")?;
    let l3 = build_slot(&config.providers.l3, "l3")?;

    let ledger = Arc::new(UsageLedger::open(&config.cost.database_path).await?);
    let tracker = Arc::new(CostTracker::new(
        ledger.clone() as Arc<dyn vendia_core::traits::UsageStore>,
        config.cost.daily_budget_usd,
    ));

    // Classification runs on the cheapest configured slot.
    let classify_provider = l1.clone().or_else(|| l2.clone()).or_else(|| l3.clone());

    let models = Arc::new(ModelRouter::new(
        l1.clone(),
        l2.clone(),
        l3.clone(),
        Some(tracker),
    )?);

    let cheap_slot = config
        .providers
        .l1
        .as_ref()
        .or(config.providers.l2.as_ref())
        .or(config.providers.l3.as_ref());
    let expensive_slot = config
        .providers
        .l3
        .as_ref()
        .or(config.providers.l2.as_ref())
        .or(config.providers.l1.as_ref());
    let tiers = Arc::new(IntelligentRouter::new(
        tier_model(cheap_slot),
        tier_model(expensive_slot),
        RoutingThresholds {
            token_threshold: config.routing.token_threshold,
            vip_customer_value: config.routing.vip_customer_value,
        },
    ));

    let cache = Arc::new(ClassificationCache::with_ttl(Duration::from_secs(
        config.classifier.cache_ttl_secs,
    )));
    let _sweeper = cache.spawn_sweeper(Duration::from_secs(config.classifier.sweep_interval_secs));
    let classifier = Arc::new(IntentClassifier::new(classify_provider, cache));

    let store = Arc::new(MemoryEphemeralStore::new());
    let booking = Arc::new(
        BookingSafety::new(Some(store as Arc<dyn EphemeralStore>))
            .with_pending_ttl(Duration::from_secs(config.booking.pending_ttl_secs)),
    );

    let calendar = Arc::new(LocalCalendar::new());
    let orchestrator = TurnOrchestrator::new(
        classifier.clone(),
        tiers,
        models,
        booking,
        calendar as Arc<dyn AppointmentService>,
    );

    let conversation_id = uuid::Uuid::new_v4().to_string();
    let mut context = ConversationContext {
        organization_id: Some(SHELL_ORGANIZATION.to_string()),
        ..ConversationContext::default()
    };
    info!(conversation_id = %conversation_id, "shell session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| VendiaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "vendia shell".bold().green());
    println!("Escribe {} para salir.\n", "/quit".yellow());

    let prompt = format!("{}> ", "vendia".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let request = TurnRequest {
                    conversation_id: conversation_id.clone(),
                    customer_id: SHELL_ORGANIZATION.to_string(),
                    message: trimmed.to_string(),
                    context: context.clone(),
                };

                match orchestrator.process_turn(&request).await {
                    Ok(outcome) => {
                        println!("{}", outcome.reply);
                        print_trace(&outcome);

                        context.recent_intents.push(outcome.classification.intent);
                        if context.recent_intents.len() > 10 {
                            context.recent_intents.remove(0);
                        }
                        context.history_len += 2;
                        context.approx_tokens +=
                            approx_tokens(trimmed) + approx_tokens(&outcome.reply);
                        if let Some(phase) = outcome.next_phase {
                            context.sales_phase = Some(phase);
                        }
                    }
                    Err(e) => {
                        eprintln!("{}: {e}", "error".red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    let snapshot = classifier.metrics().snapshot();
    if snapshot.total() > 0 {
        println!(
            "{}",
            format!(
                "clasificaciones: {} (llm {}, reglas {}, caché {})",
                snapshot.total(),
                snapshot.llm,
                snapshot.fallback,
                snapshot.cached
            )
            .dimmed()
        );
    }

    let today = chrono::Utc::now().date_naive();
    if let Ok(totals) = ledger
        .organization_day_totals(SHELL_ORGANIZATION, today)
        .await
    {
        if totals.requests > 0 {
            println!(
                "{}",
                format!(
                    "coste del día: ${:.4} en {} peticiones",
                    totals.cost_usd, totals.requests
                )
                .dimmed()
            );
        }
    }

    println!("{}", "hasta luego".dimmed());
    Ok(())
}

/// Builds one provider slot from config, or `None` when not configured.
fn build_slot(
    slot: &Option<ProviderSlotConfig>,
    name: &str,
) -> Result<Option<Arc<dyn GenerationProvider>>, VendiaError> {
    let Some(slot) = slot else {
        return Ok(None);
    };
    let client = OpenAiClient::new(
        slot.api_key.clone(),
        slot.model.clone(),
        slot.base_url.clone(),
    )?;
    let provider = OpenAiProvider::new(client).with_name(format!("openai-{name}"));
    Ok(Some(Arc::new(provider) as Arc<dyn GenerationProvider>))
}

/// Labels a tier with the slot that backs it. Callers guarantee at least
/// one slot is configured before this runs.
fn tier_model(slot: Option<&ProviderSlotConfig>) -> TierModel {
    match slot {
        Some(s) => TierModel {
            provider: "openai".to_string(),
            model: s.model.clone(),
        },
        None => TierModel {
            provider: "none".to_string(),
            model: String::new(),
        },
    }
}

/// Prints the dimmed per-turn decision trace.
fn print_trace(outcome: &vendia_agent::TurnOutcome) {
    let classification = &outcome.classification;
    let mut trace = format!(
        "[{} {:.2} {}]",
        classification.intent, classification.confidence, classification.method
    );
    if let Some(routing) = &outcome.routing {
        trace.push_str(&format!(" [{:?}: {}]", routing.tier, routing.reason));
    }
    match &outcome.booking {
        Some(BookingActivity::Suggested(pending)) => {
            trace.push_str(&format!(
                " [cita propuesta: {} {}]",
                pending.date, pending.time
            ));
        }
        Some(BookingActivity::Resolved(status)) => {
            trace.push_str(&format!(" [cita: {status:?}]"));
        }
        None => {}
    }
    if let Some(phase) = outcome.next_phase {
        trace.push_str(&format!(" [fase: {phase}]"));
    }
    eprintln!("{}", trace.dimmed());
}
