// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-phase booking protocol over chat turns.
//!
//! Per-conversation state machine: NONE -> PENDING -> {CONFIRMED, DECLINED,
//! SLOT_LOST, ERROR} -> NONE. The pending record lives in the shared
//! ephemeral store under a conversation-scoped key with a fixed TTL; every
//! terminal transition deletes it. The generation backend only suggests;
//! nothing is committed to the calendar without a validated pending record
//! and an explicit confirmation intent.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vendia_core::traits::{AppointmentRecord, AppointmentService, CreateAppointment, EphemeralStore};
use vendia_core::types::Intent;

use crate::suggestion::{extract_suggestion, SuggestedAction};

/// Default lifetime of a pending booking awaiting confirmation.
pub const PENDING_TTL: Duration = Duration::from_secs(300);

/// A validated slot proposal awaiting the customer's yes/no.
///
/// Source of truth is the ephemeral store; at most one per conversation
/// (key overwrite, never append).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingBooking {
    /// Idempotency key threaded from suggestion to appointment creation.
    pub request_id: String,
    pub customer_id: String,
    pub conversation_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Clarification turns consumed while pending.
    pub attempts: u32,
    /// Absolute expiry fixed when the record is first locked. Clarification
    /// rewrites keep it, so the TTL clock never restarts.
    pub expires_at: DateTime<Utc>,
}

impl PendingBooking {
    fn start_time(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

/// Result of scanning one generated reply for a booking suggestion.
#[derive(Debug, Clone)]
pub struct SuggestionOutcome {
    /// User-visible text with any suggestion payload stripped.
    pub content: String,
    /// Whether a pending record was durably written.
    pub has_pending_booking: bool,
    pub pending: Option<PendingBooking>,
}

/// Terminal or holding state reached by a confirmation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed,
    SlotLost,
    Cancelled,
    /// No transition; the customer said something other than yes or no.
    Clarify,
    Error,
}

/// Outcome of handling a turn while a booking is pending.
#[derive(Debug, Clone)]
pub struct ConfirmationOutcome {
    pub status: ConfirmationStatus,
    pub content: String,
    pub appointment: Option<AppointmentRecord>,
}

fn pending_key(conversation_id: &str) -> String {
    format!("booking:pending:{conversation_id}")
}

/// Orchestrates the suggest/validate/lock/confirm protocol.
pub struct BookingSafety {
    store: Option<Arc<dyn EphemeralStore>>,
    pending_ttl: Duration,
}

impl BookingSafety {
    /// `store = None` means no durable pending records can be written; the
    /// layer degrades to validate-only and never commits bookings.
    pub fn new(store: Option<Arc<dyn EphemeralStore>>) -> Self {
        Self {
            store,
            pending_ttl: PENDING_TTL,
        }
    }

    /// Overrides the pending-record lifetime.
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }

    /// Scans generated text for a booking suggestion and, when the proposed
    /// slot survives validation, locks it as a pending record.
    ///
    /// Validation short-circuits on the first failure and leaves all state
    /// untouched: format, then slot availability, then customer conflict.
    /// The suggestion payload is always stripped from the returned text.
    pub async fn process_suggestion(
        &self,
        text: &str,
        conversation_id: &str,
        customer_id: &str,
        calendar: &dyn AppointmentService,
    ) -> SuggestionOutcome {
        let Some((action, content)) = extract_suggestion(text) else {
            return SuggestionOutcome {
                content: text.to_string(),
                has_pending_booking: false,
                pending: None,
            };
        };

        let Some(pending) = self
            .validate_proposal(&action, conversation_id, customer_id, calendar)
            .await
        else {
            return SuggestionOutcome {
                content,
                has_pending_booking: false,
                pending: None,
            };
        };

        let Some(store) = &self.store else {
            warn!(
                conversation_id,
                "ephemeral store unavailable, suggestion validated but not locked"
            );
            return SuggestionOutcome {
                content,
                has_pending_booking: false,
                pending: None,
            };
        };

        let serialized = match serde_json::to_string(&pending) {
            Ok(s) => s,
            Err(e) => {
                warn!(conversation_id, error = %e, "failed to serialize pending booking");
                return SuggestionOutcome {
                    content,
                    has_pending_booking: false,
                    pending: None,
                };
            }
        };

        if let Err(e) = store
            .set_ex(&pending_key(conversation_id), &serialized, self.pending_ttl)
            .await
        {
            warn!(conversation_id, error = %e, "failed to write pending booking");
            return SuggestionOutcome {
                content,
                has_pending_booking: false,
                pending: None,
            };
        }

        info!(
            conversation_id,
            request_id = %pending.request_id,
            date = %pending.date,
            time = %pending.time,
            "booking pending confirmation"
        );
        SuggestionOutcome {
            content,
            has_pending_booking: true,
            pending: Some(pending),
        }
    }

    /// Validates format, availability, and conflicts. `None` on any failure.
    async fn validate_proposal(
        &self,
        action: &SuggestedAction,
        conversation_id: &str,
        customer_id: &str,
        calendar: &dyn AppointmentService,
    ) -> Option<PendingBooking> {
        let proposal = action.proposals.first()?;
        let date = NaiveDate::parse_from_str(&proposal.date, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(&proposal.time, "%H:%M").ok()?;

        let pending = PendingBooking {
            request_id: action.client_request_id.clone(),
            customer_id: customer_id.to_string(),
            conversation_id: conversation_id.to_string(),
            date,
            time,
            attempts: 0,
            expires_at: Utc::now() + chrono::Duration::seconds(self.pending_ttl.as_secs() as i64),
        };
        let start = pending.start_time();

        match calendar.check_slot_availability(start).await {
            Ok(slot) if slot.available => {}
            Ok(slot) => {
                debug!(
                    conversation_id,
                    message = slot.message.as_deref().unwrap_or(""),
                    "suggested slot unavailable"
                );
                return None;
            }
            Err(e) => {
                warn!(conversation_id, error = %e, "availability check failed");
                return None;
            }
        }

        match calendar.check_customer_conflicts(customer_id, start).await {
            Ok(check) if !check.has_conflict => Some(pending),
            Ok(check) => {
                debug!(
                    conversation_id,
                    existing = ?check.existing_time,
                    "customer already has a nearby appointment"
                );
                None
            }
            Err(e) => {
                warn!(conversation_id, error = %e, "conflict check failed");
                None
            }
        }
    }

    /// Handles a customer turn while a booking may be pending.
    ///
    /// Returns `None` when nothing is pending for the conversation. A
    /// confirmation re-validates availability before committing (race
    /// guard); a slot taken in the meantime produces `SlotLost`, never a
    /// stale booking. Clarification turns increment the stored `attempts`
    /// counter but rewrite the record with only its remaining lifetime, so
    /// an unresponsive customer still silently loses the offer at the
    /// original expiry.
    pub async fn handle_confirmation(
        &self,
        conversation_id: &str,
        intent: Intent,
        calendar: &dyn AppointmentService,
    ) -> Option<ConfirmationOutcome> {
        let store = self.store.as_ref()?;
        let key = pending_key(conversation_id);

        let raw = match store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(conversation_id, error = %e, "failed to read pending booking");
                return None;
            }
        };
        let pending: PendingBooking = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(conversation_id, error = %e, "corrupt pending booking, discarding");
                self.delete_pending(store, &key).await;
                return None;
            }
        };

        match intent {
            Intent::Confirmation => Some(self.commit(store, &key, pending, calendar).await),
            Intent::Negation => {
                self.delete_pending(store, &key).await;
                info!(conversation_id, "pending booking declined");
                Some(ConfirmationOutcome {
                    status: ConfirmationStatus::Cancelled,
                    content: "Sin problema, queda descartada esa hora. ¿Qué día y horario te \
                              acomodan mejor?"
                        .to_string(),
                    appointment: None,
                })
            }
            _ => {
                let mut pending = pending;
                pending.attempts += 1;
                self.rewrite_pending(store, &key, &pending).await;
                Some(ConfirmationOutcome {
                    status: ConfirmationStatus::Clarify,
                    content: format!(
                        "Tengo reservado provisionalmente el {} a las {}. ¿Me confirmas con un \
                         sí o un no?",
                        pending.date, pending.time
                    ),
                    appointment: None,
                })
            }
        }
    }

    async fn commit(
        &self,
        store: &Arc<dyn EphemeralStore>,
        key: &str,
        pending: PendingBooking,
        calendar: &dyn AppointmentService,
    ) -> ConfirmationOutcome {
        let start = pending.start_time();

        // Race guard: the slot may have been taken since the suggestion.
        let still_available = match calendar.check_slot_availability(start).await {
            Ok(slot) => slot.available,
            Err(e) => {
                warn!(error = %e, "re-validation failed, treating slot as lost");
                false
            }
        };
        if !still_available {
            self.delete_pending(store, key).await;
            info!(request_id = %pending.request_id, "slot lost before confirmation");
            return ConfirmationOutcome {
                status: ConfirmationStatus::SlotLost,
                content: "Lo siento, ese horario acaba de ocuparse. ¿Te propongo otra hora \
                          cercana?"
                    .to_string(),
                appointment: None,
            };
        }

        let params = CreateAppointment {
            customer_id: pending.customer_id.clone(),
            conversation_id: pending.conversation_id.clone(),
            start_time: start,
            title: "Cita agendada por asistente".to_string(),
            request_id: pending.request_id.clone(),
        };

        match calendar.create_appointment(params).await {
            Ok(appointment) => {
                self.delete_pending(store, key).await;
                info!(
                    request_id = %pending.request_id,
                    appointment_id = %appointment.id,
                    "booking confirmed"
                );
                ConfirmationOutcome {
                    status: ConfirmationStatus::Confirmed,
                    content: format!(
                        "¡Listo! Tu cita quedó confirmada para el {} a las {}.",
                        pending.date, pending.time
                    ),
                    appointment: Some(appointment),
                }
            }
            Err(e) => {
                // Side-effecting step failed; surface a retry prompt rather
                // than leaving a pending record the customer believes booked.
                self.delete_pending(store, key).await;
                warn!(request_id = %pending.request_id, error = %e, "appointment creation failed");
                ConfirmationOutcome {
                    status: ConfirmationStatus::Error,
                    content: "No pude completar la reserva en este momento. ¿Quieres que lo \
                              intentemos de nuevo?"
                        .to_string(),
                    appointment: None,
                }
            }
        }
    }

    /// Rewrites the pending record in place with its remaining lifetime.
    /// Best-effort: a failed rewrite leaves the previous record standing.
    async fn rewrite_pending(
        &self,
        store: &Arc<dyn EphemeralStore>,
        key: &str,
        pending: &PendingBooking,
    ) {
        let Ok(remaining) = (pending.expires_at - Utc::now()).to_std() else {
            // Already past expiry; let the store-side TTL finish the job.
            return;
        };
        if remaining.is_zero() {
            return;
        }
        match serde_json::to_string(pending) {
            Ok(serialized) => {
                if let Err(e) = store.set_ex(key, &serialized, remaining).await {
                    warn!(key, error = %e, "failed to update pending booking");
                }
            }
            Err(e) => warn!(key, error = %e, "failed to serialize pending booking"),
        }
    }

    async fn delete_pending(&self, store: &Arc<dyn EphemeralStore>, key: &str) {
        if let Err(e) = store.delete(key).await {
            warn!(key, error = %e, "failed to delete pending booking");
        }
    }
}
