// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn orchestration.
//!
//! One inbound customer message flows classify -> confirmation check ->
//! tier selection -> generation -> phase tag -> booking suggestion. The
//! decision functions stay pure; the only awaited I/O is the LLM call, the
//! calendar checks, and the ephemeral store. Non-critical side paths
//! (usage tracking, metrics) swallow their own failures; a generation
//! failure after the full failover chain is the one error that surfaces.

use std::sync::Arc;

use tracing::info;
use vendia_booking::{BookingSafety, ConfirmationStatus, PendingBooking};
use vendia_classifier::IntentClassifier;
use vendia_core::traits::AppointmentService;
use vendia_core::types::{
    ChatMessage, ClassificationResult, ConversationContext, ProviderLevel, SalesPhase,
};
use vendia_core::VendiaError;
use vendia_router::{ChatOptions, GenerationTier, IntelligentRouter, ModelRouter, RoutingDecision};

use crate::phase::extract_phase_tag;

/// Reply token budget per turn.
const REPLY_MAX_TOKENS: u32 = 1024;

/// One inbound customer message with its conversation state.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub conversation_id: String,
    pub customer_id: String,
    pub message: String,
    pub context: ConversationContext,
}

/// Booking-related outcome of a turn, when the turn touched the protocol.
#[derive(Debug, Clone)]
pub enum BookingActivity {
    /// A suggestion in the generated reply was locked as pending.
    Suggested(PendingBooking),
    /// A pending booking reached a confirmation-path state this turn.
    Resolved(ConfirmationStatus),
}

/// Everything a channel adapter needs to act on one processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub classification: ClassificationResult,
    /// Absent when a pending-booking turn short-circuited generation.
    pub routing: Option<RoutingDecision>,
    pub booking: Option<BookingActivity>,
    /// Phase advance signaled by the generated reply, if any.
    pub next_phase: Option<SalesPhase>,
}

/// Composes classifier, routers, and booking safety per inbound message.
pub struct TurnOrchestrator {
    classifier: Arc<IntentClassifier>,
    tiers: Arc<IntelligentRouter>,
    models: Arc<ModelRouter>,
    booking: Arc<BookingSafety>,
    calendar: Arc<dyn AppointmentService>,
}

impl TurnOrchestrator {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        tiers: Arc<IntelligentRouter>,
        models: Arc<ModelRouter>,
        booking: Arc<BookingSafety>,
        calendar: Arc<dyn AppointmentService>,
    ) -> Self {
        Self {
            classifier,
            tiers,
            models,
            booking,
            calendar,
        }
    }

    /// Processes one inbound message to a reply.
    ///
    /// A turn with a pending booking and a decisive or ambiguous answer is
    /// resolved by the booking protocol directly, without generation.
    pub async fn process_turn(&self, request: &TurnRequest) -> Result<TurnOutcome, VendiaError> {
        let classification = self
            .classifier
            .classify(&request.message, &request.context)
            .await;

        if let Some(outcome) = self
            .booking
            .handle_confirmation(
                &request.conversation_id,
                classification.intent,
                self.calendar.as_ref(),
            )
            .await
        {
            info!(
                conversation_id = %request.conversation_id,
                status = ?outcome.status,
                "turn resolved by booking protocol"
            );
            return Ok(TurnOutcome {
                reply: outcome.content,
                classification,
                routing: None,
                booking: Some(BookingActivity::Resolved(outcome.status)),
                next_phase: None,
            });
        }

        let routing = self
            .tiers
            .select_model(classification.intent, &request.context);
        info!(
            conversation_id = %request.conversation_id,
            intent = %classification.intent,
            tier = ?routing.tier,
            reason = routing.reason,
            "generation tier selected"
        );

        let level = match routing.tier {
            GenerationTier::Cheap => ProviderLevel::L1,
            GenerationTier::Expensive => ProviderLevel::L3,
        };
        let options = ChatOptions {
            level: Some(level),
            max_tokens: REPLY_MAX_TOKENS,
            temperature: None,
            organization_id: request.context.organization_id.clone(),
        };
        let messages = vec![
            ChatMessage::system(system_prompt(&request.context)),
            ChatMessage::user(&request.message),
        ];

        let routed = self
            .models
            .chat(messages, options, &request.context)
            .await?;

        let (next_phase, reply) = extract_phase_tag(&routed.response.content);

        let suggestion = self
            .booking
            .process_suggestion(
                &reply,
                &request.conversation_id,
                &request.customer_id,
                self.calendar.as_ref(),
            )
            .await;

        Ok(TurnOutcome {
            reply: suggestion.content,
            classification,
            routing: Some(routing),
            booking: suggestion
                .pending
                .filter(|_| suggestion.has_pending_booking)
                .map(BookingActivity::Suggested),
            next_phase,
        })
    }
}

/// Fixed generation persona plus the structured-output conventions the
/// decision layer extracts afterwards.
fn system_prompt(context: &ConversationContext) -> String {
    let mut prompt = String::from(
        "Eres un asistente comercial que atiende clientes por chat en español. \
         Responde de forma breve y natural. Cuando quieras proponer una cita \
         concreta, incluye al final un objeto JSON con la forma \
         {\"type\":\"suggested_action\",\"action\":\"book_appointment\",\
         \"client_request_id\":\"<uuid>\",\"proposals\":[{\"date\":\"YYYY-MM-DD\",\
         \"time\":\"HH:MM\"}],\"confidence\":0.0-1.0}. Nunca des una cita por \
         confirmada sin que el cliente diga que sí. Si la conversación avanza \
         de etapa, añade una etiqueta [PHASE:NOMBRE] al final.",
    );
    if let Some(phase) = context.sales_phase {
        prompt.push_str(&format!(" Etapa actual: {phase}."));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use vendia_booking::MemoryEphemeralStore;
    use vendia_core::traits::{EphemeralStore, GenerationProvider};
    use vendia_core::types::Intent;
    use vendia_router::{RoutingThresholds, TierModel};
    use vendia_test_utils::{MockCalendar, MockProvider};

    use super::*;

    struct Harness {
        orchestrator: TurnOrchestrator,
        calendar: Arc<MockCalendar>,
        store: Arc<MemoryEphemeralStore>,
    }

    fn harness(replies: Vec<&str>) -> Harness {
        let provider: Arc<dyn GenerationProvider> = Arc::new(MockProvider::with_responses(
            replies.into_iter().map(String::from).collect(),
        ));
        let models = Arc::new(
            ModelRouter::new(Some(provider.clone()), None, Some(provider), None).unwrap(),
        );
        let tiers = Arc::new(IntelligentRouter::new(
            TierModel {
                provider: "mock".into(),
                model: "mock-cheap".into(),
            },
            TierModel {
                provider: "mock".into(),
                model: "mock-expensive".into(),
            },
            RoutingThresholds::default(),
        ));
        let store = Arc::new(MemoryEphemeralStore::new());
        let booking = Arc::new(BookingSafety::new(Some(
            store.clone() as Arc<dyn EphemeralStore>
        )));
        let calendar = Arc::new(MockCalendar::new());
        let classifier = Arc::new(IntentClassifier::new(
            None,
            Arc::new(vendia_classifier::ClassificationCache::new()),
        ));
        Harness {
            orchestrator: TurnOrchestrator::new(
                classifier,
                tiers,
                models,
                booking,
                calendar.clone() as Arc<dyn AppointmentService>,
            ),
            calendar,
            store,
        }
    }

    impl Harness {
        fn request(&self, message: &str) -> TurnRequest {
            TurnRequest {
                conversation_id: "conv-1".into(),
                customer_id: "cust-1".into(),
                message: message.into(),
                context: ConversationContext::default(),
            }
        }
    }

    fn suggestion_reply(request_id: &str) -> String {
        format!(
            r#"Te propongo el miércoles a las 3. {{"type":"suggested_action","action":"book_appointment","client_request_id":"{request_id}","proposals":[{{"date":"2026-03-04","time":"15:00"}}],"confidence":0.9}}"#
        )
    }

    #[tokio::test]
    async fn plain_turn_classifies_routes_and_replies() {
        let h = harness(vec!["¡Hola! ¿En qué puedo ayudarte?"]);
        let outcome = h
            .orchestrator
            .process_turn(&h.request("hola"))
            .await
            .unwrap();

        assert_eq!(outcome.classification.intent, Intent::Greeting);
        let routing = outcome.routing.unwrap();
        assert_eq!(routing.reason, "always_simple");
        assert_eq!(outcome.reply, "¡Hola! ¿En qué puedo ayudarte?");
        assert!(outcome.booking.is_none());
    }

    #[tokio::test]
    async fn phase_tag_is_extracted_and_stripped() {
        let h = harness(vec!["Entiendo el problema. [PHASE:IMPLICATION]"]);
        let outcome = h
            .orchestrator
            .process_turn(&h.request("quiero información del producto"))
            .await
            .unwrap();

        assert_eq!(outcome.next_phase, Some(SalesPhase::Implication));
        assert_eq!(outcome.reply, "Entiendo el problema.");
    }

    #[tokio::test]
    async fn suggestion_in_reply_locks_pending_booking() {
        let h = harness(vec![&suggestion_reply("req-1")]);
        let outcome = h
            .orchestrator
            .process_turn(&h.request("quisiera una cita"))
            .await
            .unwrap();

        assert!(matches!(
            outcome.booking,
            Some(BookingActivity::Suggested(ref p)) if p.request_id == "req-1"
        ));
        assert!(!outcome.reply.contains("suggested_action"));
        assert!(h
            .store
            .get("booking:pending:conv-1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn confirmation_turn_short_circuits_generation() {
        let h = harness(vec![&suggestion_reply("req-1")]);
        h.orchestrator
            .process_turn(&h.request("quisiera una cita"))
            .await
            .unwrap();

        // "sí" resolves the pending booking without calling the provider.
        let outcome = h
            .orchestrator
            .process_turn(&h.request("sí, perfecto"))
            .await
            .unwrap();
        assert!(matches!(
            outcome.booking,
            Some(BookingActivity::Resolved(ConfirmationStatus::Confirmed))
        ));
        assert!(outcome.routing.is_none());
        assert_eq!(h.calendar.created().len(), 1);
        assert_eq!(h.calendar.created()[0].id, "req-1");
    }

    #[tokio::test]
    async fn declined_booking_prompts_for_alternative() {
        let h = harness(vec![&suggestion_reply("req-1")]);
        h.orchestrator
            .process_turn(&h.request("quisiera una cita"))
            .await
            .unwrap();

        let outcome = h
            .orchestrator
            .process_turn(&h.request("no, gracias"))
            .await
            .unwrap();
        assert!(matches!(
            outcome.booking,
            Some(BookingActivity::Resolved(ConfirmationStatus::Cancelled))
        ));
        assert!(h.calendar.created().is_empty());
    }
}
