// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar/appointment collaborator trait.
//!
//! The booking safety layer validates against and commits to this service;
//! it never books directly from generated text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VendiaError;

/// Answer to a slot availability query.
#[derive(Debug, Clone)]
pub struct SlotAvailability {
    pub available: bool,
    /// Optional human-readable detail (e.g. "outside business hours").
    pub message: Option<String>,
}

/// Answer to a customer conflict check.
///
/// The collaborator applies its own proximity window (±29 minutes around the
/// proposed slot) against the customer's existing appointments.
#[derive(Debug, Clone)]
pub struct ConflictCheck {
    pub has_conflict: bool,
    pub existing_time: Option<DateTime<Utc>>,
}

/// Parameters for creating a confirmed appointment.
///
/// `request_id` is the idempotency key threaded from the original suggestion;
/// the collaborator must treat a replayed id as a no-op returning the
/// existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub customer_id: String,
    pub conversation_id: String,
    pub start_time: DateTime<Utc>,
    pub title: String,
    pub request_id: String,
}

/// A persisted appointment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub customer_id: String,
    pub start_time: DateTime<Utc>,
    pub title: String,
}

/// External calendar/appointment service.
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Checks whether the given slot is bookable.
    async fn check_slot_availability(
        &self,
        datetime: DateTime<Utc>,
    ) -> Result<SlotAvailability, VendiaError>;

    /// Checks whether the customer already holds an appointment near the slot.
    async fn check_customer_conflicts(
        &self,
        customer_id: &str,
        datetime: DateTime<Utc>,
    ) -> Result<ConflictCheck, VendiaError>;

    /// Creates a confirmed appointment. Idempotent per `request_id`.
    async fn create_appointment(
        &self,
        params: CreateAppointment,
    ) -> Result<AppointmentRecord, VendiaError>;
}
