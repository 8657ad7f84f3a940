// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock appointment backend with scripted availability and conflicts.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vendia_core::traits::{
    AppointmentRecord, AppointmentService, ConflictCheck, CreateAppointment, SlotAvailability,
};
use vendia_core::VendiaError;

/// Scriptable in-memory `AppointmentService`.
///
/// Defaults to every slot available, no conflicts, and successful creation.
/// Creation is idempotent per `request_id`, matching the real contract.
pub struct MockCalendar {
    available: AtomicBool,
    conflict_time: Mutex<Option<DateTime<Utc>>>,
    fail_creation: AtomicBool,
    created: Mutex<Vec<AppointmentRecord>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            conflict_time: Mutex::new(None),
            fail_creation: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Script whether slot checks report availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Script a standing conflict at `existing_time` for every customer.
    pub fn set_conflict(&self, existing_time: Option<DateTime<Utc>>) {
        *self.conflict_time.lock().unwrap() = existing_time;
    }

    /// Script creation failures.
    pub fn set_fail_creation(&self, fail: bool) {
        self.fail_creation.store(fail, Ordering::Relaxed);
    }

    /// Snapshot of every appointment created so far.
    pub fn created(&self) -> Vec<AppointmentRecord> {
        self.created.lock().unwrap().clone()
    }
}

impl Default for MockCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentService for MockCalendar {
    async fn check_slot_availability(
        &self,
        _datetime: DateTime<Utc>,
    ) -> Result<SlotAvailability, VendiaError> {
        let available = self.available.load(Ordering::Relaxed);
        Ok(SlotAvailability {
            available,
            message: (!available).then(|| "slot taken".to_string()),
        })
    }

    async fn check_customer_conflicts(
        &self,
        _customer_id: &str,
        _datetime: DateTime<Utc>,
    ) -> Result<ConflictCheck, VendiaError> {
        let existing_time = *self.conflict_time.lock().unwrap();
        Ok(ConflictCheck {
            has_conflict: existing_time.is_some(),
            existing_time,
        })
    }

    async fn create_appointment(
        &self,
        params: CreateAppointment,
    ) -> Result<AppointmentRecord, VendiaError> {
        if self.fail_creation.load(Ordering::Relaxed) {
            return Err(VendiaError::calendar("calendar backend unavailable"));
        }

        let mut created = self.created.lock().unwrap();
        // Idempotency: a replayed request_id returns the existing record.
        if let Some(existing) = created.iter().find(|r| r.id == params.request_id) {
            return Ok(existing.clone());
        }

        let record = AppointmentRecord {
            id: params.request_id.clone(),
            customer_id: params.customer_id,
            start_time: params.start_time,
            title: params.title,
        };
        created.push(record.clone());
        Ok(record)
    }
}
