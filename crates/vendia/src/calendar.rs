// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process appointment book for the local shell.
//!
//! Production deployments wire a real calendar backend behind
//! `AppointmentService`; the shell keeps its bookings in memory for the
//! lifetime of the session.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use vendia_core::traits::{
    AppointmentRecord, AppointmentService, ConflictCheck, CreateAppointment, SlotAvailability,
};
use vendia_core::VendiaError;

/// Proximity window for the customer conflict check.
const CONFLICT_WINDOW_MINUTES: i64 = 29;

/// Bookable hours, inclusive start and exclusive end, in UTC.
const OPEN_HOUR: u32 = 9;
const CLOSE_HOUR: u32 = 19;

/// In-memory `AppointmentService`, keyed by idempotency request id.
pub struct LocalCalendar {
    appointments: Mutex<HashMap<String, AppointmentRecord>>,
}

impl LocalCalendar {
    pub fn new() -> Self {
        Self {
            appointments: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LocalCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentService for LocalCalendar {
    async fn check_slot_availability(
        &self,
        datetime: DateTime<Utc>,
    ) -> Result<SlotAvailability, VendiaError> {
        let hour = datetime.hour();
        if hour < OPEN_HOUR || hour >= CLOSE_HOUR {
            return Ok(SlotAvailability {
                available: false,
                message: Some(format!(
                    "fuera del horario de atención ({OPEN_HOUR}:00-{CLOSE_HOUR}:00)"
                )),
            });
        }

        let appointments = self
            .appointments
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let taken = appointments.values().any(|a| a.start_time == datetime);
        Ok(SlotAvailability {
            available: !taken,
            message: taken.then(|| "ese horario ya está ocupado".to_string()),
        })
    }

    async fn check_customer_conflicts(
        &self,
        customer_id: &str,
        datetime: DateTime<Utc>,
    ) -> Result<ConflictCheck, VendiaError> {
        let window = Duration::minutes(CONFLICT_WINDOW_MINUTES);
        let appointments = self
            .appointments
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let existing = appointments
            .values()
            .filter(|a| a.customer_id == customer_id)
            .find(|a| (a.start_time - datetime).abs() <= window);
        Ok(ConflictCheck {
            has_conflict: existing.is_some(),
            existing_time: existing.map(|a| a.start_time),
        })
    }

    async fn create_appointment(
        &self,
        params: CreateAppointment,
    ) -> Result<AppointmentRecord, VendiaError> {
        let mut appointments = self
            .appointments
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = appointments.get(&params.request_id) {
            return Ok(existing.clone());
        }
        let record = AppointmentRecord {
            id: params.request_id.clone(),
            customer_id: params.customer_id,
            start_time: params.start_time,
            title: params.title,
        };
        appointments.insert(params.request_id, record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn slot(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0).unwrap()
    }

    fn params(request_id: &str, start: DateTime<Utc>) -> CreateAppointment {
        CreateAppointment {
            customer_id: "cust-1".into(),
            conversation_id: "conv-1".into(),
            start_time: start,
            title: "cita".into(),
            request_id: request_id.into(),
        }
    }

    #[tokio::test]
    async fn off_hours_slot_is_unavailable() {
        let calendar = LocalCalendar::new();
        let check = calendar.check_slot_availability(slot(22)).await.unwrap();
        assert!(!check.available);
    }

    #[tokio::test]
    async fn taken_slot_is_unavailable() {
        let calendar = LocalCalendar::new();
        calendar
            .create_appointment(params("req-1", slot(10)))
            .await
            .unwrap();
        let check = calendar.check_slot_availability(slot(10)).await.unwrap();
        assert!(!check.available);
        assert!(calendar.check_slot_availability(slot(11)).await.unwrap().available);
    }

    #[tokio::test]
    async fn nearby_appointment_conflicts() {
        let calendar = LocalCalendar::new();
        calendar
            .create_appointment(params("req-1", slot(10)))
            .await
            .unwrap();

        let near = Utc.with_ymd_and_hms(2026, 3, 4, 10, 20, 0).unwrap();
        let check = calendar
            .check_customer_conflicts("cust-1", near)
            .await
            .unwrap();
        assert!(check.has_conflict);
        assert_eq!(check.existing_time, Some(slot(10)));

        let far = slot(12);
        let check = calendar
            .check_customer_conflicts("cust-1", far)
            .await
            .unwrap();
        assert!(!check.has_conflict);

        let other = calendar
            .check_customer_conflicts("cust-2", near)
            .await
            .unwrap();
        assert!(!other.has_conflict);
    }

    #[tokio::test]
    async fn replayed_request_id_returns_existing_record() {
        let calendar = LocalCalendar::new();
        let first = calendar
            .create_appointment(params("req-1", slot(10)))
            .await
            .unwrap();
        let replay = calendar
            .create_appointment(params("req-1", slot(15)))
            .await
            .unwrap();
        assert_eq!(replay.id, first.id);
        assert_eq!(replay.start_time, first.start_time);
    }
}
