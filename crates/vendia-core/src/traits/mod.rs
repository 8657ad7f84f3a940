// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the decision engine.
//!
//! Everything behind these traits is an external collaborator: generation
//! providers, the calendar/appointment service, the shared ephemeral store,
//! and usage persistence. The decision engine never reaches past them.

pub mod calendar;
pub mod provider;
pub mod store;
pub mod usage;

pub use calendar::{
    AppointmentRecord, AppointmentService, ConflictCheck, CreateAppointment, SlotAvailability,
};
pub use provider::GenerationProvider;
pub use store::EphemeralStore;
pub use usage::{UsageDelta, UsageKey, UsageStore};
