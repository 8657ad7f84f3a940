// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking safety: extraction of suggested actions from generated text and
//! the TTL-bounded two-phase commit that turns them into real appointments.

pub mod safety;
pub mod store;
pub mod suggestion;

pub use safety::{
    BookingSafety, ConfirmationOutcome, ConfirmationStatus, PendingBooking, SuggestionOutcome,
    PENDING_TTL,
};
pub use store::MemoryEphemeralStore;
pub use suggestion::{extract_suggestion, SlotProposal, SuggestedAction};
