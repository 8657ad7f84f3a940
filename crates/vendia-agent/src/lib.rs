// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration for the decision engine.

pub mod phase;
pub mod turn;

pub use phase::extract_phase_tag;
pub use turn::{BookingActivity, TurnOrchestrator, TurnOutcome, TurnRequest};
