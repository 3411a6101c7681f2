// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response orchestration for the Advisor chat backend.
//!
//! Each visitor turn runs through a small state machine: normal AI replies,
//! a needs-help flag on low-confidence turns, and a human-handoff mode in
//! which messages bypass the LLM and go straight to the escalation relay.

pub mod confidence;
pub mod orchestrator;
pub mod prompt;

pub use confidence::{ConfidenceEvaluator, Verdict, evaluator_for};
pub use orchestrator::{ChatReply, Orchestrator};
