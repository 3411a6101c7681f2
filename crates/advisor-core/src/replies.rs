// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical visitor-facing reply strings.
//!
//! These live in the core crate because both sides of the wire need them:
//! the orchestrator emits them and the widget client recognizes them.

/// Internal token the model emits to request human escalation. Stripped
/// before the reply reaches the visitor.
pub const ESCALATION_MARKER: &str = "[NEED_HUMAN]";

/// Visitor-facing reply when the LLM call fails.
pub const FALLBACK_REPLY: &str =
    "I am currently experiencing high traffic. Please try again later.";

/// Appended to the reply when the model requests escalation.
pub const HANDOFF_ACK: &str =
    "I'm connecting you with a team member who can help. They'll reply here shortly.";

/// Fixed reply for visitor messages sent while handoff is active.
pub const FORWARDED_REPLY: &str =
    "Your message has been forwarded to our team. A team member will reply here shortly.";
