// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Visitor-side client for the Advisor chat gateway.
//!
//! [`WidgetSession`] is an explicit context object owned by the embedding
//! UI; there is no module-global session. It keeps a local transcript,
//! reuses a stored session token when the server confirms it is still
//! live, and while a human handoff is active runs a cancellable poll task
//! that merges operator replies into the transcript.

pub mod client;
pub mod session;

pub use client::{ChatOutcome, WidgetClient, WidgetConfig};
pub use session::{WidgetMessage, WidgetSession};
