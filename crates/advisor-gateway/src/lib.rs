// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Advisor chat backend, built on axum.
//!
//! Three surfaces share one router: the widget API (chat + message
//! polling), the Telegram webhook, and the admin console API (sessions,
//! knowledge base, documents, system instructions).

pub mod admin;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use server::{GatewayState, router, start_server};
