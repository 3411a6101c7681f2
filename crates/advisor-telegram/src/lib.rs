// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram escalation relay for the Advisor chat backend.
//!
//! Outbound: first-contact and stuck-session notifications to the support
//! chat. Inbound: webhook commands (`/reply`, `/active`, `/help`) that let
//! an operator take over a conversation.
//!
//! The relay is optional: when bot credentials are absent every outbound
//! call is a no-op and the chat pipeline runs AI-only.

pub mod api;
pub mod commands;
pub mod markdown;
pub mod notifier;

pub use api::BotApi;
pub use commands::CommandHandler;
pub use notifier::Notifier;
