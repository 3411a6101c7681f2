// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per entity.

pub mod documents;
pub mod instructions;
pub mod knowledge;
pub mod messages;
pub mod sessions;
