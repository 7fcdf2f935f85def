/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod bootstrap;
pub mod config;
pub mod credential;
pub mod default_settings;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory_store;
pub mod schema;
pub mod seed;
pub mod sqlite_store;
pub mod store;
pub mod version_lock;

pub use bootstrap::{run, BootstrapContext, BootstrapOutcome, BootstrapStage, SeedReport};
pub use error::BootstrapError;
pub use store::{RecordStore, Table};
