/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::bootstrap::BootstrapStage;
use thiserror::Error;

/// Unrecoverable bootstrap failures. The process must not keep serving after one.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("schema sync failed: {0:#}")]
    SchemaSync(#[source] anyhow::Error),

    #[error("cannot create default storage policy: {0:#}")]
    CreatePolicy(#[source] anyhow::Error),

    #[error("cannot create default group {id}: {source:#}")]
    CreateGroup {
        id: u64,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot create setting {name}: {source:#}")]
    CreateSetting {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot derive administrator credential: {0:#}")]
    Credential(#[source] anyhow::Error),

    #[error("cannot create default administrator: {0:#}")]
    CreateUser(#[source] anyhow::Error),
}

impl BootstrapError {
    /// Last stage completed before the abort.
    pub fn stage(&self) -> BootstrapStage {
        match self {
            BootstrapError::SchemaSync(_) => BootstrapStage::GateChecked,
            BootstrapError::CreatePolicy(_) => BootstrapStage::SchemaSynced,
            BootstrapError::CreateGroup { .. } => BootstrapStage::PolicySeeded,
            BootstrapError::CreateSetting { .. } => BootstrapStage::GroupsSeeded,
            BootstrapError::Credential(_) | BootstrapError::CreateUser(_) => {
                BootstrapStage::SettingsSeeded
            }
        }
    }
}
