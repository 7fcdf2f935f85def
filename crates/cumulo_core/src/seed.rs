/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Seeders for the baseline records a fresh deployment needs.
//!
//! Every seeder is create-if-absent. A lookup that fails for any reason other
//! than "not found" is logged and treated as present, so a transient read error
//! never produces a second copy of a record.

use crate::credential;
use crate::default_settings::{duplicate_names, DefaultSetting, SeedValue};
use crate::error::BootstrapError;
use crate::store::RecordStore;
use anyhow::Result;
use cumulo_model::{Group, GroupOptions, Policy, PolicyOptions, Setting, User, UserStatus, GIB};
use tracing::{debug, info, warn};

pub const DEFAULT_POLICY_ID: u64 = 1;
pub const ADMIN_GROUP_ID: u64 = 1;
pub const MEMBER_GROUP_ID: u64 = 2;
pub const GUEST_GROUP_ID: u64 = 3;
pub const DEFAULT_ADMIN_ID: u64 = 1;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@cumulo.local";
pub const DEFAULT_ADMIN_NICK: &str = "admin";
// Must be rotated after first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Present,
    Created(u64),
    /// Lookup failed with something other than "not found"; creation skipped.
    LookupSuppressed,
}

impl SeedOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SeedOutcome::Created(_))
    }
}

/// `None` when the record is missing and must be created, otherwise the no-op outcome.
fn existing<T>(what: &str, res: Result<Option<T>>) -> Option<SeedOutcome> {
    match res {
        Ok(Some(_)) => {
            debug!("{what} present");
            Some(SeedOutcome::Present)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("lookup of {what} failed, skipping creation: {e:#}");
            Some(SeedOutcome::LookupSuppressed)
        }
    }
}

pub fn default_policy() -> Policy {
    Policy {
        id: DEFAULT_POLICY_ID,
        name: "Default storage policy".to_string(),
        kind: "local".to_string(),
        server: "/api/v3/file/upload".to_string(),
        base_url: "http://cumulo.local/public/uploads/".to_string(),
        max_size: 10 * GIB,
        auto_rename: true,
        dir_name_rule: "uploads/{uid}/{path}".to_string(),
        file_name_rule: "{uid}_{randomkey8}_{originname}".to_string(),
        is_origin_link_enable: false,
        options: PolicyOptions { file_type: Vec::new() },
    }
}

pub fn ensure_default_policy(store: &dyn RecordStore) -> Result<SeedOutcome, BootstrapError> {
    if let Some(outcome) = existing("policy 1", store.find_policy(DEFAULT_POLICY_ID)) {
        return Ok(outcome);
    }
    let id = store
        .create_policy(&default_policy())
        .map_err(BootstrapError::CreatePolicy)?;
    info!("created default storage policy (id={id})");
    Ok(SeedOutcome::Created(id))
}

/// Canonical definition of the built-in group `id` (1, 2 or 3). Like the
/// default policy and administrator, groups keep their canonical id so a gap in
/// the table cannot shift them.
pub fn default_group(id: u64) -> Option<Group> {
    match id {
        ADMIN_GROUP_ID => Some(Group {
            id,
            name: "Admin".to_string(),
            policies: vec![DEFAULT_POLICY_ID],
            max_storage: GIB,
            share_enabled: true,
            webdav_enabled: true,
            color: "danger".to_string(),
            options: GroupOptions {
                archive_download: true,
                archive_task: true,
                share_download: true,
            },
        }),
        MEMBER_GROUP_ID => Some(Group {
            id,
            name: "User".to_string(),
            policies: vec![DEFAULT_POLICY_ID],
            max_storage: GIB,
            share_enabled: true,
            webdav_enabled: true,
            color: "danger".to_string(),
            options: GroupOptions::default(),
        }),
        GUEST_GROUP_ID => Some(Group {
            id,
            name: "Anonymous".to_string(),
            ..Group::default()
        }),
        _ => None,
    }
}

pub fn ensure_default_groups(store: &dyn RecordStore) -> Result<Vec<(u64, SeedOutcome)>, BootstrapError> {
    let mut out = Vec::with_capacity(3);
    for id in [ADMIN_GROUP_ID, MEMBER_GROUP_ID, GUEST_GROUP_ID] {
        let what = format!("group {id}");
        if let Some(outcome) = existing(&what, store.find_group(id)) {
            out.push((id, outcome));
            continue;
        }
        let Some(group) = default_group(id) else { continue };
        let created = store
            .create_group(&group)
            .map_err(|source| BootstrapError::CreateGroup { id, source })?;
        info!("created default group {} (id={created})", group.name);
        out.push((id, SeedOutcome::Created(created)));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsSeeded {
    pub created: usize,
    pub suppressed: usize,
}

/// Inserts every entry of `list` whose name is not stored yet.
pub fn ensure_default_settings(
    store: &dyn RecordStore,
    list: &[DefaultSetting],
) -> Result<SettingsSeeded, BootstrapError> {
    for name in duplicate_names(list) {
        warn!("default setting {name} listed more than once; later entries are ignored");
    }
    let mut seeded = SettingsSeeded::default();
    for entry in list {
        let value = match entry.value {
            SeedValue::Literal(v) => v.to_string(),
            SeedValue::RandomToken(len) => {
                let what = format!("setting {}", entry.name);
                match existing(&what, store.find_setting(entry.name)) {
                    Some(SeedOutcome::LookupSuppressed) => {
                        seeded.suppressed += 1;
                        continue;
                    }
                    Some(_) => continue,
                    None => credential::random_letters(len),
                }
            }
        };
        let setting = Setting::new(entry.name, value, entry.kind);
        let inserted = store
            .create_setting_if_absent(&setting)
            .map_err(|source| BootstrapError::CreateSetting {
                name: entry.name.to_string(),
                source,
            })?;
        if inserted {
            seeded.created += 1;
        }
    }
    info!(
        "default settings: {} created, {} left untouched",
        seeded.created,
        list.len() - seeded.created
    );
    Ok(seeded)
}

pub fn ensure_default_administrator(store: &dyn RecordStore) -> Result<SeedOutcome, BootstrapError> {
    if let Some(outcome) = existing("user 1", store.find_user(DEFAULT_ADMIN_ID)) {
        return Ok(outcome);
    }
    let mut user = User::new();
    user.id = DEFAULT_ADMIN_ID;
    user.email = DEFAULT_ADMIN_EMAIL.to_string();
    user.nick = DEFAULT_ADMIN_NICK.to_string();
    user.status = UserStatus::Active;
    user.group_id = ADMIN_GROUP_ID;
    user.password =
        credential::derive_password(DEFAULT_ADMIN_PASSWORD).map_err(BootstrapError::Credential)?;
    let id = store.create_user(&user).map_err(BootstrapError::CreateUser)?;
    warn!(
        "created default administrator {DEFAULT_ADMIN_EMAIL} (id={id}) with the default password; change it after first login"
    );
    Ok(SeedOutcome::Created(id))
}
