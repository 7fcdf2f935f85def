/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! In-process `RecordStore` with a call journal and fault injection.
//!
//! Built for tests only: compiled under `cfg(test)` or with the `testing` feature.

use crate::schema::{EntitySchema, SchemaOptions};
use crate::store::{RecordStore, Table};
use anyhow::{bail, Result};
use cumulo_model::{Group, Policy, Setting, User};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    SyncSchema,
    FindPolicy(u64),
    CreatePolicy,
    FindGroup(u64),
    CreateGroup(u64),
    FindSetting(String),
    CreateSetting(String),
    FindUser(u64),
    CreateUser,
    Count(Table),
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::SyncSchema
                | StoreCall::CreatePolicy
                | StoreCall::CreateGroup(_)
                | StoreCall::CreateSetting(_)
                | StoreCall::CreateUser
        )
    }
}

/// Calls that fail with an error every time they are made once injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    SyncSchema,
    FindPolicy,
    CreatePolicy,
    FindGroup(u64),
    CreateGroup(u64),
    FindSetting(String),
    CreateSetting(String),
    FindUser,
    CreateUser,
}

#[derive(Default)]
struct Inner {
    policies: BTreeMap<u64, Policy>,
    groups: BTreeMap<u64, Group>,
    settings: BTreeMap<String, Setting>,
    users: BTreeMap<u64, User>,
    calls: Vec<StoreCall>,
    faults: Vec<Fault>,
    syncs: Vec<(Vec<&'static str>, SchemaOptions)>,
}

impl Inner {
    fn record(&mut self, call: StoreCall, fault: Option<Fault>) -> Result<()> {
        self.calls.push(call);
        if let Some(fault) = fault {
            if self.faults.contains(&fault) {
                bail!("injected fault: {fault:?}");
            }
        }
        Ok(())
    }
}

fn assign_id<T>(table: &BTreeMap<u64, T>, requested: u64, what: &str) -> Result<u64> {
    if requested == 0 {
        return Ok(table.keys().next_back().map_or(1, |max| max + 1));
    }
    if table.contains_key(&requested) {
        bail!("UNIQUE constraint failed: {what}.id ({requested})");
    }
    Ok(requested)
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn inject(&self, fault: Fault) {
        self.lock().faults.push(fault);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Tables and options passed to every `sync_schema` call so far.
    pub fn schema_syncs(&self) -> Vec<(Vec<&'static str>, SchemaOptions)> {
        self.lock().syncs.clone()
    }
}

impl RecordStore for MemoryStore {
    fn sync_schema(&self, schemas: &[EntitySchema], options: &SchemaOptions) -> Result<()> {
        let mut inner = self.lock();
        inner.record(StoreCall::SyncSchema, Some(Fault::SyncSchema))?;
        let tables = schemas.iter().map(|s| s.table).collect();
        inner.syncs.push((tables, options.clone()));
        Ok(())
    }

    fn find_policy(&self, id: u64) -> Result<Option<Policy>> {
        let mut inner = self.lock();
        inner.record(StoreCall::FindPolicy(id), Some(Fault::FindPolicy))?;
        Ok(inner.policies.get(&id).cloned())
    }

    fn create_policy(&self, policy: &Policy) -> Result<u64> {
        let mut inner = self.lock();
        inner.record(StoreCall::CreatePolicy, Some(Fault::CreatePolicy))?;
        let id = assign_id(&inner.policies, policy.id, "policies")?;
        inner.policies.insert(id, Policy { id, ..policy.clone() });
        Ok(id)
    }

    fn find_group(&self, id: u64) -> Result<Option<Group>> {
        let mut inner = self.lock();
        inner.record(StoreCall::FindGroup(id), Some(Fault::FindGroup(id)))?;
        Ok(inner.groups.get(&id).cloned())
    }

    fn create_group(&self, group: &Group) -> Result<u64> {
        let mut inner = self.lock();
        inner.record(StoreCall::CreateGroup(group.id), Some(Fault::CreateGroup(group.id)))?;
        let id = assign_id(&inner.groups, group.id, "user_groups")?;
        inner.groups.insert(id, Group { id, ..group.clone() });
        Ok(id)
    }

    fn find_setting(&self, name: &str) -> Result<Option<Setting>> {
        let mut inner = self.lock();
        inner.record(
            StoreCall::FindSetting(name.to_string()),
            Some(Fault::FindSetting(name.to_string())),
        )?;
        Ok(inner.settings.get(name).cloned())
    }

    fn create_setting_if_absent(&self, setting: &Setting) -> Result<bool> {
        let mut inner = self.lock();
        inner.record(
            StoreCall::CreateSetting(setting.name.clone()),
            Some(Fault::CreateSetting(setting.name.clone())),
        )?;
        if inner.settings.contains_key(&setting.name) {
            return Ok(false);
        }
        inner.settings.insert(setting.name.clone(), setting.clone());
        Ok(true)
    }

    fn find_user(&self, id: u64) -> Result<Option<User>> {
        let mut inner = self.lock();
        inner.record(StoreCall::FindUser(id), Some(Fault::FindUser))?;
        Ok(inner.users.get(&id).cloned())
    }

    fn create_user(&self, user: &User) -> Result<u64> {
        let mut inner = self.lock();
        inner.record(StoreCall::CreateUser, Some(Fault::CreateUser))?;
        if inner.users.values().any(|u| u.email == user.email) {
            bail!("UNIQUE constraint failed: users.email");
        }
        let id = assign_id(&inner.users, user.id, "users")?;
        inner.users.insert(id, User { id, ..user.clone() });
        Ok(id)
    }

    fn count(&self, table: Table) -> Result<u64> {
        let mut inner = self.lock();
        inner.record(StoreCall::Count(table), None)?;
        let n = match table {
            Table::Policies => inner.policies.len(),
            Table::Groups => inner.groups.len(),
            Table::Settings => inner.settings.len(),
            Table::Users => inner.users.len(),
        };
        Ok(n as u64)
    }
}
