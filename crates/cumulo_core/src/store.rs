/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::schema::{EntitySchema, SchemaOptions};
use anyhow::Result;
use cumulo_model::{Group, Policy, Setting, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Policies,
    Groups,
    Settings,
    Users,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Policies => "policies",
            Table::Groups => "user_groups",
            Table::Settings => "settings",
            Table::Users => "users",
        }
    }
}

/// Record store capability used by the bootstrap.
///
/// Lookups return `Ok(None)` when the record does not exist and `Err` for any
/// other failure; callers rely on that distinction. `create_*` methods store a
/// non-zero `id` of the passed record as-is, let the store assign one when it
/// is zero, and return the id the record ended up with.
pub trait RecordStore: Send + Sync {
    fn sync_schema(&self, schemas: &[EntitySchema], options: &SchemaOptions) -> Result<()>;

    fn find_policy(&self, id: u64) -> Result<Option<Policy>>;
    fn create_policy(&self, policy: &Policy) -> Result<u64>;

    fn find_group(&self, id: u64) -> Result<Option<Group>>;
    fn create_group(&self, group: &Group) -> Result<u64>;

    fn find_setting(&self, name: &str) -> Result<Option<Setting>>;
    /// Inserts the row unless one with the same name exists. Returns whether a
    /// row was written; an existing row is never modified.
    fn create_setting_if_absent(&self, setting: &Setting) -> Result<bool>;

    fn find_user(&self, id: u64) -> Result<Option<User>>;
    fn create_user(&self, user: &User) -> Result<u64>;

    fn count(&self, table: Table) -> Result<u64>;
}
