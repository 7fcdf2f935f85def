/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};

pub const GIB: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PolicyOptions {
    /// Allowed file extensions; empty means any.
    #[serde(default)]
    pub file_type: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Policy {
    pub id: u64,
    pub name: String,
    /// Storage backend type, e.g. `local`.
    pub kind: String,
    pub server: String,
    pub base_url: String,
    pub max_size: u64,
    pub auto_rename: bool,
    pub dir_name_rule: String,
    pub file_name_rule: String,
    pub is_origin_link_enable: bool,
    #[serde(default)]
    pub options: PolicyOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GroupOptions {
    #[serde(default)]
    pub archive_download: bool,
    #[serde(default)]
    pub archive_task: bool,
    #[serde(default)]
    pub share_download: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    /// Ids of the storage policies members may upload to.
    #[serde(default)]
    pub policies: Vec<u64>,
    pub max_storage: u64,
    pub share_enabled: bool,
    pub webdav_enabled: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub options: GroupOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Setting {
    pub name: String,
    pub value: String,
    /// Category tag (`basic`, `mail`, `timeout`, ...).
    pub kind: String,
}

impl Setting {
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind: kind.into(),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active = 0,
    NotActivated = 1,
    Baned = 2,
    OveruseBaned = 3,
}

impl UserStatus {
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Active),
            1 => Some(Self::NotActivated),
            2 => Some(Self::Baned),
            3 => Some(Self::OveruseBaned),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserOptions {
    #[serde(default)]
    pub profile_off: bool,
    #[serde(default)]
    pub preferred_theme: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub nick: String,
    /// `salt:digest`, never the plaintext.
    pub password: String,
    pub status: UserStatus,
    pub group_id: u64,
    /// Bytes currently used.
    pub storage: u64,
    #[serde(default)]
    pub options: UserOptions,
}

impl User {
    /// Fresh account with defaults; id is assigned by the store on create.
    pub fn new() -> Self {
        Self {
            id: 0,
            email: String::new(),
            nick: String::new(),
            password: String::new(),
            status: UserStatus::NotActivated,
            group_id: 0,
            storage: 0,
            options: UserOptions::default(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
