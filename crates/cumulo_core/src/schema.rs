/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::store::RecordStore;
use anyhow::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    #[default]
    #[serde(alias = "sqlite3")]
    Sqlite,
    Mysql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

impl DbDriver {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(DbDriver::Sqlite),
            "mysql" | "mariadb" => Some(DbDriver::Mysql),
            "postgres" | "postgresql" | "pg" => Some(DbDriver::Postgres),
            _ => None,
        }
    }
}

/// Engine specific options applied to every table the synchronizer creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Appended after the column list of `CREATE TABLE`.
    pub table_options: Option<String>,
}

impl SchemaOptions {
    pub fn for_driver(driver: DbDriver) -> Self {
        match driver {
            DbDriver::Mysql => Self {
                table_options: Some("ENGINE=InnoDB".to_string()),
            },
            DbDriver::Sqlite | DbDriver::Postgres => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static str,
    pub unique: bool,
}

/// Declarative description of one entity table. Every table also gets an
/// implicit autoincrement `id` primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
    pub indexes: &'static [IndexDef],
}

static TIMESTAMPS: [(&str, &str); 2] = [
    ("created_at_ms", "INTEGER NOT NULL DEFAULT 0"),
    ("updated_at_ms", "INTEGER NOT NULL DEFAULT 0"),
];

impl EntitySchema {
    pub fn all_columns(&self) -> impl Iterator<Item = &(&'static str, &'static str)> + '_ {
        TIMESTAMPS.iter().chain(self.columns.iter())
    }
}

pub const USER_SCHEMA: EntitySchema = EntitySchema {
    entity: "User",
    table: "users",
    columns: &[
        ("email", "TEXT NOT NULL"),
        ("nick", "TEXT NOT NULL DEFAULT ''"),
        ("password", "TEXT NOT NULL"),
        ("status", "INTEGER NOT NULL DEFAULT 0"),
        ("group_id", "INTEGER NOT NULL"),
        ("storage", "INTEGER NOT NULL DEFAULT 0"),
        ("two_factor", "TEXT NULL"),
        ("avatar", "TEXT NULL"),
        ("options", "TEXT NOT NULL DEFAULT '{}'"),
        ("authn", "TEXT NULL"),
        ("score", "INTEGER NOT NULL DEFAULT 0"),
    ],
    indexes: &[IndexDef { name: "idx_users_email", columns: "email", unique: true }],
};

pub const SETTING_SCHEMA: EntitySchema = EntitySchema {
    entity: "Setting",
    table: "settings",
    columns: &[
        ("kind", "TEXT NOT NULL"),
        ("name", "TEXT NOT NULL"),
        ("value", "TEXT NOT NULL DEFAULT ''"),
    ],
    indexes: &[IndexDef { name: "idx_settings_name", columns: "name", unique: true }],
};

pub const GROUP_SCHEMA: EntitySchema = EntitySchema {
    entity: "Group",
    table: "user_groups",
    columns: &[
        ("name", "TEXT NOT NULL"),
        ("policies", "TEXT NOT NULL DEFAULT '[]'"),
        ("max_storage", "INTEGER NOT NULL DEFAULT 0"),
        ("share_enabled", "INTEGER NOT NULL DEFAULT 0"),
        ("webdav_enabled", "INTEGER NOT NULL DEFAULT 0"),
        ("color", "TEXT NOT NULL DEFAULT ''"),
        ("options", "TEXT NOT NULL DEFAULT '{}'"),
    ],
    indexes: &[],
};

pub const POLICY_SCHEMA: EntitySchema = EntitySchema {
    entity: "Policy",
    table: "policies",
    columns: &[
        ("name", "TEXT NOT NULL"),
        ("kind", "TEXT NOT NULL"),
        ("server", "TEXT NOT NULL DEFAULT ''"),
        ("bucket_name", "TEXT NOT NULL DEFAULT ''"),
        ("is_private", "INTEGER NOT NULL DEFAULT 0"),
        ("base_url", "TEXT NOT NULL DEFAULT ''"),
        ("access_key", "TEXT NOT NULL DEFAULT ''"),
        ("secret_key", "TEXT NOT NULL DEFAULT ''"),
        ("max_size", "INTEGER NOT NULL DEFAULT 0"),
        ("auto_rename", "INTEGER NOT NULL DEFAULT 0"),
        ("dir_name_rule", "TEXT NOT NULL DEFAULT ''"),
        ("file_name_rule", "TEXT NOT NULL DEFAULT ''"),
        ("is_origin_link_enable", "INTEGER NOT NULL DEFAULT 0"),
        ("options", "TEXT NOT NULL DEFAULT '{}'"),
    ],
    indexes: &[],
};

/// The fixed entity set reconciled on every bootstrap.
pub const ENTITY_SCHEMAS: &[EntitySchema] = &[
    USER_SCHEMA,
    SETTING_SCHEMA,
    GROUP_SCHEMA,
    POLICY_SCHEMA,
    EntitySchema {
        entity: "Folder",
        table: "folders",
        columns: &[
            ("name", "TEXT NOT NULL"),
            ("parent_id", "INTEGER NULL"),
            ("owner_id", "INTEGER NOT NULL"),
        ],
        indexes: &[IndexDef { name: "idx_folders_owner_parent", columns: "owner_id, parent_id", unique: false }],
    },
    EntitySchema {
        entity: "File",
        table: "files",
        columns: &[
            ("name", "TEXT NOT NULL"),
            ("source_name", "TEXT NOT NULL"),
            ("user_id", "INTEGER NOT NULL"),
            ("size", "INTEGER NOT NULL DEFAULT 0"),
            ("pic_info", "TEXT NOT NULL DEFAULT ''"),
            ("folder_id", "INTEGER NOT NULL"),
            ("policy_id", "INTEGER NOT NULL"),
        ],
        indexes: &[IndexDef { name: "idx_files_folder", columns: "folder_id", unique: false }],
    },
    EntitySchema {
        entity: "StoragePack",
        table: "storage_packs",
        columns: &[
            ("name", "TEXT NOT NULL"),
            ("user_id", "INTEGER NOT NULL"),
            ("active_time_ms", "INTEGER NULL"),
            ("expired_time_ms", "INTEGER NULL"),
            ("size", "INTEGER NOT NULL DEFAULT 0"),
        ],
        indexes: &[],
    },
    EntitySchema {
        entity: "Share",
        table: "shares",
        columns: &[
            ("password", "TEXT NOT NULL DEFAULT ''"),
            ("is_dir", "INTEGER NOT NULL DEFAULT 0"),
            ("user_id", "INTEGER NOT NULL"),
            ("source_id", "INTEGER NOT NULL"),
            ("views", "INTEGER NOT NULL DEFAULT 0"),
            ("downloads", "INTEGER NOT NULL DEFAULT 0"),
            ("remain_downloads", "INTEGER NOT NULL DEFAULT -1"),
            ("expires_ms", "INTEGER NULL"),
            ("score", "INTEGER NOT NULL DEFAULT 0"),
            ("preview_enabled", "INTEGER NOT NULL DEFAULT 1"),
            ("source_name", "TEXT NOT NULL DEFAULT ''"),
        ],
        indexes: &[],
    },
    EntitySchema {
        entity: "Task",
        table: "tasks",
        columns: &[
            ("status", "INTEGER NOT NULL DEFAULT 0"),
            ("kind", "INTEGER NOT NULL DEFAULT 0"),
            ("user_id", "INTEGER NOT NULL"),
            ("progress", "INTEGER NOT NULL DEFAULT 0"),
            ("error", "TEXT NULL"),
            ("props", "TEXT NOT NULL DEFAULT ''"),
        ],
        indexes: &[],
    },
    EntitySchema {
        entity: "Download",
        table: "downloads",
        columns: &[
            ("status", "INTEGER NOT NULL DEFAULT 0"),
            ("kind", "INTEGER NOT NULL DEFAULT 0"),
            ("source", "TEXT NOT NULL"),
            ("total_size", "INTEGER NOT NULL DEFAULT 0"),
            ("downloaded_size", "INTEGER NOT NULL DEFAULT 0"),
            ("gid", "TEXT NOT NULL DEFAULT ''"),
            ("speed", "INTEGER NOT NULL DEFAULT 0"),
            ("parent", "TEXT NOT NULL DEFAULT ''"),
            ("attrs", "TEXT NOT NULL DEFAULT ''"),
            ("error", "TEXT NULL"),
            ("dst", "TEXT NOT NULL DEFAULT ''"),
            ("user_id", "INTEGER NOT NULL"),
            ("task_id", "INTEGER NULL"),
        ],
        indexes: &[],
    },
    EntitySchema {
        entity: "Tag",
        table: "tags",
        columns: &[
            ("name", "TEXT NOT NULL"),
            ("icon", "TEXT NOT NULL DEFAULT ''"),
            ("color", "TEXT NOT NULL DEFAULT ''"),
            ("kind", "INTEGER NOT NULL DEFAULT 0"),
            ("expression", "TEXT NOT NULL DEFAULT ''"),
            ("user_id", "INTEGER NOT NULL"),
        ],
        indexes: &[],
    },
    EntitySchema {
        entity: "Webdav",
        table: "webdavs",
        columns: &[
            ("name", "TEXT NOT NULL"),
            ("password", "TEXT NOT NULL"),
            ("user_id", "INTEGER NOT NULL"),
            ("root", "TEXT NOT NULL DEFAULT '/'"),
        ],
        indexes: &[IndexDef { name: "idx_webdavs_password_user", columns: "password, user_id", unique: true }],
    },
    EntitySchema {
        entity: "Order",
        table: "orders",
        columns: &[
            ("user_id", "INTEGER NOT NULL"),
            ("order_no", "TEXT NOT NULL"),
            ("kind", "INTEGER NOT NULL DEFAULT 0"),
            ("method", "TEXT NOT NULL DEFAULT ''"),
            ("product_id", "INTEGER NOT NULL DEFAULT 0"),
            ("num", "INTEGER NOT NULL DEFAULT 1"),
            ("name", "TEXT NOT NULL DEFAULT ''"),
            ("price", "INTEGER NOT NULL DEFAULT 0"),
            ("status", "INTEGER NOT NULL DEFAULT 0"),
        ],
        indexes: &[IndexDef { name: "idx_orders_order_no", columns: "order_no", unique: true }],
    },
    EntitySchema {
        entity: "Redeem",
        table: "redeems",
        columns: &[
            ("kind", "INTEGER NOT NULL DEFAULT 0"),
            ("product_id", "INTEGER NOT NULL DEFAULT 0"),
            ("num", "INTEGER NOT NULL DEFAULT 1"),
            ("code", "TEXT NOT NULL"),
            ("used", "INTEGER NOT NULL DEFAULT 0"),
        ],
        indexes: &[IndexDef { name: "idx_redeems_code", columns: "code", unique: true }],
    },
];

/// Reconciles every entity table with the store using the options of `driver`.
pub fn sync_schema(store: &dyn RecordStore, driver: DbDriver) -> Result<()> {
    let options = SchemaOptions::for_driver(driver);
    if let Some(opts) = &options.table_options {
        info!("schema sync: table options {opts}");
    }
    store.sync_schema(ENTITY_SCHEMAS, &options)?;
    info!("schema sync: {} entity tables reconciled", ENTITY_SCHEMAS.len());
    Ok(())
}
