/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::schema::{EntitySchema, SchemaOptions};
use crate::store::{RecordStore, Table};
use anyhow::{Context, Result};
use cumulo_model::{Group, GroupOptions, Policy, PolicyOptions, Setting, User, UserOptions, UserStatus};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone)]
pub struct SqliteStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteStore {
    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir: {}", parent.display()))?;
        }
        let store = Self { path, busy_timeout };
        let conn = store.conn()?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("open db: {}", self.path.display()))?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}

impl RecordStore for SqliteStore {
    fn sync_schema(&self, schemas: &[EntitySchema], options: &SchemaOptions) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for schema in schemas {
            let cols = schema
                .all_columns()
                .map(|(name, ty)| format!("{name} {ty}"))
                .collect::<Vec<_>>()
                .join(", ");
            let suffix = options
                .table_options
                .as_deref()
                .map(|o| format!(" {o}"))
                .unwrap_or_default();
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {cols}){suffix};",
                schema.table
            ))
            .with_context(|| format!("create table {}", schema.table))?;
            let declared = schema.all_columns().copied().collect::<Vec<_>>();
            ensure_columns(&tx, schema.table, &declared)?;
            for idx in schema.indexes {
                let unique = if idx.unique { "UNIQUE " } else { "" };
                tx.execute_batch(&format!(
                    "CREATE {unique}INDEX IF NOT EXISTS {} ON {}({});",
                    idx.name, schema.table, idx.columns
                ))
                .with_context(|| format!("create index {}", idx.name))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn find_policy(&self, id: u64) -> Result<Option<Policy>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, name, kind, server, base_url, max_size, auto_rename, dir_name_rule, file_name_rule, is_origin_link_enable, options FROM policies WHERE id=?1",
                params![id as i64],
                |r| {
                    Ok((
                        Policy {
                            id: r.get::<_, i64>(0)? as u64,
                            name: r.get(1)?,
                            kind: r.get(2)?,
                            server: r.get(3)?,
                            base_url: r.get(4)?,
                            max_size: r.get::<_, i64>(5)? as u64,
                            auto_rename: r.get::<_, i64>(6)? != 0,
                            dir_name_rule: r.get(7)?,
                            file_name_rule: r.get(8)?,
                            is_origin_link_enable: r.get::<_, i64>(9)? != 0,
                            options: PolicyOptions::default(),
                        },
                        r.get::<_, String>(10)?,
                    ))
                },
            )
            .optional()?;
        let Some((mut policy, options)) = row else { return Ok(None) };
        policy.options = serde_json::from_str(&options)
            .with_context(|| format!("decode options of policy {id}"))?;
        Ok(Some(policy))
    }

    fn create_policy(&self, policy: &Policy) -> Result<u64> {
        let conn = self.conn()?;
        let now = now_ms();
        conn.execute(
            r#"
            INSERT INTO policies(id, name, kind, server, base_url, max_size, auto_rename, dir_name_rule, file_name_rule, is_origin_link_enable, options, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            "#,
            params![
                requested_id(policy.id),
                policy.name,
                policy.kind,
                policy.server,
                policy.base_url,
                policy.max_size as i64,
                if policy.auto_rename { 1 } else { 0 },
                policy.dir_name_rule,
                policy.file_name_rule,
                if policy.is_origin_link_enable { 1 } else { 0 },
                serde_json::to_string(&policy.options)?,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn find_group(&self, id: u64) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, name, policies, max_storage, share_enabled, webdav_enabled, color, options FROM user_groups WHERE id=?1",
                params![id as i64],
                |r| {
                    Ok((
                        Group {
                            id: r.get::<_, i64>(0)? as u64,
                            name: r.get(1)?,
                            policies: Vec::new(),
                            max_storage: r.get::<_, i64>(3)? as u64,
                            share_enabled: r.get::<_, i64>(4)? != 0,
                            webdav_enabled: r.get::<_, i64>(5)? != 0,
                            color: r.get(6)?,
                            options: GroupOptions::default(),
                        },
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;
        let Some((mut group, policies, options)) = row else { return Ok(None) };
        group.policies = serde_json::from_str(&policies)
            .with_context(|| format!("decode policy list of group {id}"))?;
        group.options = serde_json::from_str(&options)
            .with_context(|| format!("decode options of group {id}"))?;
        Ok(Some(group))
    }

    fn create_group(&self, group: &Group) -> Result<u64> {
        let conn = self.conn()?;
        let now = now_ms();
        conn.execute(
            r#"
            INSERT INTO user_groups(id, name, policies, max_storage, share_enabled, webdav_enabled, color, options, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                requested_id(group.id),
                group.name,
                serde_json::to_string(&group.policies)?,
                group.max_storage as i64,
                if group.share_enabled { 1 } else { 0 },
                if group.webdav_enabled { 1 } else { 0 },
                group.color,
                serde_json::to_string(&group.options)?,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn find_setting(&self, name: &str) -> Result<Option<Setting>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT name, value, kind FROM settings WHERE name=?1",
            params![name],
            |r| {
                Ok(Setting {
                    name: r.get(0)?,
                    value: r.get(1)?,
                    kind: r.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    fn create_setting_if_absent(&self, setting: &Setting) -> Result<bool> {
        let conn = self.conn()?;
        let now = now_ms();
        let n = conn.execute(
            r#"
            INSERT INTO settings(kind, name, value, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(name) DO NOTHING
            "#,
            params![setting.kind, setting.name, setting.value, now],
        )?;
        Ok(n > 0)
    }

    fn find_user(&self, id: u64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, email, nick, password, status, group_id, storage, options FROM users WHERE id=?1",
                params![id as i64],
                |r| {
                    Ok((
                        r.get::<_, i64>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, i64>(4)?,
                        r.get::<_, i64>(5)?,
                        r.get::<_, i64>(6)?,
                        r.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;
        let Some((uid, email, nick, password, status, group_id, storage, options)) = row else {
            return Ok(None);
        };
        let status = UserStatus::from_i64(status)
            .with_context(|| format!("user {id} has unknown status {status}"))?;
        let options: UserOptions = serde_json::from_str(&options)
            .with_context(|| format!("decode options of user {id}"))?;
        Ok(Some(User {
            id: uid as u64,
            email,
            nick,
            password,
            status,
            group_id: group_id as u64,
            storage: storage as u64,
            options,
        }))
    }

    fn create_user(&self, user: &User) -> Result<u64> {
        let conn = self.conn()?;
        let now = now_ms();
        conn.execute(
            r#"
            INSERT INTO users(id, email, nick, password, status, group_id, storage, options, created_at_ms, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                requested_id(user.id),
                user.email,
                user.nick,
                user.password,
                user.status.as_i64(),
                user.group_id as i64,
                user.storage as i64,
                serde_json::to_string(&user.options)?,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn count(&self, table: Table) -> Result<u64> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |r| r.get(0),
        )?;
        Ok(total as u64)
    }
}

/// NULL lets SQLite assign the rowid.
fn requested_id(id: u64) -> Option<i64> {
    (id != 0).then_some(id as i64)
}

/// Adds declared columns that are missing physically. `NOT NULL` columns added
/// to an existing table get a zero value default, SQLite rejects them otherwise.
fn ensure_columns(conn: &Connection, table: &str, cols: &[(&str, &str)]) -> Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut existing = std::collections::HashSet::new();
    for r in rows {
        existing.insert(r?);
    }
    for (name, ty) in cols {
        if !existing.contains(*name) {
            let ty = addable_column_type(ty);
            conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {name} {ty}"), [])
                .with_context(|| format!("add column {table}.{name}"))?;
        }
    }
    Ok(())
}

fn addable_column_type(ty: &str) -> String {
    let upper = ty.to_ascii_uppercase();
    if !upper.contains("NOT NULL") || upper.contains("DEFAULT") {
        return ty.to_string();
    }
    if upper.starts_with("INTEGER") {
        format!("{ty} DEFAULT 0")
    } else {
        format!("{ty} DEFAULT ''")
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
