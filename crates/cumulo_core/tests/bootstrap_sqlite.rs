/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use cumulo_core::bootstrap::{run, BootstrapContext, BootstrapOutcome, SeedReport};
use cumulo_core::credential::verify_password;
use cumulo_core::default_settings::DEFAULT_SETTINGS;
use cumulo_core::schema::DbDriver;
use cumulo_core::seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
use cumulo_core::sqlite_store::SqliteStore;
use cumulo_core::store::{RecordStore, Table};
use cumulo_core::version_lock::{RunMode, VersionLock};
use cumulo_model::{Setting, UserStatus};
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: SqliteStore,
    lock: VersionLock,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("data/cumulo.db"), Duration::from_secs(2)).unwrap();
    let lock = VersionLock::new(dir.path().join("version.lock"));
    Fixture { _dir: dir, store, lock }
}

fn ctx(f: &Fixture, version: &str, mode: RunMode) -> BootstrapContext {
    BootstrapContext::new(f.lock.clone(), version, mode, DbDriver::Sqlite)
}

fn completed(outcome: BootstrapOutcome) -> SeedReport {
    match outcome {
        BootstrapOutcome::Completed(report) => report,
        BootstrapOutcome::Skipped => panic!("expected the bootstrap to run"),
    }
}

fn counts(store: &SqliteStore) -> Vec<u64> {
    [Table::Policies, Table::Groups, Table::Settings, Table::Users]
        .into_iter()
        .map(|t| store.count(t).unwrap())
        .collect()
}

#[test]
fn fresh_install_leaves_usable_administrator() {
    let f = fixture();
    let report = completed(run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap());
    assert!(report.lock_written);
    assert_eq!(counts(&f.store), vec![1, 3, DEFAULT_SETTINGS.len() as u64, 1]);

    let admin = f.store.find_user(1).unwrap().unwrap();
    assert_eq!(admin.email, DEFAULT_ADMIN_EMAIL);
    assert_eq!(admin.status, UserStatus::Active);
    assert_eq!(admin.group_id, 1);
    assert!(verify_password(&admin.password, DEFAULT_ADMIN_PASSWORD));
    assert!(!verify_password(&admin.password, "not-the-password"));

    let admin_group = f.store.find_group(1).unwrap().unwrap();
    assert_eq!(admin_group.name, "Admin");
    assert_eq!(admin_group.policies, vec![1]);
    assert!(admin_group.options.archive_download);
    assert_eq!(f.store.find_group(3).unwrap().unwrap().name, "Anonymous");

    let secret = f.store.find_setting("secret_key").unwrap().unwrap();
    assert_eq!(secret.value.len(), 256);
    assert_eq!(f.lock.read().unwrap(), "3.5.0");
}

#[test]
fn warm_restart_with_same_version_does_nothing() {
    let f = fixture();
    run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap();
    let before = counts(&f.store);
    let outcome = run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap();
    assert_eq!(outcome, BootstrapOutcome::Skipped);
    assert_eq!(counts(&f.store), before);
}

#[test]
fn upgrade_keeps_operator_changes() {
    let f = fixture();
    run(&f.store, &ctx(&f, "3.4.0", RunMode::default())).unwrap();
    let secret = f.store.find_setting("secret_key").unwrap().unwrap().value;

    // Operator edits a setting and the admin password between releases.
    let conn = rusqlite::Connection::open(f.store.path()).unwrap();
    conn.execute("UPDATE settings SET value = 'My cloud' WHERE name = 'siteName'", [])
        .unwrap();
    conn.execute("UPDATE users SET password = 'salt:custom' WHERE id = 1", [])
        .unwrap();
    drop(conn);

    let report = completed(run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap());
    assert_eq!(report.settings_created, 0);
    assert!(!report.administrator.is_created());
    assert_eq!(f.store.find_setting("siteName").unwrap().unwrap().value, "My cloud");
    assert_eq!(f.store.find_setting("secret_key").unwrap().unwrap().value, secret);
    assert_eq!(f.store.find_user(1).unwrap().unwrap().password, "salt:custom");
    assert_eq!(f.lock.read().unwrap(), "3.5.0");
}

#[test]
fn forced_mode_reruns_without_duplicates() {
    let f = fixture();
    let debug = RunMode { debug: true, test: false };
    run(&f.store, &ctx(&f, "3.5.0", debug)).unwrap();
    let before = counts(&f.store);
    let report = completed(run(&f.store, &ctx(&f, "3.5.0", debug)).unwrap());
    assert!(report.groups.iter().all(|(_, o)| !o.is_created()));
    assert_eq!(counts(&f.store), before);
}

#[test]
fn missing_rows_are_restored() {
    let f = fixture();
    run(&f.store, &ctx(&f, "3.4.0", RunMode::default())).unwrap();

    let conn = rusqlite::Connection::open(f.store.path()).unwrap();
    conn.execute("DELETE FROM user_groups WHERE id = 2", []).unwrap();
    conn.execute("DELETE FROM settings WHERE name = 'register_enabled'", [])
        .unwrap();
    drop(conn);
    assert!(f
        .store
        .create_setting_if_absent(&Setting::new("custom_flag", "1", "basic"))
        .unwrap());

    let report = completed(run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap());
    assert_eq!(report.settings_created, 1);
    assert!(report.groups.contains(&(2, cumulo_core::seed::SeedOutcome::Created(2))));
    assert_eq!(f.store.find_group(2).unwrap().unwrap().name, "User");
    assert!(f.store.find_setting("register_enabled").unwrap().is_some());
    assert_eq!(f.store.count(Table::Settings).unwrap(), DEFAULT_SETTINGS.len() as u64 + 1);
}

#[test]
fn deleted_policy_and_administrator_return_under_id_one() {
    let f = fixture();
    let debug = RunMode { debug: true, test: false };
    run(&f.store, &ctx(&f, "3.5.0", debug)).unwrap();

    let conn = rusqlite::Connection::open(f.store.path()).unwrap();
    conn.execute("DELETE FROM policies WHERE id = 1", []).unwrap();
    conn.execute("DELETE FROM users WHERE id = 1", []).unwrap();
    drop(conn);

    for _ in 0..2 {
        run(&f.store, &ctx(&f, "3.5.0", debug)).unwrap();
        assert!(f.store.find_policy(1).unwrap().is_some());
        let admin = f.store.find_user(1).unwrap().unwrap();
        assert_eq!(admin.email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(f.store.count(Table::Policies).unwrap(), 1);
        assert_eq!(f.store.count(Table::Users).unwrap(), 1);
    }
    assert_eq!(f.store.find_group(2).unwrap().unwrap().policies, vec![1]);
}

#[test]
fn store_error_aborts_without_lock() {
    let f = fixture();
    // A view named like a table makes schema creation fail.
    let conn = rusqlite::Connection::open(f.store.path()).unwrap();
    conn.execute_batch("CREATE VIEW users AS SELECT 1 AS id;").unwrap();
    drop(conn);

    let err = run(&f.store, &ctx(&f, "3.5.0", RunMode::default())).unwrap_err();
    assert!(matches!(err, cumulo_core::BootstrapError::SchemaSync(_)));
    assert!(f.lock.read().is_err());
}
