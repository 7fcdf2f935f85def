/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Startup bootstrap: version gate, schema sync, baseline seeding, version lock.

use crate::default_settings::{DefaultSetting, DEFAULT_SETTINGS};
use crate::error::BootstrapError;
use crate::schema::{self, DbDriver};
use crate::seed::{self, SeedOutcome};
use crate::store::RecordStore;
use crate::version_lock::{should_migrate, RunMode, VersionLock};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    NotStarted,
    GateChecked,
    SchemaSynced,
    PolicySeeded,
    GroupsSeeded,
    SettingsSeeded,
    UserSeeded,
    LockWritten,
    SkippedByGate,
    AbortedFatal,
}

#[derive(Debug, Clone)]
pub struct BootstrapContext {
    pub lock: VersionLock,
    pub build_version: String,
    pub mode: RunMode,
    pub driver: DbDriver,
    pub settings: &'static [DefaultSetting],
}

impl BootstrapContext {
    pub fn new(lock: VersionLock, build_version: impl Into<String>, mode: RunMode, driver: DbDriver) -> Self {
        Self {
            lock,
            build_version: build_version.into(),
            mode,
            driver,
            settings: DEFAULT_SETTINGS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub policy: SeedOutcome,
    pub groups: Vec<(u64, SeedOutcome)>,
    pub settings_created: usize,
    pub administrator: SeedOutcome,
    pub lock_written: bool,
    /// Lookups that failed with something other than "not found".
    pub suppressed_lookups: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Skipped,
    Completed(SeedReport),
}

impl BootstrapOutcome {
    pub fn stage(&self) -> BootstrapStage {
        match self {
            BootstrapOutcome::Skipped => BootstrapStage::SkippedByGate,
            BootstrapOutcome::Completed(_) => BootstrapStage::LockWritten,
        }
    }
}

fn reached(stage: BootstrapStage) {
    info!("bootstrap stage reached: {stage:?}");
}

/// Runs the bootstrap once. Returns on the first fatal error and leaves
/// whatever was already seeded in place; every step is safe to repeat.
pub fn run(store: &dyn RecordStore, ctx: &BootstrapContext) -> Result<BootstrapOutcome, BootstrapError> {
    if !should_migrate(&ctx.lock, &ctx.build_version, ctx.mode) {
        info!("version lock matches {}, skipping bootstrap", ctx.build_version);
        reached(BootstrapStage::SkippedByGate);
        return Ok(BootstrapOutcome::Skipped);
    }
    reached(BootstrapStage::GateChecked);
    info!("bootstrapping store for version {}", ctx.build_version);

    let report = seed_all(store, ctx).inspect_err(|e| {
        warn!("bootstrap {:?} after {:?}: {e}", BootstrapStage::AbortedFatal, e.stage());
    })?;

    info!(
        "bootstrap finished: policy={:?} groups={:?} settings_created={} administrator={:?} suppressed_lookups={}",
        report.policy, report.groups, report.settings_created, report.administrator, report.suppressed_lookups
    );
    Ok(BootstrapOutcome::Completed(report))
}

fn seed_all(store: &dyn RecordStore, ctx: &BootstrapContext) -> Result<SeedReport, BootstrapError> {
    schema::sync_schema(store, ctx.driver).map_err(BootstrapError::SchemaSync)?;
    reached(BootstrapStage::SchemaSynced);

    let policy = seed::ensure_default_policy(store)?;
    reached(BootstrapStage::PolicySeeded);

    let groups = seed::ensure_default_groups(store)?;
    reached(BootstrapStage::GroupsSeeded);

    let settings = seed::ensure_default_settings(store, ctx.settings)?;
    reached(BootstrapStage::SettingsSeeded);

    let administrator = seed::ensure_default_administrator(store)?;
    reached(BootstrapStage::UserSeeded);

    let lock_written = match ctx.lock.write(&ctx.build_version) {
        Ok(()) => true,
        Err(e) => {
            warn!("cannot write version lock {}: {e:#}", ctx.lock.path().display());
            false
        }
    };
    reached(BootstrapStage::LockWritten);

    let suppressed_lookups = std::iter::once(&policy)
        .chain(groups.iter().map(|(_, o)| o))
        .chain(std::iter::once(&administrator))
        .filter(|o| **o == SeedOutcome::LookupSuppressed)
        .count()
        + settings.suppressed;

    Ok(SeedReport {
        policy,
        groups,
        settings_created: settings.created,
        administrator,
        lock_written,
        suppressed_lookups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::{Fault, MemoryStore, StoreCall};
    use crate::store::Table;
    use crate::version_lock::DEFAULT_LOCK_FILE;
    use cumulo_model::{Policy, UserStatus};

    const RELEASE: RunMode = RunMode { debug: false, test: false };

    fn ctx(dir: &tempfile::TempDir, mode: RunMode) -> BootstrapContext {
        BootstrapContext::new(
            VersionLock::new(dir.path().join(DEFAULT_LOCK_FILE)),
            "3.5.0",
            mode,
            DbDriver::Sqlite,
        )
    }

    fn counts(store: &MemoryStore) -> [u64; 4] {
        [Table::Policies, Table::Groups, Table::Settings, Table::Users].map(|t| store.count(t).unwrap())
    }

    #[test]
    fn fresh_install_seeds_everything_and_writes_lock() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let ctx = ctx(&dir, RELEASE);

        let BootstrapOutcome::Completed(report) = run(&store, &ctx).unwrap() else {
            panic!("expected a completed bootstrap");
        };
        assert_eq!(report.policy, SeedOutcome::Created(1));
        assert!(report.groups.iter().all(|(_, o)| o.is_created()));
        assert_eq!(report.settings_created, DEFAULT_SETTINGS.len());
        assert_eq!(report.administrator, SeedOutcome::Created(1));
        assert!(report.lock_written);
        assert_eq!(report.suppressed_lookups, 0);

        let admin = store.find_user(1).unwrap().unwrap();
        assert_eq!(admin.group_id, 1);
        assert_eq!(admin.status, UserStatus::Active);
        for id in [1, 2] {
            assert!(store.find_group(id).unwrap().unwrap().policies.contains(&1));
        }
        assert_eq!(ctx.lock.read().unwrap(), "3.5.0");
        assert_eq!(store.schema_syncs().len(), 1);
    }

    #[test]
    fn repeated_runs_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let forced = ctx(&dir, RunMode { debug: true, test: false });
        run(&store, &forced).unwrap();
        let once = counts(&store);
        for _ in 0..3 {
            run(&store, &forced).unwrap();
        }
        assert_eq!(counts(&store), once);
        assert_eq!(once, [1, 3, DEFAULT_SETTINGS.len() as u64, 1]);
    }

    #[test]
    fn matching_lock_makes_no_store_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let ctx = ctx(&dir, RELEASE);
        ctx.lock.write("3.5.0").unwrap();
        let outcome = run(&store, &ctx).unwrap();
        assert_eq!(outcome, BootstrapOutcome::Skipped);
        assert_eq!(outcome.stage(), BootstrapStage::SkippedByGate);
        assert!(store.calls().is_empty());
        assert_eq!(counts(&store), [0; 4]);
        assert!(!store.calls().iter().any(|c| c.is_mutation()));
    }

    #[test]
    fn schema_failure_aborts_before_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.inject(Fault::SyncSchema);
        let ctx = ctx(&dir, RELEASE);
        let err = run(&store, &ctx).unwrap_err();
        assert!(matches!(err, BootstrapError::SchemaSync(_)));
        assert_eq!(err.stage(), BootstrapStage::GateChecked);
        assert_eq!(store.calls(), vec![StoreCall::SyncSchema]);
        assert!(ctx.lock.read().is_err());
    }

    #[test]
    fn group_failure_prevents_administrator_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.inject(Fault::CreateGroup(1));
        let ctx = ctx(&dir, RELEASE);
        let err = run(&store, &ctx).unwrap_err();
        assert!(matches!(err, BootstrapError::CreateGroup { id: 1, .. }));
        assert_eq!(err.stage(), BootstrapStage::PolicySeeded);

        let calls = store.calls();
        assert!(!calls.contains(&StoreCall::FindUser(1)));
        let mutations: Vec<_> = calls.into_iter().filter(|c| c.is_mutation()).collect();
        assert_eq!(
            mutations,
            vec![StoreCall::SyncSchema, StoreCall::CreatePolicy, StoreCall::CreateGroup(1)]
        );
        assert_eq!(store.count(Table::Policies).unwrap(), 1);
        assert!(ctx.lock.read().is_err());
    }

    #[test]
    fn settings_failure_reports_groups_stage() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.inject(Fault::CreateSetting("siteName".to_string()));
        let err = run(&store, &ctx(&dir, RELEASE)).unwrap_err();
        assert!(matches!(err, BootstrapError::CreateSetting { ref name, .. } if name == "siteName"));
        assert_eq!(err.stage(), BootstrapStage::GroupsSeeded);
        assert_eq!(store.count(Table::Groups).unwrap(), 3);
        assert_eq!(store.count(Table::Users).unwrap(), 0);
    }

    #[test]
    fn partial_store_only_gets_missing_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let custom = Policy {
            name: "Operator policy".into(),
            ..seed::default_policy()
        };
        store.create_policy(&custom).unwrap();
        store.clear_calls();

        let BootstrapOutcome::Completed(report) = run(&store, &ctx(&dir, RELEASE)).unwrap() else {
            panic!("expected a completed bootstrap");
        };
        assert_eq!(report.policy, SeedOutcome::Present);
        assert!(!store.calls().contains(&StoreCall::CreatePolicy));
        assert_eq!(store.find_policy(1).unwrap().unwrap().name, "Operator policy");
        assert_eq!(counts(&store), [1, 3, DEFAULT_SETTINGS.len() as u64, 1]);
    }

    #[test]
    fn lookup_errors_are_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        store.inject(Fault::FindUser);
        store.inject(Fault::FindGroup(3));
        let BootstrapOutcome::Completed(report) = run(&store, &ctx(&dir, RELEASE)).unwrap() else {
            panic!("expected a completed bootstrap");
        };
        assert_eq!(report.administrator, SeedOutcome::LookupSuppressed);
        assert_eq!(report.groups[2], (3, SeedOutcome::LookupSuppressed));
        assert_eq!(report.suppressed_lookups, 2);
        assert_eq!(store.count(Table::Users).unwrap(), 0);
    }

    #[test]
    fn lock_write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        // A directory in place of the lock file makes the write fail.
        let lock_path = dir.path().join(DEFAULT_LOCK_FILE);
        std::fs::create_dir_all(&lock_path).unwrap();
        let ctx = BootstrapContext::new(VersionLock::new(&lock_path), "3.5.0", RELEASE, DbDriver::Sqlite);

        let BootstrapOutcome::Completed(report) = run(&store, &ctx).unwrap() else {
            panic!("expected a completed bootstrap");
        };
        assert!(!report.lock_written);
        assert!(store.find_user(1).unwrap().is_some());

        // Next start re-runs and finds everything in place.
        store.clear_calls();
        let BootstrapOutcome::Completed(again) = run(&store, &ctx).unwrap() else {
            panic!("expected a second bootstrap");
        };
        assert_eq!(again.policy, SeedOutcome::Present);
        assert_eq!(again.settings_created, 0);
        assert!(!store.calls().contains(&StoreCall::CreateUser));
    }

    #[test]
    fn mysql_driver_passes_engine_option() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let mut ctx = ctx(&dir, RELEASE);
        ctx.driver = DbDriver::Mysql;
        run(&store, &ctx).unwrap();
        let syncs = store.schema_syncs();
        assert_eq!(syncs[0].1.table_options.as_deref(), Some("ENGINE=InnoDB"));
        assert_eq!(syncs[0].0.len(), 14);
    }
}
