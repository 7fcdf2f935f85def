/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{anyhow, Result};
use cumulo_core::bootstrap::{self, BootstrapContext, BootstrapOutcome};
use cumulo_core::config::BootstrapConfig;
use cumulo_core::schema::DbDriver;
use cumulo_core::sqlite_store::SqliteStore;
use cumulo_core::version_lock::VersionLock;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

fn parse_config_path() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return Ok(Some(PathBuf::from(path)));
            }
            return Err(anyhow!("--config requires a path"));
        }
    }
    if let Ok(path) = std::env::var("CUMULO_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(Some(PathBuf::from(path)));
        }
    }
    Ok(None)
}

fn start() -> Result<BootstrapOutcome> {
    let cfg_path = parse_config_path()?;
    if let Some(p) = &cfg_path {
        info!("config: {}", p.display());
    }
    let cfg = BootstrapConfig::load(cfg_path.as_deref())?;
    if cfg.db_driver != DbDriver::Sqlite {
        return Err(anyhow!(
            "db driver {:?} has no store in this build, use sqlite",
            cfg.db_driver
        ));
    }

    let db_path = cfg.resolved_db_path()?;
    let lock_path = cfg.resolved_lock_path()?;
    info!("db: {}", db_path.display());
    info!("version lock: {}", lock_path.display());

    let store = SqliteStore::open(&db_path, cfg.busy_timeout())?;
    let ctx = BootstrapContext::new(
        VersionLock::new(lock_path),
        cfg.build_version(),
        cfg.run_mode(),
        cfg.db_driver,
    );
    Ok(bootstrap::run(&store, &ctx)?)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("cumulo bootstrap starting");
    match start() {
        Ok(BootstrapOutcome::Skipped) => {
            info!("store already at current version");
            ExitCode::SUCCESS
        }
        Ok(BootstrapOutcome::Completed(report)) => {
            if !report.lock_written {
                info!("version lock not written, next start will bootstrap again");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("bootstrap failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
