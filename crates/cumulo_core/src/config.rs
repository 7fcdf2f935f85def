/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::schema::DbDriver;
use crate::version_lock::{RunMode, DEFAULT_LOCK_FILE};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    #[default]
    Release,
    Debug,
    Test,
}

impl ProcessMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "release" | "prod" | "production" => Some(ProcessMode::Release),
            "debug" | "dev" => Some(ProcessMode::Debug),
            "test" => Some(ProcessMode::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub data_dir: Option<PathBuf>,
    #[serde(alias = "db_type")]
    pub db_driver: DbDriver,
    pub db_path: PathBuf,
    pub version_lock_path: PathBuf,
    pub build_version: Option<String>,
    pub debug: bool,
    pub mode: ProcessMode,
    pub db_busy_timeout_ms: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_driver: DbDriver::Sqlite,
            db_path: PathBuf::from("cumulo.db"),
            version_lock_path: PathBuf::from(DEFAULT_LOCK_FILE),
            build_version: None,
            debug: false,
            mode: ProcessMode::Release,
            db_busy_timeout_ms: 5_000,
        }
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("net", "cumulo", "Cumulo")
        .context("unable to determine platform data dir")?;
    Ok(proj.data_local_dir().to_path_buf())
}

fn env_bool(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl BootstrapConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse bootstrap config json")
    }

    /// Reads `path` when given, otherwise starts from defaults; then applies the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = get("CUMULO_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("CUMULO_DB_DRIVER") {
            self.db_driver = DbDriver::parse(&v)
                .with_context(|| format!("CUMULO_DB_DRIVER: unknown driver {v:?}"))?;
        }
        if let Some(v) = get("CUMULO_DB").filter(|v| !v.trim().is_empty()) {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = get("CUMULO_VERSION_LOCK").filter(|v| !v.trim().is_empty()) {
            self.version_lock_path = PathBuf::from(v);
        }
        if let Some(v) = get("CUMULO_DEBUG") {
            self.debug = env_bool(&v);
        }
        if let Some(v) = get("CUMULO_MODE") {
            self.mode = ProcessMode::parse(&v)
                .with_context(|| format!("CUMULO_MODE: unknown mode {v:?}"))?;
        }
        if let Some(v) = get("CUMULO_DB_BUSY_TIMEOUT_MS") {
            self.db_busy_timeout_ms = v
                .trim()
                .parse()
                .with_context(|| format!("CUMULO_DB_BUSY_TIMEOUT_MS: {v:?}"))?;
        }
        Ok(())
    }

    pub fn run_mode(&self) -> RunMode {
        RunMode {
            debug: self.debug || self.mode == ProcessMode::Debug,
            test: self.mode == ProcessMode::Test,
        }
    }

    pub fn build_version(&self) -> &str {
        self.build_version.as_deref().unwrap_or(BUILD_VERSION)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.db_busy_timeout_ms)
    }

    /// Data dir from config, falling back to the platform default.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        self.under_data_dir(&self.db_path)
    }

    pub fn resolved_lock_path(&self) -> Result<PathBuf> {
        self.under_data_dir(&self.version_lock_path)
    }

    fn under_data_dir(&self, p: &Path) -> Result<PathBuf> {
        if p.is_absolute() {
            return Ok(p.to_path_buf());
        }
        Ok(self.resolved_data_dir()?.join(p))
    }
}
