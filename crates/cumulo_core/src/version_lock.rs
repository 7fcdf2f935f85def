/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_LOCK_FILE: &str = "version.lock";

/// Process mode flags. Either flag forces the bootstrap to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    pub debug: bool,
    pub test: bool,
}

impl RunMode {
    pub fn is_forced(&self) -> bool {
        self.debug || self.test
    }
}

/// Marker file holding the build version the store was last bootstrapped to.
#[derive(Debug, Clone)]
pub struct VersionLock {
    path: PathBuf,
}

impl VersionLock {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).with_context(|| format!("read {}", self.path.display()))
    }

    /// Overwrites the marker with `version`, no trailing newline.
    pub fn write(&self, version: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
        }
        fs::write(&self.path, version).with_context(|| format!("write {}", self.path.display()))
    }
}

/// Decides whether the bootstrap has to run for `build_version`.
///
/// An unreadable marker counts as "never migrated". The comparison is exact, so
/// upgrades and downgrades both trigger a run.
pub fn should_migrate(lock: &VersionLock, build_version: &str, mode: RunMode) -> bool {
    if mode.is_forced() {
        debug!("forced mode ({mode:?}), version lock not consulted");
        return true;
    }
    match lock.read() {
        Ok(locked) => locked != build_version,
        Err(e) => {
            debug!("version lock unavailable: {e:#}");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE: RunMode = RunMode { debug: false, test: false };

    #[test]
    fn matching_marker_skips() {
        let dir = tempfile::tempdir().unwrap();
        let lock = VersionLock::new(dir.path().join(DEFAULT_LOCK_FILE));
        lock.write("3.5.0").unwrap();
        assert!(!should_migrate(&lock, "3.5.0", RELEASE));
    }

    #[test]
    fn missing_marker_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let lock = VersionLock::new(dir.path().join(DEFAULT_LOCK_FILE));
        assert!(should_migrate(&lock, "3.5.0", RELEASE));
    }

    #[test]
    fn any_mismatch_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let lock = VersionLock::new(dir.path().join(DEFAULT_LOCK_FILE));
        for locked in ["3.4.9", "3.5.1", "3.5.0\n", "", "3.5"] {
            lock.write(locked).unwrap();
            assert!(should_migrate(&lock, "3.5.0", RELEASE), "marker {locked:?}");
        }
    }

    #[test]
    fn forced_modes_ignore_marker() {
        let dir = tempfile::tempdir().unwrap();
        let lock = VersionLock::new(dir.path().join(DEFAULT_LOCK_FILE));
        lock.write("3.5.0").unwrap();
        let debug = RunMode { debug: true, test: false };
        let test = RunMode { debug: false, test: true };
        assert!(should_migrate(&lock, "3.5.0", debug));
        assert!(should_migrate(&lock, "3.5.0", test));
    }

    #[test]
    fn write_overwrites_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let lock = VersionLock::new(dir.path().join("nested").join(DEFAULT_LOCK_FILE));
        lock.write("1.0.0").unwrap();
        lock.write("1.1.0").unwrap();
        assert_eq!(lock.read().unwrap(), "1.1.0");
    }
}
