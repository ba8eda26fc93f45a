//! File-backed ledger store.
//!
//! Every write replaces the whole file (temp file + rename) and then stages
//! it. The store assumes a single writer; no file locking is performed.

use super::record::{BUILD_NUMBER_KEY, Ledger, VersionRecord};
use crate::config::WorkspaceConfig;
use crate::error::{LedgerError, Result};
use crate::git::{GitStager, NoopStager, Stager};
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Persistent mapping from product name to [`VersionRecord`]
pub struct LedgerStore<S = Box<dyn Stager>> {
    path: PathBuf,
    stager: S,
}

impl<S> std::fmt::Debug for LedgerStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl LedgerStore {
    /// Store at the workspace's ledger path, staging per configuration
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let stager: Box<dyn Stager> = if config.stage_ledger {
            Box::new(GitStager)
        } else {
            Box::new(NoopStager)
        };
        LedgerStore::new(&config.ledger_path, stager)
    }
}

impl<S: Stager> LedgerStore<S> {
    /// Store backed by `path`, staging writes through `stager`
    pub fn new<P: AsRef<Path>>(path: P, stager: S) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stager,
        }
    }

    /// Ledger file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full mapping; empty when the file does not exist
    pub fn load_all(&self) -> Result<Ledger> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Ledger::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Ledger::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            LedgerError::Corrupted {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Record for `name`, or an empty record when absent
    pub fn load(&self, name: &str) -> Result<VersionRecord> {
        Ok(self.load_all()?.swap_remove(name).unwrap_or_default())
    }

    /// Load, apply `f`, then persist and stage the result
    pub fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        self.transact(|ledger| f(ledger).map(|value| (value, true)))
    }

    /// Set `name[key] = value`; returns `false` without writing if unchanged
    pub fn record_attribute(&self, name: &str, key: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        self.transact(|ledger| {
            let current = ledger.get(name).and_then(|record| record.get(key));
            if current.as_ref() == Some(&value) {
                log::debug!("{}.{} already {}; nothing to write", name, key, value);
                return Ok((false, false));
            }

            ledger
                .entry(name.to_string())
                .or_default()
                .set(key, value.clone())?;
            log::info!("Recorded {}.{} = {}", name, key, value);
            Ok((true, true))
        })
    }

    /// Issue the next build number for `name` (1 on first call)
    pub fn increment_build_number(&self, name: &str) -> Result<u64> {
        self.mutate(|ledger| {
            let record = ledger.entry(name.to_string()).or_default();
            let next = record
                .build_number
                .unwrap_or(0)
                .checked_add(1)
                .ok_or_else(|| LedgerError::InvalidAttribute {
                    key: BUILD_NUMBER_KEY.to_string(),
                    reason: format!("build number of '{}' cannot be incremented further", name),
                })?;
            record.set(BUILD_NUMBER_KEY, Value::from(next))?;
            log::info!("Build number for {} is now {}", name, next);
            Ok(next)
        })
    }

    /// Current build number; fails if none was ever recorded
    pub fn load_build_number(&self, name: &str) -> Result<u64> {
        self.load(name)?.build_number.ok_or_else(|| {
            LedgerError::BuildNumberNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Single read, then write only when `f` reports a change
    fn transact<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<(T, bool)>,
    {
        let mut ledger = self.load_all()?;
        let (value, changed) = f(&mut ledger)?;
        if changed {
            self.persist(&ledger)?;
        }
        Ok(value)
    }

    fn persist(&self, ledger: &Ledger) -> Result<()> {
        let mut serialized = serde_json::to_string_pretty(ledger)?;
        serialized.push('\n');

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.write_failed(e))?;
        }

        // Write to temporary file first so readers never see a partial ledger
        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path).map_err(|e| self.write_failed(e))?;
            file.write_all(serialized.as_bytes())
                .map_err(|e| self.write_failed(e))?;
            file.sync_all().map_err(|e| self.write_failed(e))?;
        }
        fs::rename(&temp_path, &self.path).map_err(|e| self.write_failed(e))?;

        self.stager.stage(&self.path)
    }

    fn write_failed(&self, e: std::io::Error) -> LedgerError {
        LedgerError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}
