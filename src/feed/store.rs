//! Update logs on disk
//!
//! A checkout of the log repository keeps one directory per user under `users/`, each holding
//! one file per era:
//!
//!     users/<user>/<user>.<era>.txt
//!
//! An era with no file simply has no updates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::era::eras_between;
use super::updates::{parse_updates, UpdateRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read access to a local checkout of the log repository.
#[derive(Debug, Clone)]
pub struct LogStore {
    root: PathBuf,
}

impl LogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every user with a log directory, sorted case-insensitively.
    pub fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join("users");
        let entries = fs::read_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut users = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                users.push(name);
            }
        }
        users.sort_by_key(|user| user.to_lowercase());
        Ok(users)
    }

    pub fn log_path(&self, user: &str, era: i64) -> PathBuf {
        self.root
            .join("users")
            .join(user)
            .join(format!("{}.{}.txt", user, era))
    }

    /// One user's log for one era; empty when the file does not exist.
    pub fn read_log(&self, user: &str, era: i64) -> Result<String, StoreError> {
        let path = self.log_path(user, era);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Updates from `users` timestamped within `[start, end]`, across every era in between.
    pub fn collect_updates(
        &self,
        users: &[String],
        start: i64,
        end: i64,
        era_seconds: i64,
    ) -> Result<Vec<UpdateRecord>, StoreError> {
        let mut records = Vec::new();
        for era in eras_between(start, end, era_seconds) {
            for user in users {
                let text = self.read_log(user, era)?;
                records.extend(parse_updates(&text, user, era, start..=end));
            }
        }
        debug!(users = users.len(), records = records.len(), "collected updates");
        Ok(records)
    }
}
