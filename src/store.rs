use serde::{Serialize, de::DeserializeOwned};

use std::fs;
use std::path::{Path, PathBuf};

mod admins;
mod attempts;
pub mod schema;
mod users;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Username cannot be empty!")]
    EmptyUsername,
    #[error("Age must be greater than zero!")]
    InvalidAge,
    #[error("Username already exists!")]
    UsernameTaken,
    #[error("No user with id {0}")]
    UserNotFound(u32),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// JSON-file persistence rooted at a data directory.
///
/// Every operation reads or rewrites a whole file; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens the store at `root`, creating the directory and the default admin account if needed.
    pub fn initialize(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        log::debug!("[initialize] opening data directory {}...", root.display());

        fs::create_dir_all(&root).map_err(|source| StoreError::Io { path: root.clone(), source })?;

        let store = Self { root };
        store.ensure_default_admin()?;

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Reads a whole file. A missing or empty file loads as the default value.
    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> StoreResult<T> {
        let path = self.path(file);
        if !path.exists() {
            log::trace!("[load] {} not found, starting empty.", path.display());
            return Ok(T::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;

        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&contents)
            .inspect_err(|err| log::error!("[load] Could not parse {}: {err}", path.display()))
            .map_err(|source| StoreError::Json { path, source })
    }

    /// Rewrites a whole file. The data goes to a sibling temp file first and is renamed into place.
    fn save<T: Serialize>(&self, file: &str, value: &T) -> StoreResult<()> {
        let path = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));

        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;

        fs::write(&tmp, json).map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path: path.clone(), source })?;

        log::trace!("[save] {} written.", path.display());
        Ok(())
    }
}
