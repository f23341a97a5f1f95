//! Key-value storage for the local login flag.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{QueryMeError, Result};

pub const LOGIN_STATUS_KEY: &str = "loginStatus";
pub const LOGIN_SUCCESS: &str = "success";

/// String key-value store, shared between screens.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Whether the login flag records a completed OTP verification.
pub fn is_logged_in(store: &dyn KeyValueStore) -> Result<bool> {
    Ok(store.get(LOGIN_STATUS_KEY)?.as_deref() == Some(LOGIN_SUCCESS))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| QueryMeError::Store("memory store mutex poisoned".to_owned()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object file.
///
/// Every operation re-reads the file; a missing file is an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error("read", err)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| {
            QueryMeError::Store(format!("{} is not a JSON object: {err}", self.path.display()))
        })
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error("create directory for", err))?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|err| QueryMeError::Store(format!("serialize store: {err}")))?;
        fs::write(&self.path, content).map_err(|err| self.io_error("write", err))
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| QueryMeError::Store("file store mutex poisoned".to_owned()))?;
        let mut entries = self.load()?;
        apply(&mut entries);
        self.save(&entries)
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> QueryMeError {
        QueryMeError::Store(format!("{action} {}: {err}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
