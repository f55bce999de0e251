//! Durable local key/value store for client state.
//!
//! Values are strings, like browser local storage; structured values go
//! through [`LocalStorage::get_json`] / [`LocalStorage::set_json`]. The whole
//! map is rewritten to disk on every mutation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientResult;

/// Signed-in user (`StoredUser` JSON).
pub const USER_KEY: &str = "user";
/// Token of the current device's session.
pub const SESSION_TOKEN_KEY: &str = "sessionToken";
/// Refresh secret paired with [`SESSION_TOKEN_KEY`].
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Serialized session registry.
pub const SESSIONS_KEY: &str = "sessions";
/// Reserved for the Discord OAuth handoff.
pub const DISCORD_USER_KEY: &str = "discordUser";

#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the store at `path`, loading existing contents if the file exists.
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "Opened local storage");
        Ok(Self {
            path: Some(path),
            items: Mutex::new(items),
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> ClientResult<()> {
        let mut items = self.lock();
        items.insert(key.to_string(), value.into());
        self.flush(&items)
    }

    pub fn remove_item(&self, key: &str) -> ClientResult<()> {
        let mut items = self.lock();
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }

    /// Remove several keys with a single write.
    pub fn remove_items(&self, keys: &[&str]) -> ClientResult<()> {
        let mut items = self.lock();
        let before = items.len();
        for key in keys {
            items.remove(*key);
        }
        if items.len() != before {
            self.flush(&items)?;
        }
        Ok(())
    }

    /// Decode a JSON value. A missing key is `Ok(None)`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> ClientResult<Option<T>> {
        match self.get_item(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> ClientResult<()> {
        self.set_item(key, serde_json::to_string(value)?)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a consistent map; every write replaces
        // whole values.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(items)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = LocalStorage::open(&path).unwrap();
        storage.set_item(SESSION_TOKEN_KEY, "abc").unwrap();
        storage.set_json(USER_KEY, &vec![1, 2, 3]).unwrap();
        drop(storage);

        let reopened = LocalStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item(SESSION_TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(reopened.get_json::<Vec<i32>>(USER_KEY).unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(dir.path().join("absent.json")).unwrap();
        assert!(storage.get_item(USER_KEY).is_none());
    }

    #[test]
    fn remove_items_clears_keys() {
        let storage = LocalStorage::in_memory();
        storage.set_item(USER_KEY, "u").unwrap();
        storage.set_item(SESSION_TOKEN_KEY, "t").unwrap();
        storage.set_item(DISCORD_USER_KEY, "d").unwrap();

        storage.remove_items(&[USER_KEY, SESSION_TOKEN_KEY]).unwrap();

        assert!(storage.get_item(USER_KEY).is_none());
        assert!(storage.get_item(SESSION_TOKEN_KEY).is_none());
        assert_eq!(storage.get_item(DISCORD_USER_KEY).as_deref(), Some("d"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(LocalStorage::open(&path).is_err());
    }
}
