//! Session persistence: the token and user id of the signed-in user, kept in
//! a string key-value store the same way a browser keeps them in local storage.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::Arc,
};

use shared::domain::UserId;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::SessionStoreError;

pub const TOKEN_KEY: &str = "authToken";
pub const USER_ID_KEY: &str = "userId";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
}

/// String-keyed persistent storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk. Every write replaces the file through a
/// temporary sibling and a rename so a crash never leaves half a file behind.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileKeyValueStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionStoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SessionStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SessionStoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SessionStoreError::Io { path, source }),
        };

        debug!(path = %path.display(), entries = entries.len(), "opened session file");
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), SessionStoreError> {
        let serialized =
            serde_json::to_string_pretty(&self.entries).map_err(|source| {
                SessionStoreError::Corrupt {
                    path: self.path.clone(),
                    source,
                }
            })?;
        let tmp_path = self.path.with_extension("json.tmp");
        let io_err = |source: std::io::Error| SessionStoreError::Io {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp_path, serialized).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Shared handle passed to every controller.
pub type SessionContext = Arc<SessionStore>;

pub struct SessionStore {
    backend: Mutex<Box<dyn KeyValueStore>>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> SessionContext {
        Arc::new(Self {
            backend: Mutex::new(backend),
        })
    }

    pub fn in_memory() -> SessionContext {
        Self::new(Box::new(MemoryKeyValueStore::default()))
    }

    pub async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut backend = self.backend.lock().await;
        backend.set(TOKEN_KEY, &session.token)?;
        backend.set(USER_ID_KEY, &session.user_id.0.to_string())?;
        debug!(user_id = session.user_id.0, "session saved");
        Ok(())
    }

    /// Returns the session only when both the token and a numeric user id
    /// are present. Storage failures read as "no session".
    pub async fn load(&self) -> Option<Session> {
        let backend = self.backend.lock().await;
        let read = |key: &str| match backend.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                warn!(key, error = %err, "failed to read session entry");
                None
            }
        };

        let token = read(TOKEN_KEY)?;
        let raw_user_id = read(USER_ID_KEY)?;
        match raw_user_id.trim().parse::<i64>() {
            Ok(user_id) => Some(Session {
                token,
                user_id: UserId(user_id),
            }),
            Err(_) => {
                warn!(raw_user_id = %raw_user_id, "stored user id is not numeric; treating session as absent");
                None
            }
        }
    }

    pub async fn clear(&self) -> Result<(), SessionStoreError> {
        let mut backend = self.backend.lock().await;
        backend.remove(TOKEN_KEY)?;
        backend.remove(USER_ID_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    /// Loads the session for an authenticated call. A partial or unreadable
    /// session is removed so the next read starts clean.
    pub async fn load_or_clear(&self) -> Option<Session> {
        let session = self.load().await;
        if session.is_none() {
            if let Err(err) = self.clear().await {
                warn!(error = %err, "failed to clear incomplete session");
            }
        }
        session
    }

    #[cfg(test)]
    pub(crate) async fn set_raw(&self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        self.backend.lock().await.set(key, value)
    }

    #[cfg(test)]
    pub(crate) async fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.lock().await.get(key).ok().flatten()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
