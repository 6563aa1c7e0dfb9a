//! Persistence for the signed-in session.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use green_auth::{BearerToken, User};
use serde::{Deserialize, Serialize};

use crate::StorefrontError;

/// The part of a session that outlives the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: BearerToken,
    pub user: User,
}

/// Storage for the session token.
pub trait TokenStore: Send + Sync {
    /// The stored session, if any.
    fn load(&self) -> Result<Option<StoredSession>, StorefrontError>;

    /// Replace the stored session.
    fn save(&self, session: &StoredSession) -> Result<(), StorefrontError>;

    /// Forget the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorefrontError>;
}

/// Token store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a session already stored.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, StorefrontError> {
        Ok(self.slot().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorefrontError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorefrontError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(action: &str, path: &Path, e: impl std::fmt::Display) -> StorefrontError {
    StorefrontError::Storage(format!("failed to {} {}: {}", action, path.display(), e))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredSession>, StorefrontError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read", &self.path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| storage_error("parse", &self.path, e))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorefrontError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| storage_error("create", parent, e))?;
        }
        let content =
            serde_json::to_string_pretty(session).map_err(|e| storage_error("encode", &self.path, e))?;
        std::fs::write(&self.path, content).map_err(|e| storage_error("write", &self.path, e))
    }

    fn clear(&self) -> Result<(), StorefrontError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use green_auth::Role;

    fn session() -> StoredSession {
        StoredSession {
            token: BearerToken::new("a.b.c"),
            user: User::new("u1", "ani@green.id", "Ani", Role::Customer),
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&session()).unwrap();
        assert_eq!(FileTokenStore::new(store.path()).load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileTokenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorefrontError::Storage(_)));
    }
}
