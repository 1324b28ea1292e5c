//! Persistent storage for the login session.
//!
//! The session (login flag, bearer token, user name, role) survives process
//! restarts through a [`SessionStore`]. The file store keeps it as one JSON
//! document; the memory store is for tests and embedding.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use stockroom_core::UserRole;
use thiserror::Error;

/// Errors from reading or writing a session store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed session data: {0}")]
    Format(#[from] serde_json::Error),
}

/// A persisted login session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct StoredSession {
    pub login_status: bool,
    /// Opaque bearer token issued at login.
    pub token: SecretString,
    pub username: String,
    pub user_role: UserRole,
    /// Expiry reported by the server. Informational only; nothing enforces it.
    pub expiration: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("login_status", &self.login_status)
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("user_role", &self.user_role)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// On-disk shape of a [`StoredSession`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    login_status: bool,
    token: String,
    username: String,
    user_role: UserRole,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
}

impl From<&StoredSession> for SessionRecord {
    fn from(session: &StoredSession) -> Self {
        Self {
            login_status: session.login_status,
            token: session.token.expose_secret().to_owned(),
            username: session.username.clone(),
            user_role: session.user_role.clone(),
            expiration: session.expiration,
        }
    }
}

impl From<SessionRecord> for StoredSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            login_status: record.login_status,
            token: SecretString::from(record.token),
            username: record.username,
            user_role: record.user_role,
            expiration: record.expiration,
        }
    }
}

/// Storage backend for the login session.
///
/// Calls are synchronous: they are small and happen once per request at
/// most, so the request interceptor can read the token without awaiting.
///
/// The interceptor calls [`SessionStore::token`] from inside the async
/// send path, so with [`FileSessionStore`] every request does a blocking
/// read and JSON parse of a file of a few hundred bytes on a runtime
/// thread. That cost is accepted so a login or logout from another process
/// is picked up by the very next request.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds
    /// malformed data.
    fn load(&self) -> Result<Option<StoredSession>, StorageError>;

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Remove the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// Read only the bearer token.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::load`].
    fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.load()?.map(|session| session.token))
    }
}

/// Session stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SessionRecord = serde_json::from_str(&contents)?;
        Ok(Some(record.into()))
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&SessionRecord::from(session))?;
        write_private(&self.path, json.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `contents` to a file only the owner can read.
///
/// New files are created with mode 0600, so the token is never readable by
/// others, and a file left with wider permissions is narrowed before it is
/// rewritten.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write as _;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Session held in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `session`.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<StoredSession>, StorageError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(token: &str) -> StoredSession {
        StoredSession {
            login_status: true,
            token: SecretString::from(token),
            username: "ada".to_string(),
            user_role: UserRole::Admin,
            expiration: None,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("stockroom-store-{}-{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let store = FileSessionStore::new(temp_path("roundtrip"));
        assert!(store.load().unwrap().is_none());

        store.save(&session("tok-1")).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token.expose_secret(), "tok-1");
        assert_eq!(loaded.user_role, UserRole::Admin);

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let path = temp_path("garbage");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.load(), Err(StorageError::Format(_))));
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("mode");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        // a leftover file with wide permissions gets narrowed too
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(&path);
        store.save(&session("tok-2")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        store.clear().unwrap();

        store.save(&session("tok-3")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_token() {
        let store = MemorySessionStore::with_session(session("abc"));
        assert_eq!(store.token().unwrap().unwrap().expose_secret(), "abc");
        store.clear().unwrap();
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", session("very-secret"));
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
