//! Persisted authentication state
//!
//! The store is shared between the HTTP client (which reads the bearer token
//! and clears it on a 401) and the caller (which signs in and out). Reads
//! vastly outnumber writes, so the session sits behind a `RwLock`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::dto::{AuthSession, Organization, User};
use crate::error::StoreError;

/// Token, user and organization, optionally mirrored to a JSON file
#[derive(Debug, Default)]
pub struct AuthStore {
    path: Option<PathBuf>,
    session: RwLock<Option<AuthSession>>,
}

impl AuthStore {
    /// Store that never touches disk
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Rehydrate from `path`
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and treated as signed out rather than failing startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => {
                    debug!(path = %path.display(), "session rehydrated");
                    Some(session)
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "discarding corrupt session file");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "session file unreadable");
                None
            }
        };
        Self {
            path: Some(path),
            session: RwLock::new(session),
        }
    }

    /// Convenience for sharing with a client
    #[inline]
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Backing file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current bearer token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.read().as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn organization(&self) -> Option<Organization> {
        self.session.read().as_ref().map(|s| s.organization.clone())
    }

    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    /// Replace the session and persist it
    ///
    /// # Errors
    /// `StoreError` if the file cannot be written. The in-memory session is
    /// updated regardless.
    pub fn set_session(&self, session: AuthSession) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(&session)?;
        info!(user = %session.user.email, organization = %session.organization.name, "signed in");
        *self.session.write() = Some(session);

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| StoreError::io_error(parent, e))?;
            }
            write_private(path, &encoded).map_err(|e| StoreError::io_error(path, e))?;
        }
        Ok(())
    }

    /// Drop the session from memory and disk
    ///
    /// Called on sign-out and whenever the backend reports the token expired.
    ///
    /// # Errors
    /// `StoreError` if an existing file cannot be removed.
    pub fn invalidate(&self) -> Result<(), StoreError> {
        let had_session = self.session.write().take().is_some();
        if had_session {
            info!("session invalidated");
        }
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(StoreError::io_error(path, err)),
            }
        }
        Ok(())
    }
}

/// Write the session file readable by its owner only
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session(token: &str) -> AuthSession {
        AuthSession {
            token: token.into(),
            user: User {
                id: Uuid::new_v4(),
                email: "ops@acme.test".into(),
                full_name: Some("Ops".into()),
                role: Some("admin".into()),
            },
            organization: Organization {
                id: Uuid::new_v4(),
                name: "Acme".into(),
                country: Some("DE".into()),
                subscription_plan: None,
            },
        }
    }

    #[test]
    fn missing_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuthStore::load(dir.path().join("session.json"));
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn session_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = AuthStore::load(&path);
        store.set_session(session("tok-1")).unwrap();
        assert!(path.exists());

        let reloaded = AuthStore::load(&path);
        assert_eq!(reloaded.token().as_deref(), Some("tok-1"));
        assert_eq!(reloaded.session(), store.session());
    }

    #[test]
    fn invalidate_clears_memory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = AuthStore::load(&path);
        store.set_session(session("tok-2")).unwrap();

        store.invalidate().unwrap();
        assert!(!store.is_authenticated());
        assert!(!path.exists());
        // idempotent
        store.invalidate().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let store = AuthStore::load(&path);
        store.set_session(session("tok-4")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(AuthStore::load(&path).token().as_deref(), Some("tok-4"));
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(!AuthStore::load(&path).is_authenticated());
    }

    #[test]
    fn in_memory_store_never_writes() {
        let store = AuthStore::in_memory();
        store.set_session(session("tok-3")).unwrap();
        assert_eq!(store.path(), None);
        assert_eq!(store.organization().map(|o| o.name), Some("Acme".into()));
        store.invalidate().unwrap();
        assert_eq!(store.user(), None);
    }
}
