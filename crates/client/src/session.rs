//! Authenticated session: bearer token plus the logged-in user.
//!
//! The session is loaded once at start-up from a JSON file, shared through
//! a cloneable [`SessionHandle`], and removed from disk on logout.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use tesis_core::roles::Role;
use tesis_core::user::User;

use crate::error::ClientResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.rol)
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// JSON file holding the persisted [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file yields an empty session.
    pub async fn load(&self) -> ClientResult<Session> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&raw) {
            Ok(session) => Ok(session),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding corrupt session file",
                );
                Ok(Session::default())
            }
        }
    }

    pub async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// Shared, cloneable session passed to the API client and boards.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Option<Arc<SessionStore>>,
}

impl SessionHandle {
    /// Session kept only in memory (tests, one-shot tools).
    pub fn in_memory(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            store: None,
        }
    }

    /// Load the persisted session from `store`.
    pub async fn load(store: SessionStore) -> ClientResult<Self> {
        let session = store.load().await?;
        tracing::debug!(
            path = %store.path().display(),
            authenticated = session.is_authenticated(),
            "Session loaded",
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(session)),
            store: Some(Arc::new(store)),
        })
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .token
            .clone()
            .filter(|t| !t.is_empty())
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn role(&self) -> Option<Role> {
        self.inner.read().await.role()
    }

    /// Store a fresh login and persist it.
    pub async fn establish(&self, token: String, user: User) -> ClientResult<()> {
        let mut guard = self.inner.write().await;
        guard.token = Some(token);
        guard.user = Some(user);
        if let Some(store) = &self.store {
            store.save(&guard).await?;
        }
        Ok(())
    }

    /// Replace the cached user (e.g. after `/auth/me`).
    pub async fn update_user(&self, user: User) -> ClientResult<()> {
        let mut guard = self.inner.write().await;
        guard.user = Some(user);
        if let Some(store) = &self.store {
            store.save(&guard).await?;
        }
        Ok(())
    }

    /// Forget token and user, and remove the persisted file.
    pub async fn clear(&self) -> ClientResult<()> {
        let mut guard = self.inner.write().await;
        *guard = Session::default();
        if let Some(store) = &self.store {
            store.clear().await?;
        }
        Ok(())
    }
}
