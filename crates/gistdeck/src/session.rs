//! Authenticated session state.
//!
//! A [`Session`] is the only place the bearer token and the signed-in user
//! live. It is passed explicitly to [`crate::gist::GistClient`] and cloned
//! freely; clones share state. An identity-provider adapter drives it with
//! [`Session::sign_in`] / [`Session::sign_out`], and interested parties
//! observe changes through [`Session::subscribe`].
//!
//! Persistence is a two-key key/value store ([`SessionStore`]): the raw
//! token under [`TOKEN_KEY`] and the JSON-encoded user under
//! [`USER_INFO_KEY`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::watch;

use crate::gist::AuthUser;

/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "github_token";

/// Store key holding the cached user-info JSON blob.
pub const USER_INFO_KEY: &str = "user_info";

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Snapshot of who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

/// Shared, observable authentication state.
#[derive(Clone)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Session")
            .field("authenticated", &state.token.is_some())
            .field("user", &state.user.as_ref().map(|u| u.login.as_str()))
            .finish()
    }
}

impl Session {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// A session that starts out signed in.
    pub fn with_token(token: impl Into<String>, user: Option<AuthUser>) -> Self {
        let session = Self::anonymous();
        session.sign_in(token, user);
        session
    }

    /// Rebuild a session from a store. A corrupt user blob is dropped with a
    /// warning rather than failing the restore; the token alone still works.
    pub fn restore(store: &dyn SessionStore) -> Result<Self, SessionError> {
        let token = store.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty());
        let user = match store.get(USER_INFO_KEY)? {
            Some(raw) => match serde_json::from_str::<AuthUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable cached user info: {}", e);
                    None
                }
            },
            None => None,
        };

        let session = Self::anonymous();
        if let Some(token) = token {
            session.sign_in(token, user);
        }
        Ok(session)
    }

    /// Write the current state to a store, removing keys that are unset.
    pub fn persist(&self, store: &dyn SessionStore) -> Result<(), SessionError> {
        let state = self.snapshot();
        match state.token {
            Some(token) => store.set(TOKEN_KEY, &token)?,
            None => store.remove(TOKEN_KEY)?,
        }
        match state.user {
            Some(user) => store.set(USER_INFO_KEY, &serde_json::to_string(&user)?)?,
            None => store.remove(USER_INFO_KEY)?,
        }
        Ok(())
    }

    /// Record a successful login.
    pub fn sign_in(&self, token: impl Into<String>, user: Option<AuthUser>) {
        let token = token.into();
        tracing::debug!(
            "Session signed in as {}",
            user.as_ref().map(|u| u.login.as_str()).unwrap_or("<unknown>")
        );
        self.state.send_replace(SessionState {
            token: Some(token),
            user,
        });
    }

    /// Attach or refresh the cached user without touching the token.
    pub fn set_user(&self, user: AuthUser) {
        self.state.send_modify(|state| state.user = Some(user));
    }

    /// Forget the token and user.
    pub fn sign_out(&self) {
        tracing::debug!("Session signed out");
        self.state.send_replace(SessionState::default());
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    /// The `Authorization` header value, if a token is present.
    pub fn auth_header(&self) -> Option<String> {
        self.state
            .borrow()
            .token
            .as_ref()
            .map(|t| format!("Bearer {}", t))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().token.is_some()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.state.borrow().user.clone()
    }

    pub fn current_login(&self) -> Option<String> {
        self.state.borrow().user.as_ref().map(|u| u.login.clone())
    }

    /// Receive a notification whenever the session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

/// Minimal string key/value store for session persistence.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Process-local store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.values().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file; the store only ever holds two keys.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}
