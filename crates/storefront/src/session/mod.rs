//! Authenticated session and its persistence.
//!
//! The session is a bearer token plus the id of the user it belongs to. Both
//! are present or both are absent: [`SessionStore`] holds an
//! `Option<AuthSession>` and never one half of it.
//!
//! Persisted entries use the keys `authToken` and `userId`. Anything else
//! found in storage is left alone.

mod storage;

use std::sync::{Arc, PoisonError, RwLock};

use bookbarn_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key of the user id.
pub const USER_ID_KEY: &str = "userId";

// =============================================================================
// AuthSession
// =============================================================================

/// Bearer token and the user it authenticates.
#[derive(Clone)]
pub struct AuthSession {
    token: SecretString,
    user_id: UserId,
}

impl AuthSession {
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user_id,
        }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// The current session, mirrored to durable storage.
///
/// Cheap to clone; clones share state. Persistence failures are logged and
/// never fail the call: the in-memory session always reflects the last
/// `login`/`logout`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    current: RwLock<Option<AuthSession>>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Load the persisted session from `storage`.
    ///
    /// Missing, partial, or malformed data yields an anonymous store.
    pub fn restore(storage: impl SessionStorage) -> Self {
        let current = match storage.read() {
            Ok(entries) => parse_session(&entries),
            Err(e) => {
                warn!(error = %e, "Could not read persisted session, starting anonymous");
                None
            }
        };

        if let Some(session) = &current {
            debug!(user_id = %session.user_id(), "Restored persisted session");
        }

        Self {
            inner: Arc::new(SessionStoreInner {
                current: RwLock::new(current),
                storage: Box::new(storage),
            }),
        }
    }

    /// Start a session, replacing any previous one.
    pub fn login(&self, token: impl Into<String>, user_id: UserId) -> AuthSession {
        let session = AuthSession::new(token, user_id);

        let token = session.token().expose_secret().to_string();
        let id = user_id.to_string();
        self.persist(|entries| {
            entries.insert(TOKEN_KEY.to_string(), token);
            entries.insert(USER_ID_KEY.to_string(), id);
        });

        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session.clone());

        session
    }

    /// End the session. Idempotent.
    pub fn logout(&self) {
        self.persist(|entries| {
            entries.remove(TOKEN_KEY);
            entries.remove(USER_ID_KEY);
        });

        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<AuthSession> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current().map(|s| s.user_id())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Read-modify-write the persisted entries, logging failures.
    fn persist(&self, update: impl FnOnce(&mut std::collections::BTreeMap<String, String>)) {
        let mut entries = match self.inner.storage.read() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session storage");
                std::collections::BTreeMap::new()
            }
        };
        update(&mut entries);

        if let Err(e) = self.inner.storage.write(&entries) {
            warn!(error = %e, "Failed to persist session");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

fn parse_session(entries: &std::collections::BTreeMap<String, String>) -> Option<AuthSession> {
    let token = entries.get(TOKEN_KEY).map(|t| t.trim()).filter(|t| !t.is_empty());
    let user_id = entries.get(USER_ID_KEY).map(|id| id.parse::<UserId>());

    match (token, user_id) {
        (Some(token), Some(Ok(user_id))) => Some(AuthSession::new(token, user_id)),
        (None, None) => None,
        _ => {
            warn!("Ignoring incomplete persisted session");
            None
        }
    }
}
