//! Process-wide access session with explicit expiry.
//!
//! After the user passes the access gate the application calls
//! [`Session::grant`]; the resulting token is persisted through a
//! [`TokenStore`] and stays valid for the configured time-to-live. Creating a
//! [`Session`] reads the persisted token, so a restart within the TTL keeps the
//! user signed in. Checking the password itself is the application's concern.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{DateTime, TimeDelta, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::{AutosaveError, Result};

/// Default session lifetime.
pub const DEFAULT_TTL: TimeDelta = TimeDelta::hours(24);

static GLOBAL: OnceLock<Session> = OnceLock::new();

/// Persisted proof that the gate was passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub issued_at: DateTime<Utc>,
}

/// Where the session token is persisted.
///
/// Methods return boxed futures so a [`Session`] can hold any store behind a
/// trait object.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Option<SessionToken>>>;
    fn store(&self, token: SessionToken) -> BoxFuture<'_, Result<()>>;
    fn clear(&self) -> BoxFuture<'_, Result<()>>;
}

/// Token store backed by a small JSON file.
pub struct FsTokenStore {
    path: PathBuf,
}

impl FsTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FsTokenStore {
    fn load(&self) -> BoxFuture<'_, Result<Option<SessionToken>>> {
        async move {
            let bytes = match tokio::fs::read(&self.path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(AutosaveError::Session(e.to_string())),
            };
            match serde_json::from_slice(&bytes) {
                Ok(token) => Ok(Some(token)),
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable session token at {}: {e}",
                        self.path.display()
                    );
                    Ok(None)
                }
            }
        }
        .boxed()
    }

    fn store(&self, token: SessionToken) -> BoxFuture<'_, Result<()>> {
        async move {
            let bytes =
                serde_json::to_vec(&token).map_err(|e| AutosaveError::Session(e.to_string()))?;
            tokio::fs::write(&self.path, bytes)
                .await
                .map_err(|e| AutosaveError::Session(e.to_string()))
        }
        .boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AutosaveError::Session(e.to_string())),
            }
        }
        .boxed()
    }
}

/// In-process token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> BoxFuture<'_, Result<Option<SessionToken>>> {
        futures::future::ready(Ok(*self.token.lock())).boxed()
    }

    fn store(&self, token: SessionToken) -> BoxFuture<'_, Result<()>> {
        *self.token.lock() = Some(token);
        futures::future::ready(Ok(())).boxed()
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        self.token.lock().take();
        futures::future::ready(Ok(())).boxed()
    }
}

/// Access session state.
pub struct Session {
    store: Box<dyn TokenStore>,
    ttl: TimeDelta,
    token: RwLock<Option<SessionToken>>,
}

impl Session {
    /// Load the persisted token from `store`. Fails if `ttl` is not positive
    /// or the store cannot be read.
    pub async fn new(store: impl TokenStore + 'static, ttl: TimeDelta) -> Result<Self> {
        if ttl <= TimeDelta::zero() {
            return Err(AutosaveError::Config(format!(
                "session ttl must be positive, got {ttl}"
            )));
        }
        let token = store.load().await?;
        Ok(Self {
            store: Box::new(store),
            ttl,
            token: RwLock::new(token),
        })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Whether a token exists and has not expired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token
            .read()
            .is_some_and(|t| now >= t.issued_at && now - t.issued_at < self.ttl)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// When the current token expires, if there is one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token.read().map(|t| t.issued_at + self.ttl)
    }

    /// Issue and persist a token valid from `now`.
    pub async fn grant(&self, now: DateTime<Utc>) -> Result<SessionToken> {
        let token = SessionToken { issued_at: now };
        self.store.store(token).await?;
        *self.token.write() = Some(token);
        tracing::info!("Session granted until {}", now + self.ttl);
        Ok(token)
    }

    /// Forget the token, in memory and in the store.
    pub async fn revoke(&self) -> Result<()> {
        self.token.write().take();
        self.store.clear().await?;
        tracing::info!("Session revoked");
        Ok(())
    }
}

/// Install `session` as the process-wide session.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init(session: Session) -> &'static Session {
    GLOBAL
        .set(session)
        .unwrap_or_else(|_| panic!("Global session already initialized"));
    global().expect("global session was just set")
}

/// The session installed with [`init`], if any.
pub fn global() -> Option<&'static Session> {
    GLOBAL.get()
}
