//! Owner of the authoritative session.
//!
//! [`SessionManager::current_session`] returns an immutable snapshot of a
//! fresh [`Session`], consulting in order the in-memory snapshot, the
//! [`SessionStore`], and finally the remote [`Authorizer`]. Refreshes are
//! serialized: when many callers observe a missing or expired session at the
//! same time only the first one authorizes, and the rest pick up its result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use parking_lot::RwLock;
use rustb2_core::{B2Error, B2Result, Credentials};
use rustb2_model::AccountAuthorization;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::session::{SESSION_KEY, Session};
use crate::store::SessionStore;

/// Performs the remote `b2_authorize_account` call.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync + fmt::Debug {
    /// Exchange an application key for an account authorization.
    ///
    /// Implementations report a rejected key as
    /// [`rustb2_core::B2Error::Unauthorized`].
    async fn authorize(&self, credentials: &Credentials) -> B2Result<AccountAuthorization>;
}

/// Hands out fresh sessions to every API caller.
pub struct SessionManager {
    credentials: Credentials,
    authorizer: Arc<dyn Authorizer>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    current: RwLock<Option<Arc<Session>>>,
    /// Token the service rejected; a stored session carrying it is skipped.
    revoked: RwLock<Option<String>>,
    refresh: tokio::sync::Mutex<()>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("credentials", &self.credentials)
            .field("store", &self.store)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager using the wall clock.
    #[must_use]
    pub fn new(
        credentials: Credentials,
        authorizer: Arc<dyn Authorizer>,
        store: Arc<dyn SessionStore>,
        ttl: Duration,
    ) -> Self {
        Self::with_clock(credentials, authorizer, store, ttl, Arc::new(SystemClock))
    }

    /// Create a manager with an explicit clock.
    #[must_use]
    pub fn with_clock(
        credentials: Credentials,
        authorizer: Arc<dyn Authorizer>,
        store: Arc<dyn SessionStore>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            authorizer,
            store,
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(36_500)),
            current: RwLock::new(None),
            revoked: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Return a fresh session, authorizing if necessary.
    ///
    /// Within the TTL window repeated calls perform no network I/O.
    pub async fn current_session(&self) -> B2Result<Arc<Session>> {
        if let Some(session) = self.fresh_snapshot() {
            return Ok(session);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(session) = self.fresh_snapshot() {
            return Ok(session);
        }

        if let Some(session) = self.restore().await {
            debug!(account_id = %session.account_id(), "Restored session from cache");
            return Ok(self.install(session));
        }

        let session = self.authorize().await?;
        self.persist(&session).await?;
        Ok(self.install(session))
    }

    /// Drop the session carrying `stale_token` after the service rejected it.
    ///
    /// The next [`current_session`](Self::current_session) call re-authorizes
    /// instead of reusing the rejected token from memory or the store.
    pub fn invalidate(&self, stale_token: &str) {
        let mut current = self.current.write();
        if current
            .as_ref()
            .is_some_and(|s| s.authorization_token() == stale_token)
        {
            *current = None;
        }
        *self.revoked.write() = Some(stale_token.to_owned());
        debug!("Invalidated session token");
    }

    fn fresh_snapshot(&self) -> Option<Arc<Session>> {
        let now = self.clock.now();
        self.current
            .read()
            .as_ref()
            .filter(|s| !s.is_expired(now) && !self.is_revoked(s))
            .cloned()
    }

    /// Store I/O runs on the blocking pool; a disk store may stall on a slow
    /// filesystem.
    async fn restore(&self) -> Option<Session> {
        let store = Arc::clone(&self.store);
        let value = match tokio::task::spawn_blocking(move || store.get(SESSION_KEY)).await {
            Ok(Ok(Some(value))) => value,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                warn!(error = %e, "Ignoring unreadable session cache");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Session cache read task failed");
                return None;
            }
        };
        let session: Session = match serde_json::from_value(value) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached session");
                return None;
            }
        };
        (!session.is_expired(self.clock.now()) && !self.is_revoked(&session)).then_some(session)
    }

    async fn authorize(&self) -> B2Result<Session> {
        info!(key_id = %self.credentials.key_id(), "Authorizing account");
        let authorization = self.authorizer.authorize(&self.credentials).await?;
        let session = Session::new(authorization, self.clock.now(), self.ttl);
        debug!(
            account_id = %session.account_id(),
            expires_at = %session.token_expires_at(),
            "Authorized account"
        );
        Ok(session)
    }

    async fn persist(&self, session: &Session) -> B2Result<()> {
        let value = serde_json::to_value(session)?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.set(SESSION_KEY, value))
            .await
            .map_err(|e| B2Error::Internal(e.into()))
            .and_then(|result| result)
            .map_err(|e| {
                warn!(error = %e, "Failed to persist session");
                e
            })
    }

    fn install(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.current.write() = Some(Arc::clone(&session));
        session
    }

    fn is_revoked(&self, session: &Session) -> bool {
        self.revoked
            .read()
            .as_deref()
            .is_some_and(|t| t == session.authorization_token())
    }
}
