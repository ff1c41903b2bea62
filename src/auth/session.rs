//! Session manager: opaque cookie tokens bound to a user id with an expiry.
//!
//! Tokens are 32 bytes from the OS CSPRNG, base64url encoded without padding.
//! The backing [`SessionStore`] is either process-local (swept periodically)
//! or the `session` table.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sqlx::{FromRow, PgPool};
use time::{Duration as TimeDuration, OffsetDateTime};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};

pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Shape check done before any store lookup.
pub fn is_well_formed(token: &str) -> bool {
    lazy_static! {
        static ref TOKEN_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{43}$").unwrap();
    }
    TOKEN_RE.is_match(token)
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> anyhow::Result<()>;
    async fn get(&self, token: &str) -> anyhow::Result<Option<Session>>;
    /// Returns whether a session was removed.
    async fn remove(&self, token: &str) -> anyhow::Result<bool>;
    async fn remove_user(&self, user_id: i64) -> anyhow::Result<u64>;
    async fn purge_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64>;
    /// Drop every session regardless of owner or expiry.
    async fn clear(&self) -> anyhow::Result<u64>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> anyhow::Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn get(&self, token: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.sessions.write().await.remove(token).is_some())
    }

    async fn remove_user(&self, user_id: i64) -> anyhow::Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.len() as u64;
        sessions.clear();
        Ok(removed)
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: Session) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO session (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, expires_at FROM session WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn remove(&self, token: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM session WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_user(&self, user_id: i64) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM session WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM session WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn clear(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM session").execute(&self.pool).await?;
        Ok(res.rows_affected())
    }
}

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: TimeDuration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, ttl_seconds: i64) -> Self {
        Self {
            store,
            ttl: TimeDuration::seconds(ttl_seconds),
        }
    }

    pub fn ttl(&self) -> TimeDuration {
        self.ttl
    }

    #[instrument(skip(self))]
    pub async fn create_session(&self, user_id: i64) -> AppResult<Session> {
        let session = Session {
            token: generate_token(),
            user_id,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.store.insert(session.clone()).await?;
        debug!(user_id, "session created");
        Ok(session)
    }

    /// Resolve a token to its user id.
    pub async fn validate(&self, token: &str) -> AppResult<i64> {
        if token.is_empty() {
            return Err(AppError::unauthenticated("missing session token"));
        }
        if !is_well_formed(token) {
            return Err(AppError::unauthenticated("malformed session token"));
        }
        let Some(session) = self.store.get(token).await? else {
            return Err(AppError::unauthenticated("unknown session"));
        };
        if session.is_expired_at(OffsetDateTime::now_utc()) {
            self.store.remove(token).await?;
            debug!(user_id = session.user_id, "expired session evicted");
            return Err(AppError::unauthenticated("session expired"));
        }
        Ok(session.user_id)
    }

    pub async fn destroy(&self, token: &str) -> AppResult<()> {
        if !is_well_formed(token) || !self.store.remove(token).await? {
            return Err(AppError::unauthenticated("unknown session"));
        }
        Ok(())
    }

    pub async fn destroy_all_for(&self, user_id: i64) -> AppResult<()> {
        let removed = self.store.remove_user(user_id).await?;
        debug!(user_id, removed, "user sessions removed");
        Ok(())
    }

    /// End every session. Used when the tables are truncated, since ids restart.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let removed = self.store.clear().await?;
        debug!(removed, "all sessions cleared");
        Ok(())
    }

    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        self.store.purge_expired(OffsetDateTime::now_utc()).await
    }

    /// Periodically evict expired sessions until the handle is aborted.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        info!(every_secs = every.as_secs(), "session sweeper started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match manager.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => debug!(purged = n, "expired sessions purged"),
                    Err(e) => warn!(error = %e, "session sweep failed"),
                }
            }
        })
    }
}
