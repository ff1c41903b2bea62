use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::auth::session::{MemorySessionStore, PgSessionStore, SessionManager, SessionStore};
use crate::config::{AppConfig, StoreBackend};
use crate::db::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionManager,
    pub config: Arc<AppConfig>,
    pool: Option<PgPool>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                let pg = PgStore::connect(&config).await?;
                let pool = pg.pool.clone();
                let sessions = Arc::new(PgSessionStore::new(pool.clone())) as Arc<dyn SessionStore>;
                let mut state = Self::from_parts(Arc::new(pg), sessions, Arc::new(config));
                state.pool = Some(pool);
                Ok(state)
            }
            StoreBackend::Memory => {
                info!("using in-memory store; data is lost on exit");
                Ok(Self::memory_with(config))
            }
        }
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        sessions: Arc<dyn SessionStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        let sessions = SessionManager::new(sessions, config.session.ttl_seconds);
        Self {
            store,
            sessions,
            config,
            pool: None,
        }
    }

    /// Fresh in-memory store and sessions with default settings.
    pub fn memory() -> Self {
        Self::memory_with(AppConfig::memory())
    }

    pub fn memory_with(config: AppConfig) -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySessionStore::new()),
            Arc::new(config),
        )
    }

    /// Truncate every table and end all sessions. Ids restart, so a session
    /// outliving its user would resolve to whoever gets the id next.
    pub async fn reset(&self) -> anyhow::Result<()> {
        self.store.truncate_all().await?;
        self.sessions.clear().await?;
        info!("store reset");
        Ok(())
    }

    /// Release the connection pool, if any.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("database pool closed");
        }
    }
}
