use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORE_BACKEND {other:?}, expected postgres or memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub sweep_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_token".into(),
            ttl_seconds: 60 * 60 * 24 * 365,
            sweep_seconds: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set for the postgres backend");
        }

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl_seconds: env_parse("SESSION_TTL_SECONDS")?.unwrap_or(defaults.ttl_seconds),
            sweep_seconds: env_parse("SESSION_SWEEP_SECONDS")?.unwrap_or(defaults.sweep_seconds),
        };
        if session.ttl_seconds <= 0 {
            anyhow::bail!("SESSION_TTL_SECONDS must be positive");
        }
        if session.sweep_seconds == 0 {
            anyhow::bail!("SESSION_SWEEP_SECONDS must be positive");
        }

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT")?.unwrap_or(8080),
            backend,
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS")?.unwrap_or(10),
            session,
        })
    }

    /// In-memory configuration used by tests and `STORE_BACKEND=memory` runs.
    pub fn memory() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            session: SessionConfig::default(),
        }
    }
}

fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(None),
    }
}
