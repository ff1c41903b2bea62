use std::{collections::BTreeMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    config::AppConfig,
    entries::{repo::EntryRepo, repo_types::Entry},
    error::{RepoError, RepoResult},
    projects::{repo::ProjectRepo, repo_types::Project},
};

/// Every table the service owns, in truncation order.
pub const ALL_TABLES: [&str; 8] = [
    "users",
    "project",
    "entry",
    "tag",
    "tag_entry",
    "goal",
    "friend_relation",
    "session",
];

/// Persistence layer: one repository per entity plus whole-store maintenance.
#[async_trait]
pub trait Store: UserRepo + ProjectRepo + EntryRepo + Send + Sync {
    /// Empty every table and restart id sequences.
    async fn truncate_all(&self) -> RepoResult<()>;
}

// ---- Postgres ----

#[derive(Clone)]
pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is not configured")?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        info!(max_connections = config.max_connections, "postgres store ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn truncate_all(&self) -> RepoResult<()> {
        let sql = format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", ALL_TABLES.join(", "));
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        Ok(())
    }
}

// ---- in-memory ----

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: BTreeMap<i64, User>,
    pub projects: BTreeMap<i64, Project>,
    pub entries: BTreeMap<i64, Entry>,
    user_seq: i64,
    project_seq: i64,
    entry_seq: i64,
}

impl Tables {
    pub fn next_user_id(&mut self) -> i64 {
        self.user_seq += 1;
        self.user_seq
    }

    pub fn next_project_id(&mut self) -> i64 {
        self.project_seq += 1;
        self.project_seq
    }

    pub fn next_entry_id(&mut self) -> i64 {
        self.entry_seq += 1;
        self.entry_seq
    }

    /// Remove a user with its projects and entries.
    pub fn cascade_delete_user(&mut self, user_id: i64) -> bool {
        if self.users.remove(&user_id).is_none() {
            return false;
        }
        self.projects.retain(|_, p| p.user_id != user_id);
        self.entries.retain(|_, e| e.user_id != user_id);
        true
    }

    /// Remove a project with the entries that reference it.
    pub fn cascade_delete_project(&mut self, project_id: i64) -> bool {
        if self.projects.remove(&project_id).is_none() {
            return false;
        }
        self.entries.retain(|_, e| e.project_id != Some(project_id));
        true
    }
}

/// Process-local store with the same uniqueness and cascade rules as the schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub(crate) tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn truncate_all(&self) -> RepoResult<()> {
        *self.tables.write().await = Tables::default();
        Ok(())
    }
}
