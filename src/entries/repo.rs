use async_trait::async_trait;

use crate::{
    db::{MemoryStore, PgStore},
    entries::repo_types::{Entry, EntryFields, TimeWindow},
    error::{RepoError, RepoResult, ENTRY_TIME_RANGE},
};

#[async_trait]
pub trait EntryRepo: Send + Sync {
    async fn create_entry(&self, user_id: i64, fields: EntryFields) -> RepoResult<Entry>;
    async fn get_entry(&self, id: i64) -> RepoResult<Entry>;
    async fn update_entry(&self, id: i64, user_id: i64, fields: EntryFields) -> RepoResult<Entry>;
    async fn delete_entry(&self, id: i64) -> RepoResult<()>;
    /// Entries of `user_id` ordered by `time_start`, optionally limited to a window.
    async fn list_user_entries(
        &self,
        user_id: i64,
        window: Option<TimeWindow>,
    ) -> RepoResult<Vec<Entry>>;
}

const ENTRY_COLUMNS: &str = "id, user_id, project_id, description, time_start, time_end";

#[async_trait]
impl EntryRepo for PgStore {
    async fn create_entry(&self, user_id: i64, fields: EntryFields) -> RepoResult<Entry> {
        let sql = format!(
            "INSERT INTO entry (user_id, project_id, description, time_start, time_end)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(user_id)
            .bind(fields.project_id)
            .bind(&fields.description)
            .bind(fields.time_start)
            .bind(fields.time_end)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn get_entry(&self, id: i64) -> RepoResult<Entry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entry WHERE id = $1");
        sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn update_entry(&self, id: i64, user_id: i64, fields: EntryFields) -> RepoResult<Entry> {
        let sql = format!(
            "UPDATE entry
                SET project_id = $3, description = $4, time_start = $5, time_end = $6
              WHERE id = $1 AND user_id = $2
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(fields.project_id)
            .bind(&fields.description)
            .bind(fields.time_start)
            .bind(fields.time_end)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn delete_entry(&self, id: i64) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM entry WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_user_entries(
        &self,
        user_id: i64,
        window: Option<TimeWindow>,
    ) -> RepoResult<Vec<Entry>> {
        let rows = match window {
            Some(w) => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM entry
                      WHERE user_id = $1 AND time_start BETWEEN $2 AND $3
                      ORDER BY time_start, id"
                );
                sqlx::query_as::<_, Entry>(&sql)
                    .bind(user_id)
                    .bind(w.from)
                    .bind(w.to)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS} FROM entry WHERE user_id = $1 ORDER BY time_start, id"
                );
                sqlx::query_as::<_, Entry>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
            }
        };
        rows.map_err(RepoError::from_sqlx)
    }
}

impl MemoryStore {
    fn check_entry(t: &crate::db::Tables, user_id: i64, fields: &EntryFields) -> RepoResult<()> {
        if !t.users.contains_key(&user_id) {
            return Err(RepoError::ForeignKeyViolation("entry_user_id_fkey".into()));
        }
        if let Some(pid) = fields.project_id {
            if !t.projects.contains_key(&pid) {
                return Err(RepoError::ForeignKeyViolation("entry_project_id_fkey".into()));
            }
        }
        if fields.time_end <= fields.time_start {
            return Err(RepoError::CheckViolation(ENTRY_TIME_RANGE.into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EntryRepo for MemoryStore {
    async fn create_entry(&self, user_id: i64, fields: EntryFields) -> RepoResult<Entry> {
        let mut t = self.tables.write().await;
        Self::check_entry(&t, user_id, &fields)?;
        let id = t.next_entry_id();
        let entry = Entry {
            id,
            user_id,
            project_id: fields.project_id,
            description: fields.description,
            time_start: fields.time_start,
            time_end: fields.time_end,
        };
        t.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: i64) -> RepoResult<Entry> {
        let t = self.tables.read().await;
        t.entries.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn update_entry(&self, id: i64, user_id: i64, fields: EntryFields) -> RepoResult<Entry> {
        let mut t = self.tables.write().await;
        match t.entries.get(&id) {
            Some(e) if e.user_id == user_id => {}
            _ => return Err(RepoError::NotFound),
        }
        Self::check_entry(&t, user_id, &fields)?;
        let entry = t.entries.get_mut(&id).ok_or(RepoError::NotFound)?;
        entry.project_id = fields.project_id;
        entry.description = fields.description;
        entry.time_start = fields.time_start;
        entry.time_end = fields.time_end;
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        t.entries.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn list_user_entries(
        &self,
        user_id: i64,
        window: Option<TimeWindow>,
    ) -> RepoResult<Vec<Entry>> {
        let t = self.tables.read().await;
        let mut entries: Vec<Entry> = t
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .filter(|e| window.map_or(true, |w| w.contains(e.time_start)))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.time_start, e.id));
        Ok(entries)
    }
}
