use async_trait::async_trait;

use crate::{
    db::{MemoryStore, PgStore},
    error::{RepoError, RepoResult},
    projects::repo_types::{Project, ProjectFields},
};

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create_project(&self, user_id: i64, fields: ProjectFields) -> RepoResult<Project>;
    async fn get_project(&self, id: i64) -> RepoResult<Project>;
    /// Update a project owned by `user_id`; `NotFound` if no such pair.
    async fn update_project(
        &self,
        id: i64,
        user_id: i64,
        fields: ProjectFields,
    ) -> RepoResult<Project>;
    /// Delete a project and, by cascade, its entries.
    async fn delete_project(&self, id: i64) -> RepoResult<()>;
    async fn list_user_projects(&self, user_id: i64) -> RepoResult<Vec<Project>>;
}

const PROJECT_COLUMNS: &str = "id, user_id, name, about, color, is_private, total_count_hours";

#[async_trait]
impl ProjectRepo for PgStore {
    async fn create_project(&self, user_id: i64, fields: ProjectFields) -> RepoResult<Project> {
        let sql = format!(
            "INSERT INTO project (user_id, name, about, color, is_private)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .bind(&fields.name)
            .bind(&fields.about)
            .bind(&fields.color)
            .bind(fields.is_private)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn get_project(&self, id: i64) -> RepoResult<Project> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = $1");
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn update_project(
        &self,
        id: i64,
        user_id: i64,
        fields: ProjectFields,
    ) -> RepoResult<Project> {
        let sql = format!(
            "UPDATE project
                SET name = $3, about = $4, color = $5, is_private = $6
              WHERE id = $1 AND user_id = $2
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&fields.name)
            .bind(&fields.about)
            .bind(&fields.color)
            .bind(fields.is_private)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }

    async fn delete_project(&self, id: i64) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM project WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_user_projects(&self, user_id: i64) -> RepoResult<Vec<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Project>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)
    }
}

#[async_trait]
impl ProjectRepo for MemoryStore {
    async fn create_project(&self, user_id: i64, fields: ProjectFields) -> RepoResult<Project> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(RepoError::ForeignKeyViolation("project_user_id_fkey".into()));
        }
        let id = t.next_project_id();
        let project = Project {
            id,
            user_id,
            name: fields.name,
            about: fields.about,
            color: fields.color,
            is_private: fields.is_private,
            total_count_hours: 0.0,
        };
        t.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: i64) -> RepoResult<Project> {
        let t = self.tables.read().await;
        t.projects.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn update_project(
        &self,
        id: i64,
        user_id: i64,
        fields: ProjectFields,
    ) -> RepoResult<Project> {
        let mut t = self.tables.write().await;
        let project = t
            .projects
            .get_mut(&id)
            .filter(|p| p.user_id == user_id)
            .ok_or(RepoError::NotFound)?;
        project.name = fields.name;
        project.about = fields.about;
        project.color = fields.color;
        project.is_private = fields.is_private;
        Ok(project.clone())
    }

    async fn delete_project(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t.cascade_delete_project(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    async fn list_user_projects(&self, user_id: i64) -> RepoResult<Vec<Project>> {
        let t = self.tables.read().await;
        Ok(t.projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}
