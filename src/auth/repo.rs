use async_trait::async_trait;

use crate::{
    auth::repo_types::{NewUser, User},
    db::{MemoryStore, PgStore},
    error::{RepoError, RepoResult},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user; a taken email yields `UniqueViolation("users_email_key")`.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn get_user(&self, id: i64) -> RepoResult<User>;
    /// Delete a user; owned projects, entries and sessions go with it.
    async fn delete_user(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, about, role, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, about, role, password
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.about)
        .bind(&user.role)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, about, role, password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)
    }

    async fn get_user(&self, id: i64) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, about, role, password FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)
    }

    async fn delete_user(&self, id: i64) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from_sqlx)?;
        sqlx::query("DELETE FROM session WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepoError::from_sqlx)?;
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(RepoError::from_sqlx)?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        tx.commit().await.map_err(RepoError::from_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::UniqueViolation("users_email_key".into()));
        }
        let id = t.next_user_id();
        let row = User {
            id,
            name: user.name,
            email: user.email,
            about: user.about,
            role: user.role,
            password_hash: user.password_hash,
        };
        t.users.insert(id, row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: i64) -> RepoResult<User> {
        let t = self.tables.read().await;
        t.users.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, id: i64) -> RepoResult<()> {
        let mut t = self.tables.write().await;
        if t.cascade_delete_user(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::DEFAULT_ROLE;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "string".into(),
            email: email.into(),
            about: "string".into(),
            role: DEFAULT_ROLE.into(),
            password_hash: "$argon2id$fake".into(),
        }
    }

    #[tokio::test]
    async fn memory_rejects_duplicate_email() {
        let store = MemoryStore::new();
        let first = store.create_user(new_user("a@b.c")).await.unwrap();
        assert_eq!(first.id, 1);

        let err = store.create_user(new_user("a@b.c")).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation(c) if c.contains("email")));
        assert_eq!(store.tables.read().await.users.len(), 1);
    }

    #[tokio::test]
    async fn memory_lookup_and_delete() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("x@y.z")).await.unwrap();

        let found = store.find_user_by_email("x@y.z").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_email("nobody").await.unwrap().is_none());

        store.delete_user(user.id).await.unwrap();
        assert!(matches!(store.get_user(user.id).await, Err(RepoError::NotFound)));
        assert!(matches!(store.delete_user(user.id).await, Err(RepoError::NotFound)));
    }
}
