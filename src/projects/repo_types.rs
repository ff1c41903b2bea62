use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub about: String,
    pub color: String,
    pub is_private: bool,
    pub total_count_hours: f64,
}

/// Editable project fields, used for both insert and update.
#[derive(Debug, Clone)]
pub struct ProjectFields {
    pub name: String,
    pub about: String,
    pub color: String,
    pub is_private: bool,
}
