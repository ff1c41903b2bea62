use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub time_end: OffsetDateTime,
}

/// Editable entry fields, used for both insert and update.
#[derive(Debug, Clone)]
pub struct EntryFields {
    pub project_id: Option<i64>,
    pub description: String,
    pub time_start: OffsetDateTime,
    pub time_end: OffsetDateTime,
}

/// Inclusive `time_start` window used by the per-day listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
}

impl TimeWindow {
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.from <= t && t <= self.to
    }
}
