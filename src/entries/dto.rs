use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::entries::{
    duration::pretty_duration,
    repo_types::{Entry, EntryFields},
};

/// Request body for `POST /entry/create`.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub time_end: OffsetDateTime,
}

/// Request body for `POST /entry/edit`.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub time_end: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    pub day: Option<String>,
}

impl From<CreateEntryRequest> for EntryFields {
    fn from(r: CreateEntryRequest) -> Self {
        Self {
            project_id: r.project_id,
            description: r.description,
            time_start: r.time_start,
            time_end: r.time_end,
        }
    }
}

impl From<UpdateEntryRequest> for EntryFields {
    fn from(r: UpdateEntryRequest) -> Self {
        Self {
            project_id: r.project_id,
            description: r.description,
            time_start: r.time_start,
            time_end: r.time_end,
        }
    }
}

/// Entry as returned to the client, with its derived duration. Timestamps are
/// always rendered in UTC whatever offset they were submitted with.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub time_end: OffsetDateTime,
    pub duration: String,
}

impl From<Entry> for EntryResponse {
    fn from(e: Entry) -> Self {
        Self {
            duration: pretty_duration(e.time_start, e.time_end),
            id: e.id,
            user_id: e.user_id,
            project_id: e.project_id,
            description: e.description,
            time_start: e.time_start.to_offset(UtcOffset::UTC),
            time_end: e.time_end.to_offset(UtcOffset::UTC),
        }
    }
}
