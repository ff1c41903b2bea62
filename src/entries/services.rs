use time::{
    macros::{format_description, time},
    Date,
};
use tracing::{info, instrument, warn};

use crate::{
    entries::repo_types::{Entry, EntryFields, TimeWindow},
    error::{AppError, AppResult, RepoError},
    projects::services::get_owned_project,
    state::AppState,
};

/// UTC window `[day 00:00:00, day 23:59:59]` for a `YYYY-MM-DD` string.
pub fn day_window(day: &str) -> AppResult<TimeWindow> {
    let date = Date::parse(day.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("day must be formatted as YYYY-MM-DD"))?;
    let from = date.midnight().assume_utc();
    let to = date.with_time(time!(23:59:59)).assume_utc();
    Ok(TimeWindow { from, to })
}

/// Repository failures on entry writes; foreign keys name the missing row.
fn entry_write_error(err: RepoError) -> AppError {
    match err {
        RepoError::ForeignKeyViolation(c) if c.contains("project") => AppError::NotFound("project"),
        RepoError::ForeignKeyViolation(_) => AppError::NotFound("user"),
        other => AppError::from_repo("entry", other),
    }
}

/// Range and project ownership checks shared by create and edit.
async fn check_fields(state: &AppState, user_id: i64, fields: &EntryFields) -> AppResult<()> {
    if fields.time_end <= fields.time_start {
        return Err(AppError::InvalidRange);
    }
    if let Some(project_id) = fields.project_id {
        get_owned_project(state, user_id, project_id).await?;
    }
    Ok(())
}

pub async fn get_owned_entry(state: &AppState, user_id: i64, id: i64) -> AppResult<Entry> {
    let entry = state
        .store
        .get_entry(id)
        .await
        .map_err(|e| AppError::from_repo("entry", e))?;
    if entry.user_id != user_id {
        warn!(user_id, entry_id = id, owner = entry.user_id, "entry access denied");
        return Err(AppError::PermissionDenied);
    }
    Ok(entry)
}

#[instrument(skip(state, fields))]
pub async fn create_entry(state: &AppState, user_id: i64, fields: EntryFields) -> AppResult<Entry> {
    check_fields(state, user_id, &fields).await?;
    let entry = state
        .store
        .create_entry(user_id, fields)
        .await
        .map_err(entry_write_error)?;
    info!(entry_id = entry.id, "entry created");
    Ok(entry)
}

#[instrument(skip(state, fields))]
pub async fn update_entry(
    state: &AppState,
    user_id: i64,
    id: i64,
    fields: EntryFields,
) -> AppResult<Entry> {
    get_owned_entry(state, user_id, id).await?;
    check_fields(state, user_id, &fields).await?;
    state
        .store
        .update_entry(id, user_id, fields)
        .await
        .map_err(entry_write_error)
}

#[instrument(skip(state))]
pub async fn delete_entry(state: &AppState, user_id: i64, id: i64) -> AppResult<()> {
    get_owned_entry(state, user_id, id).await?;
    state
        .store
        .delete_entry(id)
        .await
        .map_err(|e| AppError::from_repo("entry", e))?;
    info!(entry_id = id, "entry deleted");
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_entries(
    state: &AppState,
    user_id: i64,
    day: Option<&str>,
) -> AppResult<Vec<Entry>> {
    let window = day.map(day_window).transpose()?;
    state
        .store
        .list_user_entries(user_id, window)
        .await
        .map_err(|e| AppError::from_repo("entry", e))
}
