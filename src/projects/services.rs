use tracing::{info, instrument, warn};

use crate::{
    auth::services::{max_len, require},
    error::{AppError, AppResult},
    projects::repo_types::{Project, ProjectFields},
    state::AppState,
};

pub const MAX_PROJECT_NAME_LEN: usize = 35;
pub const MAX_COLOR_LEN: usize = 10;

fn validate(fields: &ProjectFields) -> AppResult<()> {
    require("name", &fields.name)?;
    require("color", &fields.color)?;
    max_len("name", &fields.name, MAX_PROJECT_NAME_LEN)?;
    max_len("color", &fields.color, MAX_COLOR_LEN)?;
    Ok(())
}

/// Load a project and check that `user_id` owns it.
pub async fn get_owned_project(state: &AppState, user_id: i64, id: i64) -> AppResult<Project> {
    let project = state
        .store
        .get_project(id)
        .await
        .map_err(|e| AppError::from_repo("project", e))?;
    if project.user_id != user_id {
        warn!(user_id, project_id = id, owner = project.user_id, "project access denied");
        return Err(AppError::PermissionDenied);
    }
    Ok(project)
}

#[instrument(skip(state, fields))]
pub async fn create_project(
    state: &AppState,
    user_id: i64,
    fields: ProjectFields,
) -> AppResult<Project> {
    validate(&fields)?;
    let project = state
        .store
        .create_project(user_id, fields)
        .await
        .map_err(|e| AppError::from_repo("user", e))?;
    info!(project_id = project.id, "project created");
    Ok(project)
}

#[instrument(skip(state, fields))]
pub async fn update_project(
    state: &AppState,
    user_id: i64,
    id: i64,
    fields: ProjectFields,
) -> AppResult<Project> {
    validate(&fields)?;
    get_owned_project(state, user_id, id).await?;
    state
        .store
        .update_project(id, user_id, fields)
        .await
        .map_err(|e| AppError::from_repo("project", e))
}

#[instrument(skip(state))]
pub async fn delete_project(state: &AppState, user_id: i64, id: i64) -> AppResult<()> {
    get_owned_project(state, user_id, id).await?;
    state
        .store
        .delete_project(id)
        .await
        .map_err(|e| AppError::from_repo("project", e))?;
    info!(project_id = id, "project deleted");
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_projects(state: &AppState, user_id: i64) -> AppResult<Vec<Project>> {
    state
        .store
        .list_user_projects(user_id)
        .await
        .map_err(|e| AppError::from_repo("project", e))
}
