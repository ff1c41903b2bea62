use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    http::{envelope, Envelope, JsonBody, PathParam},
    projects::{
        dto::{CreateProjectRequest, UpdateProjectRequest},
        repo_types::Project,
        services,
    },
    state::AppState,
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/project/create", post(create_project))
        .route("/project/edit", post(update_project))
        .route("/project/:id", get(get_project).delete(delete_project))
        .route("/me/projects", get(my_projects))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Project>>)> {
    let project = services::create_project(&state, auth.user_id, payload.into()).await?;
    Ok((StatusCode::CREATED, envelope(project)))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<UpdateProjectRequest>,
) -> AppResult<Json<Envelope<Project>>> {
    let id = payload.id;
    let project = services::update_project(&state, auth.user_id, id, payload.into()).await?;
    Ok(envelope(project))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Envelope<Project>>> {
    let project = services::get_owned_project(&state, auth.user_id, id).await?;
    Ok(envelope(project))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<StatusCode> {
    services::delete_project(&state, auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn my_projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Envelope<Vec<Project>>>> {
    let projects = services::list_projects(&state, auth.user_id).await?;
    Ok(envelope(projects))
}
