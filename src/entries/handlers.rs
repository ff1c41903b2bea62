use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    entries::{
        dto::{CreateEntryRequest, EntryResponse, ListEntriesQuery, UpdateEntryRequest},
        services,
    },
    error::AppResult,
    http::{envelope, Envelope, JsonBody, PathParam, QueryParams},
    state::AppState,
};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entry/create", post(create_entry))
        .route("/entry/edit", post(update_entry))
        .route("/entry/:id", get(get_entry).delete(delete_entry))
        .route("/me/entries", get(my_entries))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<Envelope<EntryResponse>>)> {
    let entry = services::create_entry(&state, auth.user_id, payload.into()).await?;
    Ok((StatusCode::CREATED, envelope(entry.into())))
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<UpdateEntryRequest>,
) -> AppResult<Json<Envelope<EntryResponse>>> {
    let id = payload.id;
    let entry = services::update_entry(&state, auth.user_id, id, payload.into()).await?;
    Ok(envelope(entry.into()))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn get_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Envelope<EntryResponse>>> {
    let entry = services::get_owned_entry(&state, auth.user_id, id).await?;
    Ok(envelope(entry.into()))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<StatusCode> {
    services::delete_entry(&state, auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, auth, query), fields(user_id = auth.user_id))]
pub async fn my_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ListEntriesQuery>,
) -> AppResult<Json<Envelope<Vec<EntryResponse>>>> {
    let entries = services::list_entries(&state, auth.user_id, query.day.as_deref()).await?;
    Ok(envelope(entries.into_iter().map(EntryResponse::from).collect()))
}
