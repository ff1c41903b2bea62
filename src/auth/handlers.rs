use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    auth::{
        dto::{PublicUser, SignInRequest, SignUpRequest},
        extractors::{cleared_cookie, session_cookie, AuthUser},
        services,
    },
    error::AppResult,
    http::{envelope, Envelope, JsonBody},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
        .route("/logout", post(logout))
        .route("/auth", get(auth))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).delete(delete_me))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<Envelope<PublicUser>>)> {
    let (user, session) = services::sign_up(&state, payload).await?;
    let cookie = session_cookie(
        &state.config.session.cookie_name,
        &session,
        state.sessions.ttl(),
    );
    Ok((StatusCode::CREATED, jar.add(cookie), envelope(user.into())))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<SignInRequest>,
) -> AppResult<(CookieJar, Json<Envelope<PublicUser>>)> {
    let (user, session) = services::sign_in(&state, payload).await?;
    let cookie = session_cookie(
        &state.config.session.cookie_name,
        &session,
        state.sessions.ttl(),
    );
    Ok((jar.add(cookie), envelope(user.into())))
}

#[instrument(skip(state, jar, auth), fields(user_id = auth.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> AppResult<(StatusCode, CookieJar)> {
    services::logout(&state, &auth.token).await?;
    let jar = jar.add(cleared_cookie(&state.config.session.cookie_name));
    Ok((StatusCode::NO_CONTENT, jar))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn auth(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Envelope<PublicUser>>> {
    let user = services::current_user(&state, auth.user_id).await?;
    Ok(envelope(user.into()))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Envelope<PublicUser>>> {
    let user = services::current_user(&state, auth.user_id).await?;
    Ok(envelope(user.into()))
}

#[instrument(skip(state, jar, auth), fields(user_id = auth.user_id))]
pub async fn delete_me(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> AppResult<(StatusCode, CookieJar)> {
    services::delete_account(&state, auth.user_id).await?;
    let jar = jar.add(cleared_cookie(&state.config.session.cookie_name));
    Ok((StatusCode::NO_CONTENT, jar))
}
