use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use crate::{
    auth::session::Session,
    error::AppError,
    state::AppState,
};

/// Caller authenticated by a valid session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string())
            .ok_or_else(|| AppError::unauthenticated("missing session cookie"))?;

        let user_id = match state.sessions.validate(&token).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "session rejected");
                return Err(e);
            }
        };

        Ok(Self { user_id, token })
    }
}

pub fn session_cookie(name: &str, session: &Session, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((name.to_string(), session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Cookie that makes the browser drop the session.
pub fn cleared_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}
