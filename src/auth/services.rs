use anyhow::Context;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{SignInRequest, SignUpRequest},
        password::{hash_password, verify_password},
        repo_types::{NewUser, User, DEFAULT_ROLE},
        session::Session,
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub const MAX_NAME_LEN: usize = 35;
pub const MAX_EMAIL_LEN: usize = 254;

pub(crate) fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn max_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn validate_sign_up(req: &mut SignUpRequest) -> AppResult<()> {
    req.name = req.name.trim().to_string();
    req.email = req.email.trim().to_string();
    require("name", &req.name)?;
    require("email", &req.email)?;
    require("password", &req.password)?;
    max_len("name", &req.name, MAX_NAME_LEN)?;
    max_len("email", &req.email, MAX_EMAIL_LEN)?;
    Ok(())
}

async fn hash_blocking(password: String) -> AppResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task")??;
    Ok(hash)
}

async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("password verification task")??;
    Ok(ok)
}

/// Create the user, then its first session. A failed session rolls the user back.
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_up(state: &AppState, mut req: SignUpRequest) -> AppResult<(User, Session)> {
    validate_sign_up(&mut req)?;

    let password_hash = hash_blocking(req.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            about: req.about,
            role: DEFAULT_ROLE.to_string(),
            password_hash,
        })
        .await
        .map_err(|e| AppError::from_repo("user", e))?;

    let session = match state.sessions.create_session(user.id).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, user_id = user.id, "session creation failed; removing new user");
            if let Err(cleanup) = state.store.delete_user(user.id).await {
                error!(error = %cleanup, user_id = user.id, "rollback of new user failed");
            }
            return Err(e);
        }
    };

    info!(user_id = user.id, "user signed up");
    Ok((user, session))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_in(state: &AppState, req: SignInRequest) -> AppResult<(User, Session)> {
    require("email", &req.email)?;
    require("password", &req.password)?;

    let user = state
        .store
        .find_user_by_email(req.email.trim())
        .await
        .map_err(|e| AppError::from_repo("user", e))?;
    let Some(user) = user else {
        warn!("sign in with unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_blocking(req.password, user.password_hash.clone()).await? {
        warn!(user_id = user.id, "sign in with invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let session = state.sessions.create_session(user.id).await?;
    info!(user_id = user.id, "user signed in");
    Ok((user, session))
}

#[instrument(skip(state, token))]
pub async fn logout(state: &AppState, token: &str) -> AppResult<()> {
    state.sessions.destroy(token).await
}

/// The user behind a valid session. A session whose user is gone is rejected.
#[instrument(skip(state))]
pub async fn current_user(state: &AppState, user_id: i64) -> AppResult<User> {
    match state.store.get_user(user_id).await {
        Ok(user) => Ok(user),
        Err(crate::error::RepoError::NotFound) => {
            warn!(user_id, "session refers to a deleted user");
            Err(AppError::unauthenticated("user no longer exists"))
        }
        Err(e) => Err(AppError::from_repo("user", e)),
    }
}

/// Delete the account with everything it owns and end all of its sessions.
#[instrument(skip(state))]
pub async fn delete_account(state: &AppState, user_id: i64) -> AppResult<()> {
    state
        .store
        .delete_user(user_id)
        .await
        .map_err(|e| AppError::from_repo("user", e))?;
    state.sessions.destroy_all_for(user_id).await?;
    info!(user_id, "account deleted");
    Ok(())
}
