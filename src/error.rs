use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors raised by the repositories, independent of the backend.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Name of the `time_end > time_start` table constraint.
pub const ENTRY_TIME_RANGE: &str = "entry_time_range";

impl RepoError {
    /// Classify a sqlx error by its Postgres constraint kind.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown").to_string();
            if db.is_unique_violation() {
                return Self::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(constraint);
            }
            if db.is_check_violation() {
                return Self::CheckViolation(constraint);
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }
        Self::Database(err)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("time_end must be after time_start")]
    InvalidRange,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("permission denied")]
    PermissionDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidRange => "invalid_range",
            Self::DuplicateEmail => "duplicate_email",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::InvalidCredentials => "invalid_credentials",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRange => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::Unauthenticated(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a repository failure for the entity named `what`.
    pub fn from_repo(what: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::NotFound | RepoError::ForeignKeyViolation(_) => Self::NotFound(what),
            RepoError::UniqueViolation(constraint) if constraint.contains("email") => {
                Self::DuplicateEmail
            }
            RepoError::CheckViolation(constraint) if constraint == ENTRY_TIME_RANGE => {
                Self::InvalidRange
            }
            other => Self::Internal(anyhow::Error::new(other).context(format!("{what} repository"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // internals stay in the logs
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
