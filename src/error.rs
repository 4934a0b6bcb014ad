use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::error;

use crate::{notice::Notice, views};

/// Failures of the persistence layer, with unique violations classified.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Request-level failures. Everything except `NotFound` and `Internal` is
/// answered with a notice and a redirect to a safe page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden(Notice),

    #[error("bad input: {}", .notice.message())]
    BadInput { notice: Notice, back_to: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_input(notice: Notice, back_to: impl Into<String>) -> Self {
        Self::BadInput {
            notice,
            back_to: back_to.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => AppError::DuplicateUsername,
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

fn redirect_with(notice: Notice, to: &str) -> Response {
    let jar = crate::notice::push(CookieJar::new(), notice);
    (jar, Redirect::to(to)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DuplicateUsername => redirect_with(Notice::UsernameTaken, "/register"),
            AppError::DuplicateEmail => redirect_with(Notice::EmailTaken, "/register"),
            AppError::InvalidCredentials => redirect_with(Notice::InvalidCredentials, "/login"),
            AppError::Forbidden(notice) => redirect_with(notice, "/"),
            AppError::BadInput { notice, back_to } => redirect_with(notice, &back_to),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(views::error_page(
                    StatusCode::NOT_FOUND,
                    "The page you asked for does not exist.",
                )),
            )
                .into_response(),
            AppError::Internal(e) => {
                error!(error = ?e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Something went wrong. Please try again later.",
                    )),
                )
                    .into_response()
            }
        }
    }
}

/// Maps a store unique violation on `users` to the matching domain error.
pub fn classify_unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            let message = db_err.message();
            if constraint.contains("username") || message.contains("username") {
                return StoreError::DuplicateUsername;
            }
            if constraint.contains("email") || message.contains("email") {
                return StoreError::DuplicateEmail;
            }
        }
    }
    StoreError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn redirecting_errors_set_notice_cookie() {
        let res = AppError::DuplicateUsername.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/register");
        let cookie = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("notice=username-taken"));
    }

    #[test]
    fn bad_input_returns_to_its_form() {
        let res = AppError::bad_input(Notice::RatingNotInteger, "/review/7/edit").into_response();
        assert_eq!(res.headers()[header::LOCATION], "/review/7/edit");
    }

    #[test]
    fn not_found_renders_error_page() {
        let res = AppError::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_hides_detail() {
        let res = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_convert() {
        assert!(matches!(AppError::from(StoreError::DuplicateEmail), AppError::DuplicateEmail));
        assert!(matches!(
            AppError::from(StoreError::Database(sqlx::Error::RowNotFound)),
            AppError::Internal(_)
        ));
    }
}
