use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::AnyPool;
use tracing::{info, warn};

use crate::{
    auth::{dto::RegisterForm, extractors::CurrentUser, password::hash_password},
    error::{AppError, AppResult},
    notice::{self, Notice},
    users::repo_types::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validates the form, checks uniqueness up front, hashes the password and
/// stores the user. The store's own constraints still settle races.
pub async fn register_user(db: &AnyPool, form: RegisterForm) -> AppResult<User> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(AppError::bad_input(Notice::MissingCredentials, "/register"));
    }

    let email = Some(form.email.trim()).filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !is_valid_email(email) {
            warn!(%email, "invalid email");
            return Err(AppError::bad_input(Notice::InvalidEmail, "/register"));
        }
    }

    if User::find_by_username(db, username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }
    if let Some(email) = email {
        if User::find_by_email(db, email).await?.is_some() {
            warn!(%email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }
    }

    let hash = hash_password(&form.password)?;
    let user = User::insert(db, username, email, &hash).await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Unknown username and wrong password are indistinguishable to the caller.
pub async fn authenticate(db: &AnyPool, username: &str, password: &str) -> AppResult<User> {
    let Some(user) = User::find_by_username(db, username.trim()).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !user.verify_password(password) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}

/// Everything a rendered page needs besides its own data: the logged-in user
/// and the pending notice (cleared in the returned jar).
pub async fn page_context(
    db: &AnyPool,
    current: Option<CurrentUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Option<User>, Option<Notice>)> {
    let viewer = match current {
        Some(CurrentUser(id)) => User::find_by_id(db, id).await?,
        None => None,
    };
    let (jar, notice) = notice::take(jar);
    Ok((jar, viewer, notice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn form(username: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    async fn user_count(db: &AnyPool) -> usize {
        User::list_with_review_counts(db).await.unwrap().len()
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_without_writing() {
        let state = AppState::for_tests().await;
        register_user(&state.db, form("alice", "", "pw1")).await.unwrap();

        let err = register_user(&state.db, form("alice", "", "pw2")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(user_count(&state.db).await, 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = AppState::for_tests().await;
        register_user(&state.db, form("alice", "a@example.com", "pw")).await.unwrap();

        let err = register_user(&state.db, form("bob", " a@example.com ", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(user_count(&state.db).await, 1);
    }

    #[tokio::test]
    async fn blank_email_is_stored_as_absent() {
        let state = AppState::for_tests().await;
        let a = register_user(&state.db, form("a", "  ", "pw")).await.unwrap();
        let b = register_user(&state.db, form("b", "", "pw")).await.unwrap();
        assert_eq!(a.email, None);
        assert_eq!(b.email, None);
    }

    #[tokio::test]
    async fn rejects_blank_credentials_and_bad_email() {
        let state = AppState::for_tests().await;
        let err = register_user(&state.db, form("  ", "", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::BadInput { notice: Notice::MissingCredentials, .. }));
        let err = register_user(&state.db, form("x", "nope", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::BadInput { notice: Notice::InvalidEmail, .. }));
        assert_eq!(user_count(&state.db).await, 0);
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let state = AppState::for_tests().await;
        let user = register_user(&state.db, form("alice", "", "hunter2")).await.unwrap();
        assert_ne!(user.password_hash, "hunter2");
        assert!(user.verify_password("hunter2"));
    }

    #[tokio::test]
    async fn login_failures_are_generic() {
        let state = AppState::for_tests().await;
        register_user(&state.db, form("alice", "", "right")).await.unwrap();

        let wrong_password = authenticate(&state.db, "alice", "wrong").await.unwrap_err();
        let unknown_user = authenticate(&state.db, "nobody", "right").await.unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        let user = authenticate(&state.db, "alice", "right").await.unwrap();
        assert_eq!(user.username, "alice");
    }
}
