//! One-shot notices shown on the next rendered page.
//!
//! The cookie only ever carries a code from the closed [`Notice`] set, never
//! user-supplied text.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const NOTICE_COOKIE: &str = "notice";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Registered,
    UsernameTaken,
    EmailTaken,
    InvalidEmail,
    MissingCredentials,
    Welcome,
    InvalidCredentials,
    LoggedOut,
    LoginRequired,
    ReviewPosted,
    ReviewUpdated,
    ReviewDeleted,
    RatingNotInteger,
    NotAllowedToEdit,
    NotAllowedToDelete,
    UserNotFound,
    EmptySearch,
}

const ALL: [Notice; 17] = [
    Notice::Registered,
    Notice::UsernameTaken,
    Notice::EmailTaken,
    Notice::InvalidEmail,
    Notice::MissingCredentials,
    Notice::Welcome,
    Notice::InvalidCredentials,
    Notice::LoggedOut,
    Notice::LoginRequired,
    Notice::ReviewPosted,
    Notice::ReviewUpdated,
    Notice::ReviewDeleted,
    Notice::RatingNotInteger,
    Notice::NotAllowedToEdit,
    Notice::NotAllowedToDelete,
    Notice::UserNotFound,
    Notice::EmptySearch,
];

impl Notice {
    pub fn code(self) -> &'static str {
        match self {
            Notice::Registered => "registered",
            Notice::UsernameTaken => "username-taken",
            Notice::EmailTaken => "email-taken",
            Notice::InvalidEmail => "invalid-email",
            Notice::MissingCredentials => "missing-credentials",
            Notice::Welcome => "welcome",
            Notice::InvalidCredentials => "invalid-credentials",
            Notice::LoggedOut => "logged-out",
            Notice::LoginRequired => "login-required",
            Notice::ReviewPosted => "review-posted",
            Notice::ReviewUpdated => "review-updated",
            Notice::ReviewDeleted => "review-deleted",
            Notice::RatingNotInteger => "rating-not-integer",
            Notice::NotAllowedToEdit => "not-allowed-edit",
            Notice::NotAllowedToDelete => "not-allowed-delete",
            Notice::UserNotFound => "user-not-found",
            Notice::EmptySearch => "empty-search",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL.into_iter().find(|n| n.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::Registered => "Registration successful! Please login.",
            Notice::UsernameTaken => "Username already exists",
            Notice::EmailTaken => "Email already registered",
            Notice::InvalidEmail => "Please enter a valid email address",
            Notice::MissingCredentials => "Username and password are required",
            Notice::Welcome => "Welcome back!",
            Notice::InvalidCredentials => "Invalid credentials",
            Notice::LoggedOut => "Logged out",
            Notice::LoginRequired => "Login required",
            Notice::ReviewPosted => "Review posted!",
            Notice::ReviewUpdated => "Review updated!",
            Notice::ReviewDeleted => "Review deleted.",
            Notice::RatingNotInteger => "Rating must be a whole number",
            Notice::NotAllowedToEdit => "You are not allowed to edit this review.",
            Notice::NotAllowedToDelete => "Not allowed to delete.",
            Notice::UserNotFound => "User not found",
            Notice::EmptySearch => "Please enter a search term",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Notice::Registered | Notice::Welcome | Notice::ReviewPosted | Notice::ReviewUpdated => {
                Level::Success
            }
            Notice::LoggedOut | Notice::ReviewDeleted => Level::Info,
            Notice::LoginRequired | Notice::EmptySearch => Level::Warning,
            Notice::UsernameTaken
            | Notice::EmailTaken
            | Notice::InvalidEmail
            | Notice::MissingCredentials
            | Notice::InvalidCredentials
            | Notice::RatingNotInteger
            | Notice::NotAllowedToEdit
            | Notice::NotAllowedToDelete
            | Notice::UserNotFound => Level::Danger,
        }
    }
}

fn cookie(notice: Notice) -> Cookie<'static> {
    Cookie::build((NOTICE_COOKIE, notice.code()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Queues `notice` for the next page render.
pub fn push(jar: CookieJar, notice: Notice) -> CookieJar {
    jar.add(cookie(notice))
}

/// Pops the pending notice, if any; the returned jar clears the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(code) = jar.get(NOTICE_COOKIE).map(|c| c.value().to_owned()) else {
        return (jar, None);
    };
    let jar = jar.remove(Cookie::build(NOTICE_COOKIE).path("/"));
    (jar, Notice::from_code(&code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique_and_parse_back() {
        for n in ALL {
            assert_eq!(Notice::from_code(n.code()), Some(n));
            assert_eq!(ALL.iter().filter(|m| m.code() == n.code()).count(), 1);
        }
        assert_eq!(Notice::from_code("<script>"), None);
    }

    #[test]
    fn take_clears_pending_notice() {
        let jar = push(CookieJar::new(), Notice::ReviewPosted);
        let (jar, notice) = take(jar);
        assert_eq!(notice, Some(Notice::ReviewPosted));
        assert!(jar.get(NOTICE_COOKIE).is_none());
    }

    #[test]
    fn take_ignores_unknown_codes() {
        let jar = CookieJar::new().add(Cookie::new(NOTICE_COOKIE, "bogus"));
        let (_, notice) = take(jar);
        assert_eq!(notice, None);
    }
}
