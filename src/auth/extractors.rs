use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::session::{SessionKeys, SESSION_COOKIE};
use crate::notice::{self, Notice};

/// Session gate: the id of the logged-in user. Handlers taking this are only
/// reached with a valid session; everyone else is sent to `/login`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Err(login_required(CookieJar::new()));
        };

        match keys.verify(&token) {
            Ok(claims) => Ok(CurrentUser(claims.sub)),
            Err(e) => {
                debug!(error = %e, "rejecting session cookie");
                Err(login_required(CookieJar::new().add(keys.removal_cookie())))
            }
        }
    }
}

fn login_required(jar: CookieJar) -> Response {
    (notice::push(jar, Notice::LoginRequired), Redirect::to("/login")).into_response()
}
