use axum::{
    extract::{FromRef, State},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::CurrentUser,
        services::{authenticate, page_context, register_user},
        session::SessionKeys,
    },
    error::AppResult,
    notice::{self, Notice},
    state::AppState,
    views::{self, Page},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

pub async fn register_page(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::register(&page))))
}

#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<(CookieJar, Redirect)> {
    register_user(&state.db, form).await?;
    Ok((notice::push(jar, Notice::Registered), Redirect::to("/login")))
}

pub async fn login_page(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::login(&page))))
}

#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let user = authenticate(&state.db, &form.username, &form.password).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let jar = notice::push(jar.add(keys.cookie(token)), Notice::Welcome);
    Ok((jar, Redirect::to("/")))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let keys = SessionKeys::from_ref(&state);
    let jar = notice::push(jar.add(keys.removal_cookie()), Notice::LoggedOut);
    (jar, Redirect::to("/"))
}
