use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    auth::{services::page_context, CurrentUser},
    error::AppResult,
    notice::{self, Notice},
    reviews::repo_types::Review,
    state::AppState,
    users::repo_types::User,
    views::{self, Page},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:id", get(user_profile))
        .route("/users", get(users_list))
}

pub async fn user_profile(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    let Some(user) = User::find_by_id(&state.db, id).await? else {
        return Ok((notice::push(jar, Notice::UserNotFound), Redirect::to("/")).into_response());
    };

    let reviews = Review::list_by_owner(&state.db, user.id).await?;
    let count = Review::count_by_owner(&state.db, user.id).await?;
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::user_profile(&page, &user, &reviews, count))).into_response())
}

pub async fn users_list(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let users = User::list_with_review_counts(&state.db).await?;
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::users_list(&page, &users))))
}
