use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{services::page_context, CurrentUser},
    error::{AppError, AppResult},
    notice::{self, Notice},
    reviews::{
        access::ensure_owner,
        dto::{ReviewForm, SearchQuery},
        repo_types::Review,
    },
    state::AppState,
    views::{self, Page},
};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/review/new", get(new_review_page).post(create_review))
        .route("/review/:id", get(view_review))
        .route("/review/:id/edit", get(edit_review_page).post(update_review))
        .route("/review/:id/delete", post(delete_review))
        .route("/search", get(search))
}

type PageResult = AppResult<(CookieJar, Html<String>)>;

async fn fetch(state: &AppState, id: i64) -> AppResult<Review> {
    Review::get_by_id(&state.db, id).await?.ok_or(AppError::NotFound)
}

pub async fn index(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    jar: CookieJar,
) -> PageResult {
    let reviews = Review::list_all(&state.db).await?;
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::index(&page, &reviews))))
}

pub async fn new_review_page(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> PageResult {
    let (jar, viewer, notice) = page_context(&state.db, Some(current), jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::review_form(&page, None))))
}

#[instrument(skip(state, jar, form))]
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let fields = form.into_fields("/review/new")?;
    let id = Review::create(&state.db, user_id, &fields).await?;
    info!(review_id = id, user_id, "review posted");
    Ok((notice::push(jar, Notice::ReviewPosted), Redirect::to("/")))
}

pub async fn view_review(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> PageResult {
    let review = fetch(&state, id).await?;
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::review_detail(&page, &review))))
}

pub async fn edit_review_page(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> PageResult {
    let review = fetch(&state, id).await?;
    ensure_owner(current.0, &review, Notice::NotAllowedToEdit)?;

    let (jar, viewer, notice) = page_context(&state.db, Some(current), jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::review_form(&page, Some(&review)))))
}

#[instrument(skip(state, jar, form))]
pub async fn update_review(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let review = fetch(&state, id).await?;
    ensure_owner(user_id, &review, Notice::NotAllowedToEdit)?;

    let fields = form.into_fields(&format!("/review/{id}/edit"))?;
    if !Review::update(&state.db, id, &fields).await? {
        return Err(AppError::NotFound);
    }
    info!(review_id = id, user_id, "review updated");
    Ok((notice::push(jar, Notice::ReviewUpdated), Redirect::to(&format!("/review/{id}"))))
}

#[instrument(skip(state, jar))]
pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let review = fetch(&state, id).await?;
    ensure_owner(user_id, &review, Notice::NotAllowedToDelete)?;

    if !Review::delete(&state.db, id).await? {
        return Err(AppError::NotFound);
    }
    info!(review_id = id, user_id, "review deleted");
    Ok((notice::push(jar, Notice::ReviewDeleted), Redirect::to("/")))
}

pub async fn search(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Query(params): Query<SearchQuery>,
    jar: CookieJar,
) -> PageResult {
    let query = params.q.trim();
    if query.is_empty() {
        return Err(AppError::bad_input(Notice::EmptySearch, "/"));
    }

    let reviews = Review::search(&state.db, query).await?;
    let (jar, viewer, notice) = page_context(&state.db, current, jar).await?;
    let page = Page { viewer: viewer.as_ref(), notice };
    Ok((jar, Html(views::search_results(&page, query, &reviews))))
}
