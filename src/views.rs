//! Server-rendered HTML pages.

use axum::http::StatusCode;
use time::{format_description::FormatItem, macros::format_description};

use crate::notice::Notice;
use crate::reviews::repo_types::Review;
use crate::users::repo_types::{User, UserSummary};

const DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// What every page needs: who is looking, and what to tell them.
pub struct Page<'a> {
    pub viewer: Option<&'a User>,
    pub notice: Option<Notice>,
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(page: &Page<'_>, title: &str, body: &str) -> String {
    let nav = match page.viewer {
        Some(user) => format!(
            r#"<a href="/review/new">New review</a> <a href="/user/{}">{}</a> <a href="/logout">Logout</a>"#,
            user.id,
            escape(&user.username)
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string(),
    };
    let notice = page
        .notice
        .map(|n| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                n.level().as_str(),
                escape(n.message())
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title} · Movie Reviews</title></head>
<body>
<header>
  <a href="/">Movie Reviews</a> <a href="/users">Users</a>
  <form action="/search" method="get"><input name="q" placeholder="Search reviews"><button>Search</button></form>
  <nav>{nav}</nav>
</header>
{notice}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

fn review_list(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return "<p>No reviews yet.</p>".to_string();
    }
    let items: String = reviews
        .iter()
        .map(|r| {
            format!(
                r#"<li><a href="/review/{id}">{title}</a> <span class="genre">{genre}</span> <span class="rating">{rating}</span> by <a href="/user/{uid}">{author}</a> <time>{at}</time></li>"#,
                id = r.id,
                title = escape(&r.title),
                genre = escape(&r.genre),
                rating = r.rating,
                uid = r.user_id,
                author = escape(&r.author),
                at = r.created_at.format(DATE_FORMAT).unwrap_or_default(),
            )
        })
        .collect();
    format!(r#"<ul class="reviews">{items}</ul>"#)
}

pub fn index(page: &Page<'_>, reviews: &[Review]) -> String {
    layout(page, "Latest reviews", &format!("<h1>Latest reviews</h1>{}", review_list(reviews)))
}

pub fn register(page: &Page<'_>) -> String {
    let body = r#"<h1>Register</h1>
<form method="post" action="/register">
  <label>Username <input name="username" required></label>
  <label>Email <input name="email" type="email"></label>
  <label>Password <input name="password" type="password" required></label>
  <button>Register</button>
</form>"#;
    layout(page, "Register", body)
}

pub fn login(page: &Page<'_>) -> String {
    let body = r#"<h1>Login</h1>
<form method="post" action="/login">
  <label>Username <input name="username" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button>Login</button>
</form>"#;
    layout(page, "Login", body)
}

/// New-review form, or the edit form when `existing` is given.
pub fn review_form(page: &Page<'_>, existing: Option<&Review>) -> String {
    let (heading, action, button) = match existing {
        Some(r) => ("Edit review", format!("/review/{}/edit", r.id), "Save"),
        None => ("New review", "/review/new".to_string(), "Post"),
    };
    let value = |f: fn(&Review) -> String| existing.map(f).map(|v| escape(&v)).unwrap_or_default();
    let body = format!(
        r#"<h1>{heading}</h1>
<form method="post" action="{action}">
  <label>Title <input name="title" value="{title}" required></label>
  <label>Genre <input name="genre" value="{genre}" required></label>
  <label>Rating <input name="rating" value="{rating}" required></label>
  <label>Review <textarea name="content" required>{content}</textarea></label>
  <button>{button}</button>
</form>"#,
        title = value(|r| r.title.clone()),
        genre = value(|r| r.genre.clone()),
        rating = value(|r| r.rating.to_string()),
        content = value(|r| r.content.clone()),
    );
    layout(page, heading, &body)
}

pub fn review_detail(page: &Page<'_>, review: &Review) -> String {
    let owner_controls = match page.viewer {
        Some(user) if user.id == review.user_id => format!(
            r#"<a href="/review/{id}/edit">Edit</a>
<form method="post" action="/review/{id}/delete"><button>Delete</button></form>"#,
            id = review.id
        ),
        _ => String::new(),
    };
    let body = format!(
        r#"<article>
<h1>{title}</h1>
<p><span class="genre">{genre}</span> · rated <span class="rating">{rating}</span> · by <a href="/user/{uid}">{author}</a> · <time>{at}</time></p>
<p class="content">{content}</p>
{owner_controls}
</article>"#,
        title = escape(&review.title),
        genre = escape(&review.genre),
        rating = review.rating,
        uid = review.user_id,
        author = escape(&review.author),
        at = review.created_at.format(DATE_FORMAT).unwrap_or_default(),
        content = escape(&review.content),
    );
    layout(page, &review.title, &body)
}

pub fn user_profile(page: &Page<'_>, user: &User, reviews: &[Review], review_count: i64) -> String {
    let body = format!(
        "<h1>{name}</h1><p>{review_count} review(s)</p>{list}",
        name = escape(&user.username),
        list = review_list(reviews),
    );
    layout(page, &user.username, &body)
}

pub fn users_list(page: &Page<'_>, users: &[UserSummary]) -> String {
    let rows: String = users
        .iter()
        .map(|u| {
            format!(
                r#"<tr><td><a href="/user/{}">{}</a></td><td>{}</td></tr>"#,
                u.id,
                escape(&u.username),
                u.review_count
            )
        })
        .collect();
    let body = format!("<h1>Users</h1><table><tr><th>User</th><th>Reviews</th></tr>{rows}</table>");
    layout(page, "Users", &body)
}

pub fn search_results(page: &Page<'_>, query: &str, reviews: &[Review]) -> String {
    let body = format!(
        "<h1>Results for &quot;{}&quot;</h1><p>{} match(es)</p>{}",
        escape(query),
        reviews.len(),
        review_list(reviews)
    );
    layout(page, "Search", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let page = Page {
        viewer: None,
        notice: None,
    };
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{} {}</h1><p>{}</p><p><a href="/">Back home</a></p>"#,
        status.as_u16(),
        escape(title),
        escape(message)
    );
    layout(&page, title, &body)
}
