//! Author endpoints
//!
//! List and detail reads are public; create, update, and delete require the
//! admin role (enforced by the router's middleware). The list endpoint is
//! served through the tagged response cache.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use garde::Validate;
use libris_common::db::{authors, books};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::auth::RequestIdentity;
use crate::api::links::Links;
use crate::cache::BOOKS_CACHE_TAG;
use crate::error::{violations_from_report, ApiError, ApiResult};
use crate::pagination::ListParams;
use crate::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Create/update payload for an author
///
/// Missing `lastname` deserializes to an empty string and is reported as a
/// validation violation rather than a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthorUpsert {
    #[serde(default)]
    #[garde(length(min = 1, max = 255))]
    pub lastname: String,

    #[serde(default, rename = "firstName")]
    #[garde(length(max = 255))]
    pub first_name: Option<String>,
}

/// Book as embedded in an author (no author back-reference)
#[derive(Debug, Serialize)]
pub struct AuthorBookView {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "coverText")]
    pub cover_text: Option<String>,
}

/// Author response shape
#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub lastname: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    pub books: Vec<AuthorBookView>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl AuthorView {
    fn build(
        author: authors::Author,
        owned_books: Vec<books::Book>,
        is_admin: bool,
        base_url: &str,
    ) -> Self {
        let books = owned_books
            .into_iter()
            .map(|book| AuthorBookView {
                id: book.guid,
                title: book.title,
                cover_text: book.cover_text,
            })
            .collect();

        let links = Links::with_admin_actions(author_href(base_url, author.guid), is_admin);

        Self {
            id: author.guid,
            lastname: author.lastname,
            first_name: author.first_name,
            books,
            links,
        }
    }
}

fn author_href(base_url: &str, id: Uuid) -> String {
    format!("{}/api/authors/{}", base_url, id)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/authors
///
/// Paginated author list. Cached under the `booksCache` tag; bodies contain
/// role-dependent links, so the key carries the caller's visibility class
/// alongside the pagination parameters.
pub async fn list_authors(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    identity: RequestIdentity,
) -> ApiResult<Json<Value>> {
    let visibility = if identity.is_admin { "admin" } else { "anon" };
    let cache_key = format!("getAllAuthors-{}-{}", params.cache_suffix(), visibility);

    if let Some(body) = state.cache.get(&cache_key).await {
        return Ok(Json(body));
    }

    let rows = authors::list_authors(&state.db, params.limit(), params.offset()).await?;

    let mut views = Vec::with_capacity(rows.len());
    for author in rows {
        let owned = books::list_books_by_author(&state.db, author.guid).await?;
        views.push(AuthorView::build(
            author,
            owned,
            identity.is_admin,
            &state.base_url,
        ));
    }

    let body = serde_json::to_value(&views).map_err(|e| ApiError::Internal(e.to_string()))?;
    state
        .cache
        .put(cache_key, &[BOOKS_CACHE_TAG], body.clone())
        .await;

    Ok(Json(body))
}

/// GET /api/authors/:id
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    identity: RequestIdentity,
) -> ApiResult<Json<AuthorView>> {
    let author = authors::load_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Author {} not found", id)))?;

    let owned = books::list_books_by_author(&state.db, id).await?;

    Ok(Json(AuthorView::build(
        author,
        owned,
        identity.is_admin,
        &state.base_url,
    )))
}

/// POST /api/authors
///
/// 201 with the created author and an absolute Location header.
pub async fn create_author(
    State(state): State<AppState>,
    identity: RequestIdentity,
    Json(payload): Json<AuthorUpsert>,
) -> ApiResult<impl IntoResponse> {
    if let Err(report) = payload.validate() {
        return Err(ApiError::Validation(violations_from_report(&report)));
    }

    let author = authors::Author::new(payload.lastname, payload.first_name);
    authors::save_author(&state.db, &author).await?;

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    let href = author_href(&state.base_url, author.guid);
    let view = AuthorView::build(author, Vec::new(), identity.is_admin, &state.base_url);

    Ok((StatusCode::CREATED, [(header::LOCATION, href)], Json(view)))
}

/// PUT /api/authors/:id
///
/// Full replace of the scalar fields. Validation runs before any write, so
/// a rejected payload leaves the stored author unchanged.
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AuthorUpsert>,
) -> ApiResult<StatusCode> {
    if let Err(report) = payload.validate() {
        return Err(ApiError::Validation(violations_from_report(&report)));
    }

    let author = authors::Author {
        guid: id,
        lastname: payload.lastname,
        first_name: payload.first_name,
    };

    let updated = authors::update_author(&state.db, &author).await?;
    if !updated {
        return Err(ApiError::NotFound(format!("Author {} not found", id)));
    }

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/authors/:id
///
/// The FK cascade removes the author's books along with the author.
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = authors::delete_author(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Author {} not found", id)));
    }

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    Ok(StatusCode::NO_CONTENT)
}
