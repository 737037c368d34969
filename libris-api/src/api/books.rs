//! Book endpoints
//!
//! Reads and delete are public; create and update require the admin role
//! (enforced by the router's middleware). The `comment` field is only
//! serialized for clients negotiating API version 2.0 or later, so the
//! list cache key carries the resolved version.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use garde::Validate;
use libris_common::db::{authors, books};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::links::Links;
use crate::cache::BOOKS_CACHE_TAG;
use crate::error::{violations_from_report, ApiError, ApiResult};
use crate::pagination::ListParams;
use crate::version::{resolve_version, ApiVersion};
use crate::AppState;

/// First API version that exposes the `comment` field on books
pub const COMMENT_MIN_VERSION: ApiVersion = ApiVersion::new(2, 0);

// ============================================================================
// Request / Response Types
// ============================================================================

/// Create/update payload for a book
///
/// `idAuthor` is resolved leniently: a missing field, a non-string value, a
/// malformed UUID, or an unknown author all store the book without an author.
#[derive(Debug, Deserialize, Validate)]
pub struct BookUpsert {
    #[serde(default)]
    #[garde(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default, rename = "coverText")]
    #[garde(skip)]
    pub cover_text: Option<String>,

    #[serde(default)]
    #[garde(skip)]
    pub comment: Option<String>,

    #[serde(default, rename = "idAuthor")]
    #[garde(skip)]
    pub id_author: Option<Value>,
}

/// Author as embedded in a book (no books back-reference)
#[derive(Debug, Serialize)]
pub struct BookAuthorView {
    pub id: Uuid,
    pub lastname: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
}

/// Book response shape
#[derive(Debug, Serialize)]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "coverText")]
    pub cover_text: Option<String>,
    /// Outer `None` drops the field entirely for pre-2.0 clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Option<String>>,
    pub author: Option<BookAuthorView>,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl BookView {
    fn build(
        book: books::Book,
        author: Option<authors::Author>,
        version: ApiVersion,
        base_url: &str,
    ) -> Self {
        let comment = if version >= COMMENT_MIN_VERSION {
            Some(book.comment)
        } else {
            None
        };

        let author = author.map(|a| BookAuthorView {
            id: a.guid,
            lastname: a.lastname,
            first_name: a.first_name,
        });

        Self {
            id: book.guid,
            title: book.title,
            cover_text: book.cover_text,
            comment,
            author,
            links: Links::read_only(book_href(base_url, book.guid)),
        }
    }
}

fn book_href(base_url: &str, id: Uuid) -> String {
    format!("{}/api/books/{}", base_url, id)
}

/// Resolve an `idAuthor` payload value to a stored author.
///
/// Anything that does not name an existing author yields `None` rather than
/// an error; the book is then stored without an author.
async fn resolve_author_reference(
    db: &SqlitePool,
    id_author: Option<&Value>,
) -> ApiResult<Option<authors::Author>> {
    let Some(Value::String(raw)) = id_author else {
        return Ok(None);
    };

    let Ok(id) = Uuid::parse_str(raw) else {
        return Ok(None);
    };

    Ok(authors::load_author(db, id).await?)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/books
///
/// Paginated book list. Cached under the `booksCache` tag; the key carries
/// the negotiated API version since it changes the serialized shape.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let version = resolve_version(&headers, state.default_version);
    let cache_key = format!("getAllBooks-{}-v{}", params.cache_suffix(), version);

    if let Some(body) = state.cache.get(&cache_key).await {
        return Ok(Json(body));
    }

    let rows = books::list_books_with_authors(&state.db, params.limit(), params.offset()).await?;

    let views: Vec<BookView> = rows
        .into_iter()
        .map(|(book, author)| BookView::build(book, author, version, &state.base_url))
        .collect();

    let body = serde_json::to_value(&views).map_err(|e| ApiError::Internal(e.to_string()))?;
    state
        .cache
        .put(cache_key, &[BOOKS_CACHE_TAG], body.clone())
        .await;

    Ok(Json(body))
}

/// GET /api/books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<BookView>> {
    let version = resolve_version(&headers, state.default_version);

    let (book, author) = books::load_book_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", id)))?;

    Ok(Json(BookView::build(book, author, version, &state.base_url)))
}

/// POST /api/books
///
/// 201 with the created book and an absolute Location header.
pub async fn create_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BookUpsert>,
) -> ApiResult<impl IntoResponse> {
    if let Err(report) = payload.validate() {
        return Err(ApiError::Validation(violations_from_report(&report)));
    }

    let version = resolve_version(&headers, state.default_version);
    let author = resolve_author_reference(&state.db, payload.id_author.as_ref()).await?;

    let book = books::Book::new(
        payload.title,
        payload.cover_text,
        payload.comment,
        author.as_ref().map(|a| a.guid),
    );
    books::save_book(&state.db, &book).await?;

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    let href = book_href(&state.base_url, book.guid);
    let view = BookView::build(book, author, version, &state.base_url);

    Ok((StatusCode::CREATED, [(header::LOCATION, href)], Json(view)))
}

/// PUT /api/books/:id
///
/// Replaces title, cover text, and the author reference. The comment is
/// carried over from the stored book when the payload omits it.
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookUpsert>,
) -> ApiResult<StatusCode> {
    if let Err(report) = payload.validate() {
        return Err(ApiError::Validation(violations_from_report(&report)));
    }

    let existing = books::load_book(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", id)))?;

    let author = resolve_author_reference(&state.db, payload.id_author.as_ref()).await?;

    let book = books::Book {
        guid: id,
        title: payload.title,
        cover_text: payload.cover_text,
        comment: payload.comment.or(existing.comment),
        author_id: author.map(|a| a.guid),
    };

    let updated = books::update_book(&state.db, &book).await?;
    if !updated {
        return Err(ApiError::NotFound(format!("Book {} not found", id)));
    }

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = books::delete_book(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Book {} not found", id)));
    }

    state.cache.invalidate_tag(BOOKS_CACHE_TAG).await;

    Ok(StatusCode::NO_CONTENT)
}
