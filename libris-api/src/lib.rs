//! libris-api library - Book catalog REST service
//!
//! Serves authors and books over HTTP with bearer-token write protection,
//! Accept-header version negotiation, and a tagged response cache for the
//! list endpoints.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use libris_common::db::settings::get_setting;

pub mod api;
pub mod cache;
pub mod error;
pub mod pagination;
pub mod version;

pub use error::{ApiError, ApiResult};

use cache::ResponseCache;
use version::ApiVersion;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Tagged response cache for the list endpoints
    pub cache: ResponseCache,
    /// Absolute base URL for Location headers and hypermedia links
    pub base_url: String,
    /// API version applied when the client does not negotiate one
    pub default_version: ApiVersion,
}

impl AppState {
    /// Create application state from explicit values
    pub fn new(
        db: SqlitePool,
        cache: ResponseCache,
        base_url: String,
        default_version: ApiVersion,
    ) -> Self {
        Self {
            db,
            cache,
            base_url,
            default_version,
        }
    }

    /// Create application state, loading tunables from the settings table.
    ///
    /// `fallback_base_url` is used while the `public_base_url` setting is
    /// empty (the seeded default).
    pub async fn initialize(db: SqlitePool, fallback_base_url: String) -> ApiResult<Self> {
        let default_version = get_setting::<ApiVersion>(&db, "default_api_version")
            .await?
            .unwrap_or(ApiVersion::new(1, 0));

        let ttl_seconds = get_setting::<u64>(&db, "cache_ttl_seconds")
            .await?
            .unwrap_or(0);

        let configured_base = get_setting::<String>(&db, "public_base_url")
            .await?
            .unwrap_or_default();
        let base_url = if configured_base.trim().is_empty() {
            fallback_base_url
        } else {
            configured_base
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self::new(
            db,
            ResponseCache::new(ttl_seconds),
            base_url,
            default_version,
        ))
    }
}

/// Build application router
///
/// Writes that require the admin role sit behind the auth middleware; reads
/// and the book delete are public. Both routers are merged per path, so a
/// path can carry protected and public methods at once.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Admin-gated writes
    let protected = Router::new()
        .route("/api/authors", post(api::create_author))
        .route(
            "/api/authors/:id",
            put(api::update_author).delete(api::delete_author),
        )
        .route("/api/books", post(api::create_book))
        .route("/api/books/:id", put(api::update_book))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::admin_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/authors", get(api::list_authors))
        .route("/api/authors/:id", get(api::get_author))
        .route("/api/books", get(api::list_books))
        .route("/api/books/:id", get(api::get_book).delete(api::delete_book))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    // Combine routers; CORS stays outermost for preflight handling
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
