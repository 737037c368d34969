//! Bearer-token authentication and role gating
//!
//! Mutating catalog routes sit behind `admin_middleware`. Public routes
//! never reject, but may extract a `RequestIdentity` to adapt their output
//! (admin-only links) to the caller.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use libris_common::db::tokens::{lookup_token_role, ROLE_ADMIN};
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Resolve the role attached to the request's bearer token
///
/// None covers both a missing Authorization header and an unknown token.
pub async fn resolve_role(db: &SqlitePool, headers: &HeaderMap) -> ApiResult<Option<String>> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Ok(None),
    };

    Ok(lookup_token_role(db, token).await?)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Admin gate for the protected routes
///
/// 401 without a valid token; 403 with the catalog's French message for a
/// valid token lacking the admin role.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let role = resolve_role(&state.db, request.headers()).await?;

    match role.as_deref() {
        Some(ROLE_ADMIN) => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Forbidden(
            insufficient_rights_message(request.method(), request.uri().path()).to_string(),
        )),
        None => Err(ApiError::Unauthorized(
            "Missing or invalid bearer token".to_string(),
        )),
    }
}

/// Per-action insufficient-rights messages
fn insufficient_rights_message(method: &Method, path: &str) -> &'static str {
    let on_authors = path.starts_with("/api/authors");

    match (method.as_str(), on_authors) {
        ("POST", true) => "Vous n'avez pas les droits suffisants pour créer un auteur",
        ("PUT", true) => "Vous n'avez pas les droits suffisants pour éditer un auteur",
        ("DELETE", true) => "Vous n'avez pas les droits suffisants pour supprimer un auteur",
        ("POST", false) => "Vous n'avez pas les droits suffisants pour créer un livre",
        ("PUT", false) => "Vous n'avez pas les droits suffisants pour éditer un livre",
        _ => "Vous n'avez pas les droits suffisants pour accéder à cette ressource",
    }
}

/// Caller identity for handlers that adapt output to the caller's role
///
/// Extraction never rejects: a missing, malformed, or unknown token simply
/// yields a non-admin identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdentity {
    pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for RequestIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let is_admin = match resolve_role(&state.db, &parts.headers).await {
            Ok(role) => role.as_deref() == Some(ROLE_ADMIN),
            Err(err) => {
                warn!("Role lookup failed, treating request as anonymous: {}", err);
                false
            }
        };

        Ok(RequestIdentity { is_admin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn rejects_non_bearer_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn message_per_route_and_method() {
        assert_eq!(
            insufficient_rights_message(&Method::POST, "/api/authors"),
            "Vous n'avez pas les droits suffisants pour créer un auteur"
        );
        assert_eq!(
            insufficient_rights_message(&Method::DELETE, "/api/authors/some-id"),
            "Vous n'avez pas les droits suffisants pour supprimer un auteur"
        );
        assert_eq!(
            insufficient_rights_message(&Method::PUT, "/api/books/some-id"),
            "Vous n'avez pas les droits suffisants pour éditer un livre"
        );
    }
}
