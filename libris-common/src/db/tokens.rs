//! API token storage
//!
//! Bearer tokens with an attached role gate the mutating endpoints. The
//! admin token is generated and stored on first run; operators add further
//! tokens directly in the database.

use crate::Result;
use sqlx::SqlitePool;

/// Role granted full mutation rights
pub const ROLE_ADMIN: &str = "admin";

/// Role for read-oriented clients
pub const ROLE_USER: &str = "user";

/// Look up the role attached to a bearer token
///
/// Returns None for an unknown token.
pub async fn lookup_token_role(pool: &SqlitePool, token: &str) -> Result<Option<String>> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM api_tokens WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    Ok(role)
}

/// Store a token with the given role
pub async fn insert_token(pool: &SqlitePool, token: &str, role: &str, label: Option<&str>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO api_tokens (token, role, label, created_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(token) DO UPDATE SET role = excluded.role, label = excluded.label
        "#,
    )
    .bind(token)
    .bind(role)
    .bind(label)
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize the admin token if not present
///
/// Generates a random token on first run and returns it so the caller can
/// log it once. Returns None when an admin token already exists.
pub async fn initialize_admin_token(pool: &SqlitePool) -> Result<Option<String>> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE role = 'admin'")
            .fetch_one(pool)
            .await?;

    if existing > 0 {
        return Ok(None);
    }

    let token = generate_token();
    insert_token(pool, &token, ROLE_ADMIN, Some("generated at first run")).await?;

    Ok(Some(token))
}

/// Generate a random 32-hex-character token
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init::create_api_tokens_table(&pool)
            .await
            .expect("Failed to create api_tokens table");
        pool
    }

    #[tokio::test]
    async fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_initialize_admin_token_once() {
        let pool = setup_test_db().await;

        let first = initialize_admin_token(&pool).await.expect("initialize");
        let token = first.expect("token generated on first run");

        let role = lookup_token_role(&pool, &token)
            .await
            .expect("lookup")
            .expect("token known");
        assert_eq!(role, ROLE_ADMIN);

        // Second run finds the existing admin token and generates nothing
        let second = initialize_admin_token(&pool).await.expect("initialize");
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_lookup_unknown_token() {
        let pool = setup_test_db().await;

        let role = lookup_token_role(&pool, "deadbeef").await.expect("lookup");
        assert!(role.is_none());
    }

    #[tokio::test]
    async fn test_insert_user_token() {
        let pool = setup_test_db().await;

        insert_token(&pool, "reader-token", ROLE_USER, Some("test reader"))
            .await
            .expect("insert");

        let role = lookup_token_role(&pool, "reader-token")
            .await
            .expect("lookup")
            .expect("token known");
        assert_eq!(role, ROLE_USER);
    }
}
