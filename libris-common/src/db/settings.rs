//! Settings table access
//!
//! Runtime tunables live in the `settings` key-value table; defaults are
//! seeded at startup by `db::init`.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Generic setting getter
///
/// Returns None if key doesn't exist in database.
/// Parses value from string using FromStr trait.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::init::create_settings_table(&pool)
            .await
            .expect("Failed to create settings table");
        pool
    }

    #[tokio::test]
    async fn get_missing_setting_returns_none() {
        let db = setup_test_db().await;
        let value: Option<String> = get_setting(&db, "no_such_key").await.expect("query");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips_typed_values() {
        let db = setup_test_db().await;

        set_setting(&db, "cache_ttl_seconds", 300i64).await.expect("set");
        let ttl: Option<i64> = get_setting(&db, "cache_ttl_seconds").await.expect("get");
        assert_eq!(ttl, Some(300));

        set_setting(&db, "default_api_version", "2.0").await.expect("set");
        let version: Option<String> = get_setting(&db, "default_api_version").await.expect("get");
        assert_eq!(version.as_deref(), Some("2.0"));
    }

    #[tokio::test]
    async fn unparseable_value_is_a_config_error() {
        let db = setup_test_db().await;
        set_setting(&db, "cache_ttl_seconds", "not-a-number")
            .await
            .expect("set");

        let result: Result<Option<i64>> = get_setting(&db, "cache_ttl_seconds").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
