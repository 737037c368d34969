//! Author database operations

use crate::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Author record
#[derive(Debug, Clone)]
pub struct Author {
    pub guid: Uuid,
    pub lastname: String,
    pub first_name: Option<String>,
}

impl Author {
    /// Create new author with a generated identity
    pub fn new(lastname: String, first_name: Option<String>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            lastname,
            first_name,
        }
    }
}

/// Save a new author to database
pub async fn save_author(pool: &SqlitePool, author: &Author) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO authors (guid, lastname, first_name, created_at, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(author.guid.to_string())
    .bind(&author.lastname)
    .bind(&author.first_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace the scalar fields of an existing author
///
/// Returns false if no author with that id exists.
pub async fn update_author(pool: &SqlitePool, author: &Author) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE authors
        SET lastname = ?, first_name = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&author.lastname)
    .bind(&author.first_name)
    .bind(author.guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load author by id
pub async fn load_author(pool: &SqlitePool, id: Uuid) -> Result<Option<Author>> {
    let row = sqlx::query(
        r#"
        SELECT guid, lastname, first_name
        FROM authors
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(author_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List authors in insertion order
///
/// Plain LIMIT/OFFSET: a page past the end yields an empty list.
pub async fn list_authors(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Author>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, lastname, first_name
        FROM authors
        ORDER BY rowid
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(author_from_row).collect()
}

/// Delete author by id
///
/// The FK cascade removes the author's books. Returns false if no author
/// with that id exists.
pub async fn delete_author(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM authors WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn author_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Author> {
    let guid_str: String = row.get("guid");

    Ok(Author {
        guid: Uuid::parse_str(&guid_str)?,
        lastname: row.get("lastname"),
        first_name: row.get("first_name"),
    })
}
