//! Book database operations

use crate::db::authors::Author;
use crate::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Book record
#[derive(Debug, Clone)]
pub struct Book {
    pub guid: Uuid,
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<Uuid>,
}

impl Book {
    /// Create new book with a generated identity
    pub fn new(
        title: String,
        cover_text: Option<String>,
        comment: Option<String>,
        author_id: Option<Uuid>,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            title,
            cover_text,
            comment,
            author_id,
        }
    }
}

/// Save a new book to database
pub async fn save_book(pool: &SqlitePool, book: &Book) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO books (guid, title, cover_text, comment, author_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(book.guid.to_string())
    .bind(&book.title)
    .bind(&book.cover_text)
    .bind(&book.comment)
    .bind(book.author_id.map(|id| id.to_string()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace the mutable fields of an existing book
///
/// Returns false if no book with that id exists.
pub async fn update_book(pool: &SqlitePool, book: &Book) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE books
        SET title = ?, cover_text = ?, comment = ?, author_id = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.cover_text)
    .bind(&book.comment)
    .bind(book.author_id.map(|id| id.to_string()))
    .bind(book.guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load book by id
pub async fn load_book(pool: &SqlitePool, id: Uuid) -> Result<Option<Book>> {
    let row = sqlx::query(
        r#"
        SELECT guid, title, cover_text, comment, author_id
        FROM books
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(book_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Load book by id together with its author, if any
pub async fn load_book_with_author(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<(Book, Option<Author>)>> {
    let row = sqlx::query(
        r#"
        SELECT b.guid, b.title, b.cover_text, b.comment, b.author_id,
               a.guid AS a_guid, a.lastname AS a_lastname, a.first_name AS a_first_name
        FROM books b
        LEFT JOIN authors a ON a.guid = b.author_id
        WHERE b.guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let book = book_from_row(&row)?;
            let author = joined_author_from_row(&row)?;
            Ok(Some((book, author)))
        }
        None => Ok(None),
    }
}

/// List books in insertion order, each with its author, if any
///
/// Plain LIMIT/OFFSET: a page past the end yields an empty list.
pub async fn list_books_with_authors(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<Vec<(Book, Option<Author>)>> {
    let rows = sqlx::query(
        r#"
        SELECT b.guid, b.title, b.cover_text, b.comment, b.author_id,
               a.guid AS a_guid, a.lastname AS a_lastname, a.first_name AS a_first_name
        FROM books b
        LEFT JOIN authors a ON a.guid = b.author_id
        ORDER BY b.rowid
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let book = book_from_row(row)?;
            let author = joined_author_from_row(row)?;
            Ok((book, author))
        })
        .collect()
}

/// List all books belonging to an author, in insertion order
pub async fn list_books_by_author(pool: &SqlitePool, author_id: Uuid) -> Result<Vec<Book>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, title, cover_text, comment, author_id
        FROM books
        WHERE author_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(author_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(book_from_row).collect()
}

/// Delete book by id
///
/// Returns false if no book with that id exists.
pub async fn delete_book(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM books WHERE guid = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn book_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Book> {
    let guid_str: String = row.get("guid");
    let author_id_str: Option<String> = row.get("author_id");

    Ok(Book {
        guid: Uuid::parse_str(&guid_str)?,
        title: row.get("title"),
        cover_text: row.get("cover_text"),
        comment: row.get("comment"),
        author_id: author_id_str.as_deref().map(Uuid::parse_str).transpose()?,
    })
}

/// Author columns from a LEFT JOIN, all NULL when the book has no author
fn joined_author_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Option<Author>> {
    let guid_str: Option<String> = row.get("a_guid");

    match guid_str {
        Some(guid_str) => Ok(Some(Author {
            guid: Uuid::parse_str(&guid_str)?,
            lastname: row.get("a_lastname"),
            first_name: row.get("a_first_name"),
        })),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::authors::{save_author, Author};

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .expect("Failed to enable foreign keys");
        crate::db::init::initialize_schema(&pool)
            .await
            .expect("Schema initialization failed");
        pool
    }

    #[tokio::test]
    async fn test_save_and_load_book_with_author() {
        let pool = setup_test_db().await;

        let author = Author::new("Herbert".to_string(), Some("Frank".to_string()));
        save_author(&pool, &author).await.expect("save author");

        let book = Book::new(
            "Dune".to_string(),
            Some("A desert planet".to_string()),
            None,
            Some(author.guid),
        );
        save_book(&pool, &book).await.expect("save book");

        let (loaded, loaded_author) = load_book_with_author(&pool, book.guid)
            .await
            .expect("load")
            .expect("book exists");

        assert_eq!(loaded.title, "Dune");
        assert_eq!(loaded.cover_text.as_deref(), Some("A desert planet"));
        let loaded_author = loaded_author.expect("author joined");
        assert_eq!(loaded_author.lastname, "Herbert");
    }

    #[tokio::test]
    async fn test_book_without_author() {
        let pool = setup_test_db().await;

        let book = Book::new("Anonymous Work".to_string(), None, None, None);
        save_book(&pool, &book).await.expect("save book");

        let (loaded, author) = load_book_with_author(&pool, book.guid)
            .await
            .expect("load")
            .expect("book exists");
        assert_eq!(loaded.title, "Anonymous Work");
        assert!(author.is_none());
    }

    #[tokio::test]
    async fn test_update_book_reassigns_author() {
        let pool = setup_test_db().await;

        let first = Author::new("First".to_string(), None);
        let second = Author::new("Second".to_string(), None);
        save_author(&pool, &first).await.expect("save author");
        save_author(&pool, &second).await.expect("save author");

        let mut book = Book::new("Moving Book".to_string(), None, None, Some(first.guid));
        save_book(&pool, &book).await.expect("save book");

        book.author_id = Some(second.guid);
        book.title = "Moved Book".to_string();
        assert!(update_book(&pool, &book).await.expect("update"));

        let (loaded, author) = load_book_with_author(&pool, book.guid)
            .await
            .expect("load")
            .expect("book exists");
        assert_eq!(loaded.title, "Moved Book");
        assert_eq!(author.expect("author").lastname, "Second");
    }

    #[tokio::test]
    async fn test_list_books_with_authors_pages() {
        let pool = setup_test_db().await;

        let author = Author::new("Prolific".to_string(), None);
        save_author(&pool, &author).await.expect("save author");

        for i in 0..4 {
            let book = Book::new(format!("Book{}", i), None, None, Some(author.guid));
            save_book(&pool, &book).await.expect("save book");
        }

        let page = list_books_with_authors(&pool, 3, 0).await.expect("list");
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].0.title, "Book0");
        assert_eq!(page[0].1.as_ref().expect("author").lastname, "Prolific");

        let rest = list_books_with_authors(&pool, 3, 3).await.expect("list");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].0.title, "Book3");
    }

    #[tokio::test]
    async fn test_list_books_by_author() {
        let pool = setup_test_db().await;

        let ours = Author::new("Ours".to_string(), None);
        let theirs = Author::new("Theirs".to_string(), None);
        save_author(&pool, &ours).await.expect("save author");
        save_author(&pool, &theirs).await.expect("save author");

        save_book(&pool, &Book::new("Mine".to_string(), None, None, Some(ours.guid)))
            .await
            .expect("save book");
        save_book(&pool, &Book::new("Not mine".to_string(), None, None, Some(theirs.guid)))
            .await
            .expect("save book");

        let books = list_books_by_author(&pool, ours.guid).await.expect("list");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Mine");
    }

    #[tokio::test]
    async fn test_delete_book() {
        let pool = setup_test_db().await;

        let book = Book::new("Ephemeral".to_string(), None, None, None);
        save_book(&pool, &book).await.expect("save book");

        assert!(delete_book(&pool, book.guid).await.expect("delete"));
        assert!(load_book(&pool, book.guid).await.expect("load").is_none());
        assert!(!delete_book(&pool, book.guid).await.expect("delete"));
    }
}
