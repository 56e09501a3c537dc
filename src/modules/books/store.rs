//! Persistence for books.

use async_trait::async_trait;
use bookshelf_db::Database;
use bookshelf_kernel::TableSchema;
use once_cell::sync::Lazy;
use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;

use super::models::{Book, BookFilter};

pub const BOOKS_TABLE: TableSchema = TableSchema {
    table: "books",
    ddl: r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn       TEXT PRIMARY KEY,
            amazon_url TEXT NOT NULL,
            author     TEXT NOT NULL,
            language   TEXT NOT NULL,
            pages      INTEGER NOT NULL,
            publisher  TEXT NOT NULL,
            title      TEXT NOT NULL,
            year       INTEGER NOT NULL
        );
    "#,
};

/// Columns clients may filter on. Also the select list, in order.
const COLUMNS: [&str; 8] = [
    "isbn",
    "amazon_url",
    "author",
    "language",
    "pages",
    "publisher",
    "title",
    "year",
];

static SELECT_BOOKS: Lazy<String> =
    Lazy::new(|| format!("SELECT {} FROM books", COLUMNS.join(", ")));

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no book with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    Duplicate(String),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// Key-based access to the books table.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Books matching every filter pair, most recently inserted first.
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, isbn: &str) -> Result<Book, StoreError>;

    async fn insert(&self, book: &Book) -> Result<Book, StoreError>;

    /// Overwrite every non-key field of the row keyed by `isbn`.
    async fn update(&self, isbn: &str, book: &Book) -> Result<Book, StoreError>;

    async fn remove(&self, isbn: &str) -> Result<(), StoreError>;
}

/// [`BookStore`] over the SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteBookStore {
    db: Database,
}

impl SqliteBookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_BOOKS.as_str());
        let mut first = true;

        for (key, value) in filter {
            let Some(column) = COLUMNS.iter().find(|column| **column == key.as_str()) else {
                tracing::debug!(filter = %key, "ignoring unknown book filter");
                continue;
            };

            query.push(if first { " WHERE " } else { " AND " });
            query.push(*column).push(" = ").push_bind(value.clone());
            first = false;
        }

        query.push(" ORDER BY rowid DESC");

        let books = query
            .build_query_as::<Book>()
            .fetch_all(self.db.pool())
            .await?;
        Ok(books)
    }

    async fn get(&self, isbn: &str) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE isbn = ?", *SELECT_BOOKS))
            .bind(isbn)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    async fn insert(&self, book: &Book) -> Result<Book, StoreError> {
        let inserted = sqlx::query_as::<_, Book>(
            "INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(self.db.pool())
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(book.isbn.clone())
            }
            other => StoreError::Database(other),
        })?;

        Ok(inserted)
    }

    async fn update(&self, isbn: &str, book: &Book) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            "UPDATE books
             SET amazon_url = ?, author = ?, language = ?, pages = ?,
                 publisher = ?, title = ?, year = ?
             WHERE isbn = ?
             RETURNING isbn, amazon_url, author, language, pages, publisher, title, year",
        )
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| StoreError::NotFound(isbn.to_string()))
    }

    async fn remove(&self, isbn: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(isbn.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn book(isbn: &str, title: &str, language: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            amazon_url: "http://www.amazon.com".to_string(),
            author: "Nick Winters".to_string(),
            language: language.to_string(),
            pages: 240,
            publisher: "Publishers Clearing House".to_string(),
            title: title.to_string(),
            year: 2020,
        }
    }

    pub(crate) async fn store() -> SqliteBookStore {
        let db = Database::in_memory().await.unwrap();
        db.ensure_tables(&[("books".to_string(), BOOKS_TABLE)])
            .await
            .unwrap();
        SqliteBookStore::new(db)
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = store().await;
        let created = store.insert(&book("12345", "Test Title", "English")).await.unwrap();

        assert_eq!(created, book("12345", "Test Title", "English"));
        assert_eq!(store.get("12345").await.unwrap(), created);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_rejected() {
        let store = store().await;
        store.insert(&book("12345", "Test Title", "English")).await.unwrap();

        let err = store
            .insert(&book("12345", "Other", "French"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(isbn) if isbn == "12345"));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_by_column() {
        let store = store().await;
        store.insert(&book("12345", "Test Title", "English")).await.unwrap();
        store.insert(&book("678910", "Johns Epic Book", "Spanish")).await.unwrap();

        let all = store.list(&BookFilter::new()).await.unwrap();
        let isbns: Vec<&str> = all.iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(isbns, vec!["678910", "12345"]);

        let mut filter = BookFilter::new();
        filter.insert("language".to_string(), "English".to_string());
        filter.insert("pages".to_string(), "240".to_string());
        filter.insert("shelf".to_string(), "ignored".to_string());
        let english = store.list(&filter).await.unwrap();
        assert_eq!(english.len(), 1);
        assert_eq!(english[0].isbn, "12345");
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_rows() {
        let store = store().await;

        let err = store
            .update("fake", &book("fake", "x", "English"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.remove("fake").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_keeps_the_key() {
        let store = store().await;
        store.insert(&book("12345", "Test Title", "English")).await.unwrap();

        let updated = store
            .update("12345", &book("ignored", "New Title", "French"))
            .await
            .unwrap();
        assert_eq!(updated.isbn, "12345");
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.language, "French");

        store.remove("12345").await.unwrap();
        assert!(matches!(
            store.get("12345").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }
}
