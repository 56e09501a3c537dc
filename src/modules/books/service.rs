//! Book resource operations, independent of the HTTP layer.

use std::sync::Arc;

use bookshelf_schema::Validator;
use serde_json::Value;
use thiserror::Error;

use super::models::{Book, BookFilter};
use super::schema::{update_candidate, BOOK_SCHEMA};
use super::store::{BookStore, StoreError};

#[derive(Error, Debug)]
pub enum BookError {
    #[error("book failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("no book with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    Conflict(String),

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(isbn) => BookError::NotFound(isbn),
            StoreError::Duplicate(isbn) => BookError::Conflict(isbn),
            StoreError::Database(err) => {
                BookError::Unhandled(anyhow::Error::new(err).context("book store failure"))
            }
        }
    }
}

/// Validates payloads and delegates to the store. Holds no per-request state.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
    validator: Arc<dyn Validator>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, validator: Arc<dyn Validator>) -> Self {
        Self { store, validator }
    }

    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, BookError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn get(&self, isbn: &str) -> Result<Book, BookError> {
        Ok(self.store.get(isbn).await?)
    }

    pub async fn create(&self, payload: Value) -> Result<Book, BookError> {
        let candidate = self.check(payload)?;
        let book = self.store.insert(&candidate).await?;

        tracing::info!(isbn = %book.isbn, "book created");
        Ok(book)
    }

    /// Replace the mutable fields of `isbn`. The body must satisfy the full
    /// creation schema once paired with the path ISBN.
    pub async fn update(&self, isbn: &str, payload: Value) -> Result<Book, BookError> {
        let candidate = self.check(update_candidate(isbn, &payload))?;
        let book = self.store.update(isbn, &candidate).await?;

        tracing::info!(isbn = %book.isbn, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        self.store.remove(isbn).await?;

        tracing::info!(isbn = %isbn, "book deleted");
        Ok(())
    }

    fn check(&self, mut candidate: Value) -> Result<Book, BookError> {
        let report = self.validator.validate(&candidate, &BOOK_SCHEMA);
        if !report.valid {
            tracing::warn!(violations = ?report.violations, "book payload rejected");
            return Err(BookError::Validation(report.violations));
        }

        // `100.0` is a valid page count
        BOOK_SCHEMA.normalize_integers(&mut candidate);

        // A custom validator may be looser than the typed record
        serde_json::from_value(candidate)
            .map_err(|err| BookError::Validation(vec![format!("instance {}", err)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::store::tests::{book, store};
    use crate::modules::books::store::{SqliteBookStore, BOOKS_TABLE};
    use bookshelf_db::Database;
    use bookshelf_schema::{Schema, SchemaValidator, ValidationReport};
    use serde_json::json;

    async fn service() -> BookService {
        BookService::new(Arc::new(store().await), Arc::new(SchemaValidator))
    }

    fn payload(isbn: &str) -> Value {
        json!({
            "isbn": isbn,
            "amazon_url": "http://www.walmart.com",
            "author": "Test Author",
            "language": "French",
            "pages": 100,
            "publisher": "Test Pub",
            "title": "New Title",
            "year": 1990
        })
    }

    fn body_without(field: &str) -> Value {
        let mut body = payload("ignored");
        let fields = body.as_object_mut().unwrap();
        fields.remove("isbn");
        fields.remove(field);
        body
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let service = service().await;
        let created = service.create(payload("2082394283")).await.unwrap();

        assert_eq!(serde_json::to_value(&created).unwrap(), payload("2082394283"));
        assert_eq!(service.get("2082394283").await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_without_isbn_persists_nothing() {
        let service = service().await;
        let mut body = payload("x");
        body.as_object_mut().unwrap().remove("isbn");

        match service.create(body).await.unwrap_err() {
            BookError::Validation(violations) => {
                assert_eq!(violations, vec!["instance requires property \"isbn\""]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(service.list(&BookFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_bad_url_is_rejected() {
        let service = service().await;
        let mut body = payload("2082394283");
        body["amazon_url"] = json!("22");

        assert!(matches!(
            service.create(body).await.unwrap_err(),
            BookError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn duplicate_create_is_a_conflict() {
        let service = service().await;
        service.create(payload("1")).await.unwrap();

        assert!(matches!(
            service.create(payload("1")).await.unwrap_err(),
            BookError::Conflict(isbn) if isbn == "1"
        ));
    }

    #[tokio::test]
    async fn partial_update_is_rejected_and_record_unchanged() {
        let service = service().await;
        let original = service.create(payload("12345")).await.unwrap();

        let err = service
            .update("12345", body_without("title"))
            .await
            .unwrap_err();
        match err {
            BookError::Validation(violations) => {
                assert_eq!(violations, vec!["instance requires property \"title\""]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.get("12345").await.unwrap(), original);
    }

    #[tokio::test]
    async fn full_update_merges_path_isbn() {
        let service = service().await;
        service.store.insert(&book("12345", "Test Title", "English")).await.unwrap();

        let updated = service
            .update("12345", body_without("nothing"))
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&updated).unwrap(), payload("12345"));

        let listed = service.list(&BookFilter::new()).await.unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn missing_isbn_yields_not_found() {
        let service = service().await;

        assert!(matches!(
            service.get("sjflksd").await.unwrap_err(),
            BookError::NotFound(_)
        ));
        assert!(matches!(
            service.delete("skdfjsd").await.unwrap_err(),
            BookError::NotFound(_)
        ));
        assert!(matches!(
            service.update("fake", body_without("nothing")).await.unwrap_err(),
            BookError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = service().await;
        service.create(payload("12345")).await.unwrap();

        service.delete("12345").await.unwrap();
        assert!(matches!(
            service.get("12345").await.unwrap_err(),
            BookError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn whole_number_floats_are_stored_as_integers() {
        let service = service().await;
        let mut body = payload("2082394283");
        body["pages"] = json!(100.0);
        body["year"] = serde_json::from_str::<Value>("1.99e3").unwrap();

        let created = service.create(body).await.unwrap();
        assert_eq!(created.pages, 100);
        assert_eq!(created.year, 1990);
        assert_eq!(serde_json::to_value(&created).unwrap(), payload("2082394283"));

        let mut update = body_without("nothing");
        update["pages"] = json!(250.0);
        let updated = service.update("2082394283", update).await.unwrap();
        assert_eq!(updated.pages, 250);
    }

    #[tokio::test]
    async fn fractional_page_count_is_rejected() {
        let service = service().await;
        let mut body = payload("2082394283");
        body["pages"] = json!(100.5);

        match service.create(body).await.unwrap_err() {
            BookError::Validation(violations) => {
                assert_eq!(violations, vec!["instance.pages is not of a type(s) integer"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_failures_are_unhandled() {
        let db = Database::in_memory().await.unwrap();
        db.ensure_tables(&[("books".to_string(), BOOKS_TABLE)])
            .await
            .unwrap();
        let service = BookService::new(
            Arc::new(SqliteBookStore::new(db.clone())),
            Arc::new(SchemaValidator),
        );

        sqlx::raw_sql("DROP TABLE books")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            service.list(&BookFilter::new()).await.unwrap_err(),
            BookError::Unhandled(_)
        ));
        assert!(matches!(
            service.get("12345").await.unwrap_err(),
            BookError::Unhandled(_)
        ));
        assert!(matches!(
            service.create(payload("12345")).await.unwrap_err(),
            BookError::Unhandled(_)
        ));
    }

    struct AcceptAll;

    impl Validator for AcceptAll {
        fn validate(&self, _record: &Value, _schema: &Schema) -> ValidationReport {
            ValidationReport::from_violations(vec![])
        }
    }

    #[tokio::test]
    async fn typed_record_still_guards_a_permissive_validator() {
        let service = BookService::new(Arc::new(store().await), Arc::new(AcceptAll));

        let err = service.create(json!({"isbn": "1"})).await.unwrap_err();
        assert!(matches!(err, BookError::Validation(_)));
    }
}
