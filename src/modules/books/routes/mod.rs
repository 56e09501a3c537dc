//! HTTP handlers for the books resource.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiJson, AppError};
use serde_json::{json, Value};

use super::models::{BookEnvelope, BookFilter, BookListEnvelope, MessageEnvelope};
use super::service::{BookError, BookService};

/// Routes relative to the module mount point.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(service)
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(violations) => AppError::validation(
                violations.into_iter().map(Value::String).collect(),
                "request body failed validation",
            ),
            BookError::NotFound(_) => AppError::not_found("book not found"),
            BookError::Conflict(isbn) => AppError::conflict(
                vec![json!({ "field": "isbn", "value": isbn })],
                "a book with this isbn already exists",
            ),
            BookError::Unhandled(err) => AppError::Internal(err),
        }
    }
}

/// GET / => {books: [book, ...]}
async fn list_books(
    State(service): State<BookService>,
    Query(filter): Query<BookFilter>,
) -> Result<Json<BookListEnvelope>, AppError> {
    let books = service.list(&filter).await?;
    Ok(Json(BookListEnvelope { books }))
}

/// GET /{isbn} => {book: book}
async fn get_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = service.get(&isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

/// POST / bookData => 201 {book: newBook}
async fn create_book(
    State(service): State<BookService>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let book = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

/// PUT /{isbn} bookData => {book: updatedBook}
async fn update_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = service.update(&isbn, payload).await?;
    Ok(Json(BookEnvelope { book }))
}

/// DELETE /{isbn} => {message: "Book deleted"}
async fn delete_book(
    State(service): State<BookService>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageEnvelope>, AppError> {
    service.delete(&isbn).await?;
    Ok(Json(MessageEnvelope {
        message: "Book deleted".to_string(),
    }))
}
