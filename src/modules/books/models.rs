use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A catalog entry, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier; immutable once created
    pub isbn: String,
    /// Store page for the book
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Equality filters taken verbatim from the query string.
pub type BookFilter = BTreeMap<String, String>;

/// `{ "book": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// `{ "books": [...] }`
#[derive(Debug, Serialize, Deserialize)]
pub struct BookListEnvelope {
    pub books: Vec<Book>,
}

/// `{ "message": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
}
