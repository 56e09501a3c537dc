//! Book record schema and update-candidate reconstruction.

use bookshelf_schema::{FieldDef, Format, Schema};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Fields a client may change; everything except `isbn`.
pub const MUTABLE_FIELDS: [&str; 7] = [
    "amazon_url",
    "author",
    "language",
    "pages",
    "publisher",
    "title",
    "year",
];

/// Schema applied to both create and update payloads.
pub static BOOK_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .field(
            "isbn",
            FieldDef::string()
                .required()
                .min_length(1)
                .describe("Unique identifier for the book"),
        )
        .field(
            "amazon_url",
            FieldDef::string()
                .required()
                .format(Format::Uri)
                .describe("Store page for the book"),
        )
        .field("author", FieldDef::string().required())
        .field("language", FieldDef::string().required())
        .field(
            "pages",
            FieldDef::integer()
                .required()
                .minimum(1)
                .describe("Page count"),
        )
        .field("publisher", FieldDef::string().required())
        .field("title", FieldDef::string().required())
        .field("year", FieldDef::integer().required())
});

/// Pair the path ISBN with the mutable fields present in `body`.
///
/// Absent fields stay absent so the schema reports them; anything else in
/// the body, including an `isbn`, is dropped.
pub fn update_candidate(isbn: &str, body: &Value) -> Value {
    let mut candidate = Map::new();
    candidate.insert("isbn".to_string(), Value::String(isbn.to_string()));

    if let Some(fields) = body.as_object() {
        for name in MUTABLE_FIELDS {
            if let Some(value) = fields.get(name) {
                candidate.insert(name.to_string(), value.clone());
            }
        }
    }

    Value::Object(candidate)
}
