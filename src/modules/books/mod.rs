pub mod models;
pub mod routes;
pub mod schema;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module, TableSchema};
use bookshelf_schema::Validator;
use serde_json::{json, Value};

use schema::BOOK_SCHEMA;
use service::BookService;
use store::{BookStore, BOOKS_TABLE};

/// Books module: the catalog CRUD resource
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>, validator: Arc<dyn Validator>) -> Self {
        Self {
            service: BookService::new(store, validator),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    fn tables(&self) -> Vec<TableSchema> {
        vec![BOOKS_TABLE]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema_ref: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema_ref) }
            }
        }
    })
}

fn openapi_fragment() -> Value {
    let isbn_param = json!({
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });

    let book_body = |description: &str| {
        json!({
            "description": description,
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        })
    };

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "description": "Query parameters are applied as equality filters on book fields.",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("List of books", "BookList"),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body("Complete book record"),
                    "responses": {
                        "201": json_response("Created book", "BookEnvelope"),
                        "400": error_response("Validation error"),
                        "409": error_response("ISBN already exists")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book by ISBN",
                    "tags": ["Books"],
                    "parameters": [isbn_param.clone()],
                    "responses": {
                        "200": json_response("The book", "BookEnvelope"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "description": "All seven non-key fields are required; the ISBN comes from the path.",
                    "tags": ["Books"],
                    "parameters": [isbn_param.clone()],
                    "requestBody": book_body("Book fields without isbn"),
                    "responses": {
                        "200": json_response("Updated book", "BookEnvelope"),
                        "400": error_response("Validation error"),
                        "404": error_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [isbn_param],
                    "responses": {
                        "200": json_response("Confirmation message", "Message"),
                        "404": error_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": BOOK_SCHEMA.to_json_schema(),
                "BookEnvelope": {
                    "type": "object",
                    "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                    "required": ["book"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        }
                    },
                    "required": ["books"]
                },
                "Message": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                }
            }
        }
    })
}

/// Create the books module backed by `store`
pub fn create_module(store: Arc<dyn BookStore>, validator: Arc<dyn Validator>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, validator))
}
