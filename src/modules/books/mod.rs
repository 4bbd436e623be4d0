pub mod filters;
pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_db::Database;
use shelf_kernel::{InitCtx, Migration, Module};

use repository::{CatalogRepository, CatalogStore};

pub const MODULE_NAME: &str = "books";

/// Catalog schema. `IF NOT EXISTS` throughout so an externally managed
/// database with the same tables is left alone.
pub const CATALOG_MIGRATION: Migration = Migration {
    id: "001_catalog",
    up: r#"
        CREATE TABLE IF NOT EXISTS authors (
            id   INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id               INTEGER PRIMARY KEY,
            title            TEXT NOT NULL,
            year             INTEGER,
            slug             TEXT NOT NULL UNIQUE,
            cover_url        TEXT,
            is_public_domain INTEGER NOT NULL DEFAULT 0 CHECK (is_public_domain IN (0, 1)),
            author_id        INTEGER NOT NULL REFERENCES authors(id)
        );
        CREATE INDEX IF NOT EXISTS idx_books_year_id ON books (year, id);
        CREATE INDEX IF NOT EXISTS idx_books_author_id ON books (author_id);

        CREATE TABLE IF NOT EXISTS tags (
            id   INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS books_tags (
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            tag_id  INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (book_id, tag_id)
        );
        CREATE INDEX IF NOT EXISTS idx_books_tags_tag_id ON books_tags (tag_id);

        CREATE TABLE IF NOT EXISTS links (
            id      INTEGER PRIMARY KEY,
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            kind    TEXT NOT NULL CHECK (kind IN ('source', 'read_online', 'library', 'buy', 'other')),
            label   TEXT NOT NULL,
            url     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_links_book_id ON links (book_id);
    "#,
};

/// Book listing, detail and links endpoints
pub struct BooksModule {
    store: Arc<dyn CatalogStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
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
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![CATALOG_MIGRATION]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn query_param(name: &str, description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": schema
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer" }
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "Search books",
                    "tags": ["Books"],
                    "parameters": [
                        query_param("q", "Case- and accent-insensitive text matched against title and author", json!({ "type": "string" })),
                        query_param("domain", "`public` or `non-public`; other values are ignored", json!({ "type": "string" })),
                        query_param("tags", "Comma-separated tag slugs; books must carry all of them", json!({ "type": "string" })),
                        query_param("yearFrom", "Inclusive lower bound on publication year", json!({ "type": "integer" })),
                        query_param("yearTo", "Inclusive upper bound on publication year", json!({ "type": "integer" })),
                        query_param("page", "1-based page number (default 1)", json!({ "type": "integer", "minimum": 1 })),
                        query_param("pageSize", "Page size (default 24, max 100)", json!({ "type": "integer", "minimum": 1, "maximum": 100 }))
                    ],
                    "responses": {
                        "200": {
                            "description": "One page of matching books",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookList" }
                                }
                            }
                        },
                        "500": error_response("Listing failed")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": {
                            "description": "Book with author name",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDetail" }
                                }
                            }
                        },
                        "404": error_response("Book not found"),
                        "500": error_response("Lookup failed")
                    }
                }
            },
            "/{id}/links": {
                "get": {
                    "summary": "List a book's links",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": {
                            "description": "Links ordered by kind priority, then label",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Link" }
                                    }
                                }
                            }
                        },
                        "500": error_response("Lookup failed")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "title": { "type": "string" },
                        "year": { "type": ["integer", "null"] },
                        "slug": { "type": "string" },
                        "cover_url": { "type": ["string", "null"] },
                        "is_public_domain": { "type": "boolean" },
                        "author": { "type": "string" }
                    },
                    "required": ["id", "title", "year", "slug", "cover_url", "is_public_domain", "author"]
                },
                "BookDetail": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "title": { "type": "string" },
                        "year": { "type": ["integer", "null"] },
                        "slug": { "type": "string" },
                        "cover_url": { "type": ["string", "null"] },
                        "is_public_domain": { "type": "boolean" },
                        "author_id": { "type": "integer" },
                        "author": { "type": "string" }
                    },
                    "required": ["id", "title", "slug", "is_public_domain", "author_id", "author"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "total": { "type": "integer" },
                        "page": { "type": "integer" },
                        "pageSize": { "type": "integer" },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "items": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/BookSummary" }
                        }
                    },
                    "required": ["total", "page", "pageSize", "tags", "items"]
                },
                "Link": {
                    "type": "object",
                    "properties": {
                        "kind": {
                            "type": "string",
                            "enum": ["source", "read_online", "library", "buy", "other"]
                        },
                        "label": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["kind", "label", "url"]
                }
            }
        }
    })
}

/// Create the books module backed by the shared database
pub fn create_module(db: Database) -> Arc<dyn Module> {
    let store: Arc<dyn CatalogStore> = Arc::new(CatalogRepository::new(db));
    Arc::new(BooksModule::new(store))
}
