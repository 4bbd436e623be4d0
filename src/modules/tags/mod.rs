use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelf_db::{Database, DbError};
use shelf_http::error::AppError;
use shelf_kernel::Module;
use sqlx::FromRow;

/// Tag as offered to clients for filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub name: String,
    pub slug: String,
}

#[derive(Clone)]
pub struct TagsRepository {
    db: Database,
}

impl TagsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<Tag>, DbError> {
        let pool = self.db.pool().await?;
        let tags = sqlx::query_as::<_, Tag>("SELECT name, slug FROM tags ORDER BY name, slug")
            .fetch_all(pool)
            .await?;

        tracing::debug!(count = tags.len(), "tags listed");
        Ok(tags)
    }
}

/// Tag listing for filter pickers. Schema is owned by the books module.
pub struct TagsModule {
    repo: TagsRepository,
}

impl TagsModule {
    pub fn new(repo: TagsRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Module for TagsModule {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_tags))
            .with_state(self.repo.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List tags",
                        "tags": ["Tags"],
                        "responses": {
                            "200": {
                                "description": "All tags ordered by name",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Tag" }
                                        }
                                    }
                                }
                            },
                            "500": {
                                "description": "Internal server error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Tag": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "slug": { "type": "string", "description": "Stable handle used by the books `tags` filter" }
                        },
                        "required": ["name", "slug"]
                    }
                }
            }
        }))
    }
}

async fn list_tags(State(repo): State<TagsRepository>) -> Result<Json<Vec<Tag>>, AppError> {
    repo.list_tags()
        .await
        .map(Json)
        .map_err(|e| AppError::internal("Failed to list tags", e))
}

/// Create the tags module backed by the shared database
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(TagsModule::new(TagsRepository::new(db)))
}
