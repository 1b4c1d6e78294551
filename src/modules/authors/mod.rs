pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use bookshelf_authz::require_role;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use crate::modules::state::CatalogState;

pub struct AuthorsModule {
    state: CatalogState,
}

impl AuthorsModule {
    pub fn new(state: CatalogState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            default_limit = ctx.settings.pagination.author_default_limit,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let admin = middleware::from_fn_with_state(self.state.guard.clone(), require_role);

        Router::new()
            .route(
                "/",
                get(handlers::list_authors)
                    .merge(post(handlers::create_author).route_layer(admin.clone())),
            )
            .route(
                "/{id}",
                get(handlers::show_author).merge(
                    put(handlers::update_author)
                        .delete(handlers::delete_author)
                        .route_layer(admin),
                ),
            )
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let id_param = json!({
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors with their books",
                        "tags": ["Authors"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            },
                            "400": error.clone()
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "security": [{ "bearerAuth": [] }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Author created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "400": error.clone(),
                            "401": error.clone(),
                            "403": error.clone()
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Show an author",
                        "tags": ["Authors"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "The author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "404": error.clone()
                        }
                    },
                    "put": {
                        "summary": "Update an author",
                        "tags": ["Authors"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AuthorInput" }
                                }
                            }
                        },
                        "responses": {
                            "204": { "description": "Author updated" },
                            "400": error.clone(),
                            "401": error.clone(),
                            "403": error.clone(),
                            "404": error.clone()
                        }
                    },
                    "delete": {
                        "summary": "Delete an author and their books",
                        "tags": ["Authors"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Author deleted" },
                            "401": error.clone(),
                            "403": error.clone(),
                            "404": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" },
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BookSummary" }
                            },
                            "_links": { "$ref": "#/components/schemas/Links" }
                        },
                        "required": ["id", "firstName", "lastName", "_links"]
                    },
                    "AuthorInput": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string", "minLength": 3, "maxLength": 50 },
                            "lastName": { "type": "string", "minLength": 3, "maxLength": 50 }
                        },
                        "required": ["firstName", "lastName"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(state: CatalogState) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(state))
}
