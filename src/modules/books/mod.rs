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

/// Books resource: paginated cached listing plus admin-only writes.
pub struct BooksModule {
    state: CatalogState,
}

impl BooksModule {
    pub fn new(state: CatalogState) -> Self {
        Self { state }
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
            cache_tag = self.state.cache_tag(),
            default_version = %self.state.default_version,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let admin = middleware::from_fn_with_state(self.state.guard.clone(), require_role);

        Router::new()
            .route(
                "/",
                get(handlers::list_books)
                    .merge(post(handlers::create_book).route_layer(admin.clone())),
            )
            .route(
                "/{id}",
                get(handlers::show_book).merge(
                    put(handlers::update_book)
                        .delete(handlers::delete_book)
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
        let accept_param = json!({
            "name": "Accept", "in": "header", "required": false,
            "description": "Media type with an optional `version` parameter, e.g. `application/json; version=2.0`",
            "schema": { "type": "string" }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books with their author",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "400": error.clone()
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [accept_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
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
                        "summary": "Show a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone(), accept_param],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": error.clone(),
                            "404": error.clone()
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param.clone()],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookInput" }
                                }
                            }
                        },
                        "responses": {
                            "204": { "description": "Book updated" },
                            "400": error.clone(),
                            "401": error.clone(),
                            "403": error.clone(),
                            "404": error.clone()
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "security": [{ "bearerAuth": [] }],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "401": error.clone(),
                            "403": error.clone(),
                            "404": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "coverText": { "type": "string", "nullable": true },
                            "author": {
                                "nullable": true,
                                "allOf": [{ "$ref": "#/components/schemas/AuthorSummary" }]
                            },
                            "comment": {
                                "type": "string",
                                "nullable": true,
                                "description": "Only present from version 2.0"
                            },
                            "_links": { "$ref": "#/components/schemas/Links" }
                        },
                        "required": ["id", "title", "coverText", "author", "_links"]
                    },
                    "Links": {
                        "type": "object",
                        "description": "delete and update are only listed for admins",
                        "properties": {
                            "self": { "$ref": "#/components/schemas/Link" },
                            "delete": { "$ref": "#/components/schemas/Link" },
                            "update": { "$ref": "#/components/schemas/Link" }
                        },
                        "required": ["self"]
                    },
                    "Link": {
                        "type": "object",
                        "properties": { "href": { "type": "string" } },
                        "required": ["href"]
                    },
                    "BookSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "coverText": { "type": "string", "nullable": true }
                        },
                        "required": ["id", "title", "coverText"]
                    },
                    "AuthorSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 3, "maxLength": 50 },
                            "coverText": { "type": "string" },
                            "comment": { "type": "string" },
                            "idAuthor": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Unknown ids leave the book without an author"
                            }
                        },
                        "required": ["title"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let stats = self.state.cache.stats();
        tracing::info!(
            module = self.name(),
            hits = stats.hits,
            misses = stats.misses,
            invalidated = stats.invalidated,
            "books module stopped"
        );
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(state: CatalogState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
