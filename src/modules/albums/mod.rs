pub mod error;
pub mod models;
pub mod query;
pub mod repository;
pub mod routes;
pub mod service;
pub mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use folio_authz::AuthorizationGate;
use folio_kernel::{InitCtx, Module};

use routes::AlbumsState;
use service::AlbumService;

/// Albums module: search, create, rename and like albums
pub struct AlbumsModule {
    state: AlbumsState,
}

impl AlbumsModule {
    pub fn new(service: Arc<AlbumService>, gate: Arc<dyn AuthorizationGate>) -> Self {
        Self {
            state: AlbumsState { service, gate },
        }
    }
}

#[async_trait]
impl Module for AlbumsModule {
    fn name(&self) -> &'static str {
        "albums"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            public = ctx.settings.auth.public,
            max_count = ctx.settings.albums.max_count,
            "albums module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let config = self.state.service.client_config().await?;
        tracing::info!(
            module = self.name(),
            albums = config.count.albums,
            favorites = config.count.favorites,
            "albums module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "albums module stopped");
        Ok(())
    }
}

fn openapi_fragment() -> serde_json::Value {
    let error_response = |description: &str| {
        serde_json::json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        })
    };
    let album_response = |description: &str| {
        serde_json::json!({
            "description": description,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Album" }
                }
            }
        })
    };
    let id_parameter = serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });
    let session_header = serde_json::json!({
        "name": "X-Session-Token",
        "in": "header",
        "required": false,
        "schema": { "type": "string" }
    });
    let params_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/AlbumParams" }
            }
        }
    });
    let query_parameter = |name: &str, schema: serde_json::Value| {
        serde_json::json!({ "name": name, "in": "query", "required": false, "schema": schema })
    };

    serde_json::json!({
        "paths": {
            "/albums": {
                "get": {
                    "summary": "Search albums",
                    "tags": ["Albums"],
                    "parameters": [
                        query_parameter("q", serde_json::json!({ "type": "string" })),
                        query_parameter("favorites", serde_json::json!({ "type": "boolean" })),
                        query_parameter("count", serde_json::json!({ "type": "integer", "minimum": 0 })),
                        query_parameter("offset", serde_json::json!({ "type": "integer", "minimum": 0 })),
                        query_parameter("order", serde_json::json!({
                            "type": "string",
                            "enum": ["favorites", "name", "newest", "oldest"]
                        }))
                    ],
                    "responses": {
                        "200": {
                            "description": "Page of albums; X-Result-Count and X-Result-Offset carry the applied bounds",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Album" }
                                    }
                                }
                            }
                        },
                        "400": error_response("Invalid search form")
                    }
                },
                "post": {
                    "summary": "Create album",
                    "tags": ["Albums"],
                    "parameters": [session_header.clone()],
                    "requestBody": params_body.clone(),
                    "responses": {
                        "200": album_response("Created album"),
                        "400": error_response("Invalid body or name already exists"),
                        "401": error_response("Unauthorized")
                    }
                }
            },
            "/albums/{id}": {
                "put": {
                    "summary": "Rename album",
                    "tags": ["Albums"],
                    "parameters": [id_parameter.clone(), session_header.clone()],
                    "requestBody": params_body,
                    "responses": {
                        "200": album_response("Renamed album"),
                        "400": error_response("Invalid body or name already exists"),
                        "401": error_response("Unauthorized"),
                        "404": error_response("Album not found")
                    }
                }
            },
            "/albums/{id}/like": {
                "post": {
                    "summary": "Like album",
                    "tags": ["Albums"],
                    "parameters": [id_parameter.clone(), session_header.clone()],
                    "responses": {
                        "200": { "description": "Album marked as favorite" },
                        "401": error_response("Unauthorized"),
                        "404": error_response("Album not found")
                    }
                },
                "delete": {
                    "summary": "Dislike album",
                    "tags": ["Albums"],
                    "parameters": [id_parameter, session_header],
                    "responses": {
                        "200": { "description": "Album no longer a favorite" },
                        "401": error_response("Unauthorized"),
                        "404": error_response("Album not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Album": {
                    "type": "object",
                    "properties": {
                        "AlbumUUID": { "type": "string", "format": "uuid" },
                        "AlbumName": { "type": "string" },
                        "AlbumSlug": { "type": "string" },
                        "AlbumFavorite": { "type": "boolean" },
                        "CreatedAt": { "type": "string", "format": "date-time" },
                        "UpdatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["AlbumUUID", "AlbumName", "AlbumSlug", "AlbumFavorite", "CreatedAt", "UpdatedAt"]
                },
                "AlbumParams": {
                    "type": "object",
                    "properties": {
                        "AlbumName": { "type": "string" }
                    },
                    "required": ["AlbumName"]
                }
            }
        }
    })
}

/// Create a new instance of the albums module
pub fn create_module(
    service: Arc<AlbumService>,
    gate: Arc<dyn AuthorizationGate>,
) -> Arc<dyn Module> {
    Arc::new(AlbumsModule::new(service, gate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_fragment_lists_every_album_route() {
        let spec = openapi_fragment();
        let paths = spec["paths"].as_object().unwrap();

        assert!(paths["/albums"]["get"].is_object());
        assert!(paths["/albums"]["post"].is_object());
        assert!(paths["/albums/{id}"]["put"].is_object());
        assert!(paths["/albums/{id}/like"]["post"].is_object());
        assert!(paths["/albums/{id}/like"]["delete"].is_object());
        assert_eq!(
            spec["components"]["schemas"]["AlbumParams"]["required"][0],
            "AlbumName"
        );
    }
}
