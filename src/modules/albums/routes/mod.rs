//! HTTP handlers for the albums module.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRef, Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use folio_authz::{AuthorizationGate, Authorized};
use folio_http::error::AppError;

use super::models::{Album, AlbumId, AlbumParams, AlbumSearchForm};
use super::service::AlbumService;

pub const RESULT_COUNT_HEADER: &str = "x-result-count";
pub const RESULT_OFFSET_HEADER: &str = "x-result-offset";

/// Shared state handed to every album handler.
#[derive(Clone)]
pub struct AlbumsState {
    pub service: Arc<AlbumService>,
    pub gate: Arc<dyn AuthorizationGate>,
}

impl FromRef<AlbumsState> for Arc<dyn AuthorizationGate> {
    fn from_ref(state: &AlbumsState) -> Self {
        state.gate.clone()
    }
}

pub fn router(state: AlbumsState) -> Router {
    Router::new()
        .route("/albums", get(list_albums).post(create_album))
        .route("/albums/{id}", put(rename_album))
        .route("/albums/{id}/like", post(like_album).delete(dislike_album))
        .with_state(state)
}

/// GET /albums
async fn list_albums(
    State(state): State<AlbumsState>,
    form: Result<Query<AlbumSearchForm>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(form) = form.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let page = state.service.list(&form).await?;

    Ok((
        [
            (RESULT_COUNT_HEADER, page.count.to_string()),
            (RESULT_OFFSET_HEADER, page.offset.to_string()),
        ],
        Json(page.albums),
    ))
}

/// POST /albums
async fn create_album(
    State(state): State<AlbumsState>,
    Authorized(caller): Authorized,
    params: Result<Json<AlbumParams>, JsonRejection>,
) -> Result<Json<Album>, AppError> {
    let Json(params) = params.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let album = state.service.create(&caller, &params.album_name).await?;
    Ok(Json(album))
}

/// PUT /albums/{id}
async fn rename_album(
    State(state): State<AlbumsState>,
    Authorized(caller): Authorized,
    id: Result<Path<String>, PathRejection>,
    params: Result<Json<AlbumParams>, JsonRejection>,
) -> Result<Json<Album>, AppError> {
    let id = parse_id(id)?;
    let Json(params) = params.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let album = state.service.rename(&caller, id, &params.album_name).await?;
    Ok(Json(album))
}

/// POST /albums/{id}/like
async fn like_album(
    State(state): State<AlbumsState>,
    Authorized(caller): Authorized,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    state.service.like(&caller, parse_id(id)?).await?;
    Ok(StatusCode::OK)
}

/// DELETE /albums/{id}/like
async fn dislike_album(
    State(state): State<AlbumsState>,
    Authorized(caller): Authorized,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    state.service.dislike(&caller, parse_id(id)?).await?;
    Ok(StatusCode::OK)
}

/// Ids that cannot be decoded or parsed can never resolve, so they are
/// reported like any other unknown album.
fn parse_id(id: Result<Path<String>, PathRejection>) -> Result<AlbumId, AppError> {
    let Path(raw) = id.map_err(|rejection| {
        tracing::debug!(rejection = %rejection.body_text(), "undecodable album id");
        AppError::not_found("album not found")
    })?;

    raw.parse().map_err(|_| {
        tracing::debug!(album_id = %raw, "malformed album id");
        AppError::not_found("album not found")
    })
}
