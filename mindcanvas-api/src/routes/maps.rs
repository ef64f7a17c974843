//! Map REST API Routes

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use mindcanvas_maps::{MapListing, MapView};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{parse_path_id, AuthUser},
    state::AppState,
};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMapRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMapsResponse {
    pub maps: Vec<MapListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMapResponse {
    pub success: bool,
    pub deleted_map_id: String,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/map/create - Create a map titled from the first message
pub async fn create_map(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateMapRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::missing_field("message"));
    }

    let created = state.maps.create_map(user.as_str(), &req.message).await?;
    Ok(Json(created))
}

/// GET /api/user/maps - List the caller's maps
pub async fn list_maps(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ListMapsResponse>> {
    let maps = state.maps.list_maps(user.as_str()).await?;
    Ok(Json(ListMapsResponse { maps }))
}

/// GET /api/map/:map_id - Map with its block projections
pub async fn get_map(
    State(state): State<AppState>,
    user: AuthUser,
    Path(map_id): Path<String>,
) -> ApiResult<Json<MapView>> {
    let map_id = parse_path_id(&map_id, ApiError::map_not_found)?;
    let view = state.maps.get_map(user.as_str(), map_id).await?;
    Ok(Json(view))
}

/// DELETE /api/map/:map_id - Delete a map and everything in it
pub async fn delete_map(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<DeleteMapResponse>> {
    let deleted_map_id = match uuid::Uuid::parse_str(raw_id.trim()) {
        Ok(map_id) => state.maps.delete_map(user.as_str(), map_id).await?.deleted_map_id.to_string(),
        // No stored map can carry this id, so there is nothing to remove.
        Err(_) => raw_id,
    };

    Ok(Json(DeleteMapResponse {
        success: true,
        deleted_map_id,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/map/create", post(create_map))
        .route("/user/maps", get(list_maps))
        .route("/map/:map_id", get(get_map))
        .route("/map/:map_id", delete(delete_map))
}
