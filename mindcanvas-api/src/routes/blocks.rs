//! Block REST API Routes
//!
//! Block creation, follow-up messages, finalize/reopen and cascading delete.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use mindcanvas_maps::NewBlock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{parse_path_id, AuthUser},
    state::AppState,
};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockRequest {
    #[serde(default)]
    pub map_id: String,
    #[serde(default)]
    pub message: String,
    pub parent_block_id: Option<String>,
    pub highlighted_text: Option<String>,
    pub context_range: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBlockResponse {
    pub success: bool,
    pub deleted_block_ids: Vec<String>,
}

impl CreateBlockRequest {
    fn into_new_block(self) -> ApiResult<NewBlock> {
        if self.message.trim().is_empty() {
            return Err(ApiError::missing_field("message"));
        }
        let map_id = Uuid::parse_str(self.map_id.trim())
            .map_err(|_| ApiError::invalid_input(format!("Invalid mapId '{}'", self.map_id)))?;
        let parent_block_id = match self.parent_block_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_path_id(raw, parent_not_found)?),
        };

        Ok(NewBlock {
            map_id,
            message: self.message,
            parent_block_id,
            highlighted_text: self.highlighted_text,
            context_range: self.context_range,
        })
    }
}

fn parent_not_found() -> ApiError {
    ApiError::new(crate::error::ErrorCode::BlockNotFound, "Parent block not found")
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/block/create - Create a root or child block with its first exchange
pub async fn create_block(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateBlockRequest>,
) -> ApiResult<impl IntoResponse> {
    let has_parent = req
        .parent_block_id
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    let new_block = req.into_new_block()?;

    let created = state
        .maps
        .create_block(user.as_str(), new_block)
        .await
        .map_err(|e| match ApiError::from(e) {
            err if has_parent && err == ApiError::block_not_found() => parent_not_found(),
            err => err,
        })?;
    Ok(Json(created))
}

/// POST /api/block/:block_id/message - Follow-up message in a block's conversation
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(block_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::missing_field("message"));
    }
    let block_id = parse_path_id(&block_id, ApiError::block_not_found)?;

    let sent = state
        .maps
        .send_message(user.as_str(), block_id, &req.message)
        .await?;
    Ok(Json(sent))
}

/// POST /api/block/:block_id/finalize
pub async fn finalize_block(
    State(state): State<AppState>,
    user: AuthUser,
    Path(block_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let block_id = parse_path_id(&block_id, ApiError::block_not_found)?;
    let finalized = state.maps.finalize_block(user.as_str(), block_id).await?;
    Ok(Json(finalized))
}

/// POST /api/block/:block_id/reopen
pub async fn reopen_block(
    State(state): State<AppState>,
    user: AuthUser,
    Path(block_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let block_id = parse_path_id(&block_id, ApiError::block_not_found)?;
    let reopened = state.maps.reopen_block(user.as_str(), block_id).await?;
    Ok(Json(reopened))
}

/// DELETE /api/block/:block_id - Delete a block and its whole subtree
pub async fn delete_block(
    State(state): State<AppState>,
    user: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<DeleteBlockResponse>> {
    let deleted_block_ids = match Uuid::parse_str(raw_id.trim()) {
        Ok(block_id) => state
            .maps
            .delete_block(user.as_str(), block_id)
            .await?
            .deleted_block_ids
            .iter()
            .map(Uuid::to_string)
            .collect(),
        Err(_) => vec![raw_id],
    };

    Ok(Json(DeleteBlockResponse {
        success: true,
        deleted_block_ids,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/block/create", post(create_block))
        .route("/block/:block_id/message", post(send_message))
        .route("/block/:block_id/finalize", post(finalize_block))
        .route("/block/:block_id/reopen", post(reopen_block))
        .route("/block/:block_id", delete(delete_block))
}
