//! MindCanvas API Server Entry Point

use std::sync::Arc;

use mindcanvas_api::{create_api_router, telemetry::init_tracing, ApiConfig, ApiError, ApiResult, AppState};
use mindcanvas_llm::{build_generation_service, GenerationConfig};
use mindcanvas_maps::MapService;
use mindcanvas_storage::{JsonFileRepository, StorageConfig, UserLocks};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let api_config = ApiConfig::from_env()?;
    init_tracing(api_config.log_format)?;

    let storage_config = StorageConfig::from_env()?;
    let repo = JsonFileRepository::new(storage_config.data_dir.clone())?;
    tracing::info!(data_dir = %repo.data_dir().display(), "Using JSON file storage");

    let generation_config = GenerationConfig::from_env()?;
    let generator = build_generation_service(&generation_config)?;
    tracing::info!(provider = generator.provider_id(), "Generation service ready");

    let mut maps = MapService::new(Arc::new(repo), generator);
    if storage_config.serialize_user_writes {
        tracing::info!("Serializing writes per user");
        maps = maps.with_user_locks(UserLocks::new());
    }

    let app = create_api_router(AppState::new(maps), &api_config);

    let addr = api_config.socket_addr()?;
    tracing::info!(%addr, "Starting MindCanvas API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
