//! Shared application state.

use mindcanvas_maps::MapService;

/// State handed to every route handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub maps: MapService,
}

impl AppState {
    pub fn new(maps: MapService) -> Self {
        Self { maps }
    }
}
