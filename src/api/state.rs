use std::sync::Arc;

use crate::services::engine::RecommendationEngine;

/// Shared application state
///
/// The engine is process-wide; all per-request state lives inside one
/// `generate` call. Cloning the state clones an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
