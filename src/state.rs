use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::MessageDispatcher;
use crate::scoring::SimilarityScorer;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,

    /// Outbound message delivery; swapped for a recording fake in tests.
    pub dispatcher: Arc<dyn MessageDispatcher>,

    /// Similarity strategy for completion answers.
    pub scorer: Arc<dyn SimilarityScorer>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
