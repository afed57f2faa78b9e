//! Route definitions for the REST API.

mod health;
mod import;
mod questions;
mod review;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Question operations
        .route("/questions", post(questions::create_question))
        .route(
            "/questions/:id",
            get(questions::get_question).delete(questions::delete_question),
        )
        .route("/questions/:id/review", post(questions::review_question))
        // Import
        .route("/import", post(import::import_questions))
        // Review queue and statistics
        .route("/due", get(review::get_due))
        .route("/stats", get(review::get_stats))
        // Attach state
        .with_state(state)
}

pub use health::*;
pub use import::*;
pub use questions::*;
pub use review::*;
