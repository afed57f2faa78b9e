//! Server state management.

use std::path::PathBuf;
use std::sync::Arc;

use retain_core::{RetainConfig, RetainResult, ReviewService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: ReviewService,
    pub config: Arc<RetainConfig>,
}

impl AppState {
    /// Create state around an existing service.
    pub fn new(service: ReviewService, config: RetainConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Open the configured database and build the service over it.
    pub fn open(config: RetainConfig) -> RetainResult<Self> {
        let service = ReviewService::open(&config)?;
        Ok(Self::new(service, config))
    }

    /// Directories scanned by `POST /import`.
    pub fn question_dirs(&self) -> Vec<PathBuf> {
        self.config.question_dirs.clone()
    }
}
