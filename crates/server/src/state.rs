//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use tutor_agent::TutorAgent;
use tutor_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// The turn orchestrator
    pub agent: Arc<TutorAgent>,
    /// Loaded configuration, kept for health reporting
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(agent: Arc<TutorAgent>, settings: Settings) -> Self {
        Self {
            agent,
            settings: Arc::new(settings),
        }
    }
}
