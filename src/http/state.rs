//! Application state for the HTTP server.

use std::sync::Arc;

use crate::engine::ScheduleEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Scheduling engine facade, shared across requests.
    pub engine: Arc<ScheduleEngine>,
}

impl AppState {
    /// Create a new application state with the given engine.
    pub fn new(engine: Arc<ScheduleEngine>) -> Self {
        Self { engine }
    }
}
