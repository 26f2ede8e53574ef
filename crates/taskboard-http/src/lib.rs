//! # Taskboard HTTP
//!
//! The HTTP surface of Taskboard: an axum router mapping verbs and paths
//! onto [`taskboard_core::TaskService`] operations, with every result —
//! success or failure — funneled through one stable JSON envelope pair.
//!
//! The service is injected as shared state at router construction; handlers
//! are stateless and request-parallel.

pub mod config;
pub mod docs;
pub mod envelope;
pub mod handlers;
pub mod router;
pub mod shutdown;

use std::sync::Arc;

use taskboard_core::{TaskGateway, TaskService};

pub use config::{ConfigError, HttpConfig};
pub use router::router;
pub use shutdown::shutdown_signal;

/// Shared handler state: the task service behind an `Arc`.
pub struct AppState<G> {
    service: Arc<TaskService<G>>,
}

impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<G: TaskGateway> AppState<G> {
    pub fn new(service: TaskService<G>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &TaskService<G> {
        &self.service
    }
}
