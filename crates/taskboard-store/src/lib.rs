//! # Taskboard Store
//!
//! SQLite-backed implementation of the [`taskboard_core::TaskGateway`]
//! persistence seam:
//!
//! - WAL mode with a small thread-safe connection pool
//! - versioned schema migrations
//! - an `updated_at` refresh trigger so callers never manage timestamps
//!
//! Driver errors are classified into typed [`taskboard_core::StoreError`]
//! kinds at the point of failure; nothing downstream matches on message
//! strings.

mod gateway;
mod migrate;
mod pool;

pub use gateway::SqliteGateway;
pub use migrate::{Migration, MigrationEngine};
pub use pool::{PooledConnection, SqlitePool};
