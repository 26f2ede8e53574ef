//! # Taskboard Client
//!
//! Client-side state management for the Taskboard API:
//!
//! - [`state`]: the in-memory task list that a renderer consumes — the
//!   single source of truth, replaced in whole-state transitions so a
//!   consumer never observes a torn intermediate
//! - [`controller`]: the optimistic update controller wrapping every
//!   mutating action in an apply-then-confirm-or-rollback protocol
//! - [`api`]: the `TaskApi` seam with a reqwest implementation speaking the
//!   server's JSON envelopes
//! - [`notify`]: the non-blocking notification seam
//!
//! Rendering itself is out of scope; a UI layer reads
//! [`controller::Controller::current_state`] (or polls the store's
//! generation counter) and draws.

pub mod api;
pub mod controller;
pub mod error;
pub mod notify;
pub mod state;

pub use api::{HttpApi, TaskApi};
pub use controller::{ActionOutcome, Controller};
pub use error::ClientError;
pub use notify::{Notifier, TracingNotifier};
pub use state::{ClientState, StateStore, TaskSnapshot};
