//! HTTP API for the clipvault service.
//!
//! Exposed as a library so integration tests can build the router against
//! test collaborators (local storage, canned media tool, in-memory database).

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;
