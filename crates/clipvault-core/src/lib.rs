//! Core types for clipvault: configuration, error taxonomy, and domain models.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, LogLevel};
