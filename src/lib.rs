//! Chirpy Backend Library
//!
//! Persistence and identity core for a small message board, plus the thin
//! HTTP layer the `chirpy` binary serves.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod moderation;
pub mod repo;
pub mod store;

pub use error::{ChirpyError, Result};
