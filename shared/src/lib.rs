//! Shared types for the shop backend
//!
//! Common types used by the server and its clients: error codes,
//! response structures, and the order/product models.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use serde::{Deserialize, Serialize};
