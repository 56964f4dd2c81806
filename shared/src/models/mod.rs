//! Data models
//!
//! Shared between the server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod order;
pub mod product;

// Re-exports
pub use order::*;
pub use product::*;
