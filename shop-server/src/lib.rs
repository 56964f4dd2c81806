//! Shop order-placement server
//!
//! Checkout turns a cart into an order in one store transaction: stock is
//! reserved under row locks, prices are taken from the catalog, the order
//! and its items are written, and the payment follow-up is derived.

pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod state;

pub use config::Config;
pub use state::AppState;
