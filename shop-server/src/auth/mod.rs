//! Authentication
//!
//! - [`JwtService`] - token issuing and validation
//! - [`CurrentUser`] - caller identity, extracted from the `Authorization` header

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService, STAFF_ROLE};
