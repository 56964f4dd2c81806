//! Error codes and the `AppError` returned across the HTTP boundary
//!
//! Every error body has the shape `{ "code", "message", "details"? }`.
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::insufficient_stock("P1", 2, 3);
//! assert_eq!(err.code, ErrorCode::ProductOutOfStock);
//! assert_eq!(ErrorBody::from(&err).code, 6003);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
