//! Numeric error codes returned in every error body
//!
//! The thousands digit names the area (see [`super::ErrorCategory`]).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // request shape
    ValidationFailed = 2,
    RequiredField = 7,

    // caller identity
    NotAuthenticated = 1001,
    TokenExpired = 1003,
    TokenInvalid = 1004,

    RoleRequired = 2002,

    // orders
    OrderNotFound = 4001,
    OrderEmpty = 4007,
    /// Line quantity is not a positive integer
    InvalidQuantity = 4008,
    /// Status label outside the order lifecycle
    InvalidOrderStatus = 4009,

    // catalog
    ProductNotFound = 6001,
    /// Requested quantity exceeds the units on hand
    ProductOutOfStock = 6003,

    DatabaseError = 9002,
}

impl ErrorCode {
    const ALL: [ErrorCode; 13] = [
        ErrorCode::ValidationFailed,
        ErrorCode::RequiredField,
        ErrorCode::NotAuthenticated,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::RoleRequired,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderEmpty,
        ErrorCode::InvalidQuantity,
        ErrorCode::InvalidOrderStatus,
        ErrorCode::ProductNotFound,
        ErrorCode::ProductOutOfStock,
        ErrorCode::DatabaseError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message, used when no specific one is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::RoleRequired => "Staff role is required",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::InvalidQuantity => "Quantity must be a positive integer",
            ErrorCode::InvalidOrderStatus => "Unknown order status",
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductOutOfStock => "Insufficient stock",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A number that is not one of the [`ErrorCode`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
