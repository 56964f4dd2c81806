//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed
            | Self::RequiredField
            | Self::OrderEmpty
            | Self::InvalidQuantity
            | Self::InvalidOrderStatus => StatusCode::BAD_REQUEST,
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::RoleRequired => StatusCode::FORBIDDEN,
            Self::OrderNotFound | Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::ProductOutOfStock => StatusCode::CONFLICT,
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
