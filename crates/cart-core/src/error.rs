//! # Cart Error Types
//!
//! Typed error handling for the movie-cart core.
//! All fallible cart, catalog and checkout operations return `Result<T, CartError>`.

use crate::checkout::CheckoutStatus;
use thiserror::Error;

/// Core error type for all cart operations
#[derive(Debug, Error)]
pub enum CartError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Item is not in the cart
    #[error("Item not in cart: {item_id}")]
    ItemNotFound { item_id: u64 },

    /// Checkout was requested on an empty cart
    #[error("Cannot start checkout: the cart is empty")]
    EmptyCart,

    /// Action is not allowed from the current checkout status
    #[error("Cannot {action} while checkout is {from}")]
    InvalidTransition {
        from: CheckoutStatus,
        action: &'static str,
    },

    /// Catalog provider answered with an error
    #[error("Catalog error [{provider}]: {message}")]
    Catalog { provider: String, message: String },

    /// Network/HTTP error communicating with the catalog
    #[error("Network error: {0}")]
    Network(String),

    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CartError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, CartError::Network(_) | CartError::Catalog { .. })
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CartError::Configuration(_) => 500,
            CartError::InvalidRequest(_) => 400,
            CartError::ItemNotFound { .. } => 404,
            CartError::EmptyCart => 409,
            CartError::InvalidTransition { .. } => 409,
            CartError::Catalog { .. } => 502,
            CartError::Network(_) => 503,
            CartError::Storage(_) => 500,
            CartError::Serialization(_) => 500,
            CartError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CartError {
    fn from(err: std::io::Error) -> Self {
        CartError::Storage(err.to_string())
    }
}

/// Result type alias for cart operations
pub type CartResult<T> = Result<T, CartError>;
