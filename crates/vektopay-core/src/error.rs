//! # Checkout Error Types
//!
//! Typed error handling for the Vektopay binding layer.
//! All checkout operations return `Result<T, CheckoutError>`.
//!
//! Errors are `Clone` because a settled script load is cached and its
//! outcome is handed to every caller that awaited the same URL.

use thiserror::Error;

/// Core error type for all checkout binding operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The external `checkout.js` script could not be fetched or executed
    #[error("checkout script load failed: {reason}")]
    ScriptLoadFailed { reason: String },

    /// The script loaded but the checkout namespace is not installed
    #[error("checkout namespace not installed after script load")]
    NotReady,

    /// The elements namespace has no tokenize capability
    #[error("tokenize capability not available on elements namespace")]
    TokenizeUnavailable,

    /// The elements namespace has no PIX charge-creation capability
    #[error("pix charge capability not available on elements namespace")]
    PixUnavailable,

    /// Error raised by the external script itself (opaque, passed through)
    #[error("provider error: {message}")]
    Provider { message: String },
}

impl CheckoutError {
    /// Build a script-load failure from any displayable reason
    pub fn script_load(reason: impl Into<String>) -> Self {
        CheckoutError::ScriptLoadFailed {
            reason: reason.into(),
        }
    }

    /// Build an opaque provider error from any displayable message
    pub fn provider(message: impl Into<String>) -> Self {
        CheckoutError::Provider {
            message: message.into(),
        }
    }

    /// Returns the stable wire identifier for this error.
    ///
    /// These match the error codes the hosted widget documents for its
    /// JavaScript SDK, so host applications can branch on them without
    /// caring which binding produced the error.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::ScriptLoadFailed { .. } => "checkout_script_load_failed",
            CheckoutError::NotReady => "checkout_not_ready",
            CheckoutError::TokenizeUnavailable => "tokenize_card_not_available",
            CheckoutError::PixUnavailable => "pix_create_charge_not_available",
            CheckoutError::Provider { .. } => "provider_error",
        }
    }

    /// Returns true if this error came from the external script rather
    /// than from this binding layer
    pub fn is_provider_error(&self) -> bool {
        matches!(self, CheckoutError::Provider { .. })
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CheckoutError::script_load("network down").code(),
            "checkout_script_load_failed"
        );
        assert_eq!(CheckoutError::NotReady.code(), "checkout_not_ready");
        assert_eq!(
            CheckoutError::TokenizeUnavailable.code(),
            "tokenize_card_not_available"
        );
        assert_eq!(
            CheckoutError::PixUnavailable.code(),
            "pix_create_charge_not_available"
        );
    }

    #[test]
    fn test_provider_passthrough() {
        let err = CheckoutError::provider("card_declined");
        assert!(err.is_provider_error());
        assert_eq!(err.to_string(), "provider error: card_declined");
    }

    #[test]
    fn test_errors_clone_for_cache_replay() {
        let err = CheckoutError::script_load("timeout");
        let replayed = err.clone();
        assert_eq!(err, replayed);
    }
}
