//! # vektopay-core
//!
//! Platform-neutral core of the Vektopay checkout bindings.
//!
//! This crate provides:
//! - `ScriptLoader` for single-flight loading of the hosted widget bundle
//! - `CheckoutClient` orchestrating open/embed/card/tokenize/Pix calls
//! - `CheckoutNamespace`, `ElementsNamespace`, and `ScriptEnvironment`
//!   traits modelling the globals the loaded script installs
//! - `CancelToken` for unmount-safe async continuations
//! - typed passthrough options and the `TokenizeOutcome` result structure
//! - `CheckoutError` for typed error handling with stable wire codes
//! - a scriptable `mock` environment for tests and demos
//!
//! Everything here runs on native targets; the browser surface lives in
//! `vektopay-web`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vektopay_core::{CancelToken, CheckoutClient, CheckoutOptions};
//!
//! let client = CheckoutClient::new(environment);
//!
//! // Embed the checkout into <div id="pay-here">
//! let cancel = CancelToken::new();
//! let options = CheckoutOptions::new("tok_123").with_api_base("https://pay.example.com");
//! if let Some(handle) = client.embed_checkout(&options, "pay-here", &cancel).await? {
//!     // keep the handle; close() it on unmount
//! }
//! ```

pub mod cancel;
pub mod card;
pub mod client;
pub mod environment;
pub mod error;
pub mod loader;
pub mod mock;
pub mod namespace;
pub mod options;
pub mod pix;

// Re-exports for convenience
pub use cancel::CancelToken;
pub use card::{
    CardElementOptions, CardInput, MaskedCard, ProviderTokenResult, TokenStatus, TokenizeOptions,
    TokenizeOutcome,
};
pub use client::CheckoutClient;
pub use environment::{DetachedEnvironment, ScriptEnvironment, SharedEnvironment};
pub use error::{CheckoutError, CheckoutResult};
pub use loader::{normalize_base, script_url, ScriptLoader, SharedLoad, CHECKOUT_SCRIPT};
pub use namespace::{
    CardElementHandle, CheckoutNamespace, ElementsNamespace, SharedCardElementHandle,
    SharedCheckoutNamespace, SharedElementsNamespace, SharedWidgetHandle, WidgetHandle,
    CHECKOUT_GLOBAL, ELEMENTS_GLOBAL,
};
pub use options::{CheckoutOptions, EmbedOptions, ScriptOptions};
pub use pix::{PixChargeInput, PixOptions, PixProviderOptions};
