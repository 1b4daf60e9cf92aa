//! # vektopay-web
//!
//! Browser surface of the Vektopay checkout bindings.
//!
//! This crate provides:
//! - `EmbeddedCheckout`, `CheckoutButton`, and `CardElement` Leptos
//!   components that keep widget instances in sync with their lifecycle
//! - `load_checkout_script`, `open_checkout`, `tokenize_card`, and
//!   `create_pix_charge` async functions over a page-scoped client
//! - `BrowserEnvironment`, the `web-sys` implementation of the core
//!   `ScriptEnvironment` trait
//! - reflective bindings onto the `VektopayCheckout` and
//!   `VektopayElements` globals the loaded bundle installs
//!
//! ## Usage (Leptos)
//!
//! ```rust,ignore
//! use leptos::prelude::*;
//! use vektopay_web::EmbeddedCheckout;
//!
//! view! {
//!     <EmbeddedCheckout
//!         token="tok_123"
//!         api_base="https://pay.example.com"
//!         on_ready=Callback::new(|handle| { /* keep for later */ })
//!     />
//! }
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod api;
pub mod bindings;
pub mod components;
pub mod dom;

pub use api::{
    checkout_client, create_pix_charge, load_checkout_script, open_checkout, tokenize_card,
};
pub use components::{CardElement, CheckoutButton, EmbeddedCheckout};
pub use dom::BrowserEnvironment;

use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
