//! # Widget Namespace Traits
//!
//! The loaded script installs two global objects; this module models them
//! as injected traits so the orchestration in [`crate::client`] stays
//! testable without a DOM. The browser crate provides the real
//! implementations over the JS globals; [`crate::mock`] provides
//! scriptable ones.
//!
//! Optional capabilities (`tokenizeCard`, `pix.createCharge`) default to
//! unavailable; an implementation opts in by overriding the `supports_*`
//! check together with the call itself.

use async_trait::async_trait;
use serde_json::Value;
use std::rc::Rc;

use crate::card::{CardElementOptions, CardInput, TokenizeOptions, TokenizeOutcome};
use crate::error::{CheckoutError, CheckoutResult};
use crate::options::{CheckoutOptions, EmbedOptions};
use crate::pix::{PixChargeInput, PixOptions};

/// Global object name for the checkout namespace
pub const CHECKOUT_GLOBAL: &str = "VektopayCheckout";

/// Global object name for the elements namespace
pub const ELEMENTS_GLOBAL: &str = "VektopayElements";

/// Opaque handle to a live widget instance
pub trait WidgetHandle {
    /// Tear the widget out of the page. No-op when the underlying
    /// instance exposes no close capability.
    fn close(&self);
}

/// Shared widget handle, single-threaded
pub type SharedWidgetHandle = Rc<dyn WidgetHandle>;

/// Opaque handle to a mounted card element
#[async_trait(?Send)]
pub trait CardElementHandle {
    /// Read the element's current payload (opaque provider structure)
    async fn payload(&self) -> CheckoutResult<Value>;

    /// Run the element's own input validation
    async fn validate(&self) -> CheckoutResult<Value>;
}

/// Shared card element handle, single-threaded
pub type SharedCardElementHandle = Rc<dyn CardElementHandle>;

/// The checkout namespace (`VektopayCheckout`)
#[async_trait(?Send)]
pub trait CheckoutNamespace {
    /// Open the hosted checkout in the provider's own flow
    async fn open(&self, options: &CheckoutOptions) -> CheckoutResult<SharedWidgetHandle>;

    /// Embed the checkout into a host-owned container
    async fn embed(&self, options: &EmbedOptions) -> CheckoutResult<SharedWidgetHandle>;
}

/// Shared checkout namespace, single-threaded
pub type SharedCheckoutNamespace = Rc<dyn CheckoutNamespace>;

/// The elements namespace (`VektopayElements`)
#[async_trait(?Send)]
pub trait ElementsNamespace {
    /// Mount a card element into the container selected by `mount`
    async fn create_card(
        &self,
        mount: &str,
        options: &CardElementOptions,
    ) -> CheckoutResult<SharedCardElementHandle>;

    /// Whether the loaded script exposes direct card tokenization
    fn supports_tokenize(&self) -> bool {
        false
    }

    /// Tokenize a card without mounting an element
    async fn tokenize_card(
        &self,
        _card: &CardInput,
        _options: &TokenizeOptions,
    ) -> CheckoutResult<TokenizeOutcome> {
        Err(CheckoutError::TokenizeUnavailable)
    }

    /// Whether the loaded script exposes Pix charge creation
    fn supports_pix(&self) -> bool {
        false
    }

    /// Create a Pix charge; the result shape is provider-defined
    async fn create_pix_charge(
        &self,
        _input: &PixChargeInput,
        _options: &PixOptions,
    ) -> CheckoutResult<Value> {
        Err(CheckoutError::PixUnavailable)
    }
}

/// Shared elements namespace, single-threaded
pub type SharedElementsNamespace = Rc<dyn ElementsNamespace>;
