//! # Page-Scoped Client
//!
//! One [`CheckoutClient`] over the live page, shared by the components
//! and the plain async functions so every caller joins the same script
//! cache. Constructed on first use, never torn down.

use serde_json::Value;
use std::rc::Rc;

use vektopay_core::{
    CardInput, CheckoutClient, CheckoutOptions, CheckoutResult, PixChargeInput, PixOptions,
    ScriptOptions, SharedWidgetHandle, TokenizeOptions, TokenizeOutcome,
};

use crate::dom::BrowserEnvironment;

thread_local! {
    static CLIENT: CheckoutClient = CheckoutClient::new(Rc::new(BrowserEnvironment::new()));
}

/// The page-scoped checkout client. Clones share the script cache.
pub fn checkout_client() -> CheckoutClient {
    CLIENT.with(|client| client.clone())
}

/// Ensure the widget bundle for these options is loaded.
///
/// Useful for warming the cache before the user reaches the payment
/// step; the components call it implicitly.
pub async fn load_checkout_script(options: &ScriptOptions) -> CheckoutResult<()> {
    checkout_client().load_script(options).await
}

/// Open the hosted checkout in the provider's own flow
pub async fn open_checkout(options: &CheckoutOptions) -> CheckoutResult<SharedWidgetHandle> {
    checkout_client().open_checkout(options).await
}

/// Tokenize a card through the loaded script.
///
/// Fails with the tokenize-unavailable error when the loaded bundle does
/// not expose the capability.
pub async fn tokenize_card(
    card: &CardInput,
    options: &TokenizeOptions,
) -> CheckoutResult<TokenizeOutcome> {
    checkout_client().tokenize_card(card, options).await
}

/// Create a Pix charge through the loaded script.
///
/// Fails with the Pix-unavailable error when the loaded bundle does not
/// expose the capability. The charge shape is provider-defined.
pub async fn create_pix_charge(
    input: &PixChargeInput,
    options: &PixOptions,
) -> CheckoutResult<Value> {
    checkout_client().create_pix_charge(input, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_client_is_page_scoped() {
        let a = checkout_client();
        let b = checkout_client();

        // clones share one loader, and with it the script cache
        assert!(std::ptr::eq(a.loader(), b.loader()));
    }
}
