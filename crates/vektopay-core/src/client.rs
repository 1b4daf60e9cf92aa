//! # Checkout Client
//!
//! Orchestrates every widget operation: ensure the script is loaded,
//! look up the namespace object, forward the call, and apply the
//! cancellation rules the mountable surfaces rely on. Holds no DOM
//! knowledge; the environment and loader are injected so the whole
//! control flow runs against mocks on native targets.

use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

use crate::cancel::CancelToken;
use crate::card::{CardElementOptions, CardInput, TokenizeOptions, TokenizeOutcome};
use crate::environment::SharedEnvironment;
use crate::error::{CheckoutError, CheckoutResult};
use crate::loader::ScriptLoader;
use crate::namespace::{SharedCardElementHandle, SharedWidgetHandle};
use crate::options::{CheckoutOptions, EmbedOptions, ScriptOptions};
use crate::pix::{PixChargeInput, PixOptions};

/// Entry point for every checkout operation.
///
/// Cheap to clone; clones share the environment and the script cache.
#[derive(Clone)]
pub struct CheckoutClient {
    env: SharedEnvironment,
    loader: Rc<ScriptLoader>,
}

impl CheckoutClient {
    /// Create a client over the given environment
    pub fn new(env: SharedEnvironment) -> Self {
        let loader = Rc::new(ScriptLoader::new(Rc::clone(&env)));
        Self { env, loader }
    }

    /// The script loader, for cache inspection and host-driven eviction
    pub fn loader(&self) -> &ScriptLoader {
        &self.loader
    }

    /// Ensure the widget bundle for these options is loaded
    #[instrument(skip(self, options))]
    pub async fn load_script(&self, options: &ScriptOptions) -> CheckoutResult<()> {
        self.loader.load(options).await
    }

    /// Open the hosted checkout in the provider's own flow.
    ///
    /// Fails with the not-ready error when the checkout namespace is
    /// still absent after a successful load.
    #[instrument(skip(self, options))]
    pub async fn open_checkout(
        &self,
        options: &CheckoutOptions,
    ) -> CheckoutResult<SharedWidgetHandle> {
        self.loader.load(&options.script_options()).await?;

        let Some(checkout) = self.env.checkout() else {
            warn!("checkout namespace absent after load");
            return Err(CheckoutError::NotReady);
        };

        let handle = checkout.open(options).await?;
        info!("checkout widget opened");
        Ok(handle)
    }

    /// Embed the checkout into the container with the given element id.
    ///
    /// `Ok(None)` means the operation was silently dropped: the token was
    /// cancelled, or no namespace is installed (non-browser execution).
    /// Once the token is cancelled every outcome is swallowed, including
    /// a load failure; a widget created by a late-arriving settlement is
    /// closed before being dropped.
    #[instrument(skip(self, options, cancel))]
    pub async fn embed_checkout(
        &self,
        options: &CheckoutOptions,
        mount_id: &str,
        cancel: &CancelToken,
    ) -> CheckoutResult<Option<SharedWidgetHandle>> {
        let loaded = self.loader.load(&options.script_options()).await;
        if cancel.is_cancelled() {
            debug!("embed cancelled while script was loading");
            return Ok(None);
        }
        loaded?;

        let Some(checkout) = self.env.checkout() else {
            debug!("checkout namespace absent, skipping embed");
            return Ok(None);
        };

        let embed = EmbedOptions::for_mount_id(options.clone(), mount_id);
        let created = checkout.embed(&embed).await;
        if cancel.is_cancelled() {
            debug!("embed cancelled during widget creation");
            if let Ok(handle) = created {
                handle.close();
            }
            return Ok(None);
        }

        let handle = created?;
        info!("checkout widget embedded");
        Ok(Some(handle))
    }

    /// Mount a card element into the container with the given element id.
    ///
    /// Same cancellation contract as [`Self::embed_checkout`], except a
    /// late-created element is dropped without teardown: card element
    /// handles expose no close capability.
    #[instrument(skip(self, options, cancel))]
    pub async fn create_card_element(
        &self,
        options: &CardElementOptions,
        mount_id: &str,
        cancel: &CancelToken,
    ) -> CheckoutResult<Option<SharedCardElementHandle>> {
        let loaded = self.loader.load(&options.script_options()).await;
        if cancel.is_cancelled() {
            debug!("card element cancelled while script was loading");
            return Ok(None);
        }
        loaded?;

        let Some(elements) = self.env.elements() else {
            debug!("elements namespace absent, skipping card element");
            return Ok(None);
        };

        let mount = format!("#{mount_id}");
        let created = elements.create_card(&mount, options).await;
        if cancel.is_cancelled() {
            debug!("card element cancelled during creation");
            return Ok(None);
        }

        let handle = created?;
        info!("card element mounted");
        Ok(Some(handle))
    }

    /// Tokenize a card through the loaded script.
    ///
    /// Requires the optional tokenize capability; fails with its
    /// unavailable error otherwise. Input and result pass through
    /// unmodified.
    #[instrument(skip_all)]
    pub async fn tokenize_card(
        &self,
        card: &CardInput,
        options: &TokenizeOptions,
    ) -> CheckoutResult<TokenizeOutcome> {
        self.loader.load(&options.script_options()).await?;

        let Some(elements) = self.env.elements() else {
            return Err(CheckoutError::TokenizeUnavailable);
        };
        if !elements.supports_tokenize() {
            return Err(CheckoutError::TokenizeUnavailable);
        }

        let outcome = elements.tokenize_card(card, options).await?;
        info!(
            providers = outcome.providers.len(),
            success = outcome.success,
            "card tokenized"
        );
        Ok(outcome)
    }

    /// Create a Pix charge through the loaded script.
    ///
    /// Requires the optional Pix capability; fails with its unavailable
    /// error otherwise. The result shape is provider-defined.
    #[instrument(skip(self, input, options))]
    pub async fn create_pix_charge(
        &self,
        input: &PixChargeInput,
        options: &PixOptions,
    ) -> CheckoutResult<Value> {
        self.loader.load(&options.script_options()).await?;

        let Some(elements) = self.env.elements() else {
            return Err(CheckoutError::PixUnavailable);
        };
        if !elements.supports_pix() {
            return Err(CheckoutError::PixUnavailable);
        }

        let charge = elements.create_pix_charge(input, options).await?;
        info!("pix charge created");
        Ok(charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{MaskedCard, TokenizeOutcome};
    use crate::mock::MockEnvironment;
    use serde_json::json;

    const BASE: &str = "https://pay.example.com";

    fn client_over(env: &Rc<MockEnvironment>) -> CheckoutClient {
        CheckoutClient::new(env.clone())
    }

    fn checkout_options() -> CheckoutOptions {
        CheckoutOptions::new("tok_123").with_api_base(BASE)
    }

    #[tokio::test]
    async fn test_open_checkout_loads_then_opens() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);

        let handle = client.open_checkout(&checkout_options()).await.unwrap();

        assert_eq!(env.injections().len(), 1);
        let opens = env.checkout_mock().open_calls();
        assert_eq!(opens.len(), 1);
        assert_eq!(opens[0].token, "tok_123");

        handle.close();
        assert_eq!(env.checkout_mock().handles()[0].close_count(), 1);
    }

    #[tokio::test]
    async fn test_open_checkout_not_ready_without_namespace() {
        let env = Rc::new(MockEnvironment::new().with_no_install_on_load());
        let client = client_over(&env);

        let err = client
            .open_checkout(&checkout_options())
            .await
            .err()
            .unwrap();

        assert_eq!(err, CheckoutError::NotReady);
        assert_eq!(err.code(), "checkout_not_ready");
        assert!(env.checkout_mock().open_calls().is_empty());
    }

    #[tokio::test]
    async fn test_open_passes_provider_errors_through() {
        let env = Rc::new(MockEnvironment::new());
        env.checkout_mock()
            .set_failure(CheckoutError::provider("session expired"));
        let client = client_over(&env);

        let err = client
            .open_checkout(&checkout_options())
            .await
            .err()
            .unwrap();

        assert!(err.is_provider_error());
        assert_eq!(err, CheckoutError::provider("session expired"));
    }

    #[tokio::test]
    async fn test_open_over_preinstalled_namespaces_skips_injection() {
        let env = Rc::new(MockEnvironment::new());
        env.install_namespaces();
        let client = client_over(&env);

        client.open_checkout(&checkout_options()).await.unwrap();

        assert!(env.injections().is_empty());
        assert_eq!(env.checkout_mock().open_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_embed_builds_mount_selector() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let token = CancelToken::new();

        let handle = client
            .embed_checkout(&checkout_options(), "vekto-embed-1", &token)
            .await
            .unwrap();

        assert!(handle.is_some());
        let embeds = env.checkout_mock().embed_calls();
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].mount, "#vekto-embed-1");
        assert_eq!(embeds[0].checkout.token, "tok_123");
    }

    #[tokio::test]
    async fn test_embed_cancelled_before_load_settles() {
        let env = Rc::new(MockEnvironment::new().with_held_injections());
        let client = client_over(&env);
        let options = checkout_options();
        let token = CancelToken::new();

        let drive = async {
            while env.held_count() == 0 {
                tokio::task::yield_now().await;
            }
            token.cancel();
            env.release_held(Ok(()));
        };

        let (result, _) = futures::join!(
            client.embed_checkout(&options, "vekto-embed-1", &token),
            drive
        );

        assert!(result.unwrap().is_none());
        assert!(env.checkout_mock().embed_calls().is_empty());
        // the load itself was never aborted
        assert_eq!(env.injections().len(), 1);
    }

    #[tokio::test]
    async fn test_embed_load_failure_reaches_live_surface() {
        let env = Rc::new(
            MockEnvironment::new().with_inject_error(CheckoutError::script_load("network error")),
        );
        let client = client_over(&env);
        let token = CancelToken::new();

        let err = client
            .embed_checkout(&checkout_options(), "vekto-embed-1", &token)
            .await
            .err()
            .unwrap();

        assert_eq!(err.code(), "checkout_script_load_failed");
    }

    #[tokio::test]
    async fn test_embed_load_failure_suppressed_after_cancel() {
        let env = Rc::new(MockEnvironment::new().with_held_injections());
        let client = client_over(&env);
        let options = checkout_options();
        let token = CancelToken::new();

        let drive = async {
            while env.held_count() == 0 {
                tokio::task::yield_now().await;
            }
            token.cancel();
            env.release_held(Err(CheckoutError::script_load("network error")));
        };

        let (result, _) = futures::join!(
            client.embed_checkout(&options, "vekto-embed-1", &token),
            drive
        );

        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_embed_cancelled_during_creation_closes_widget() {
        let env = Rc::new(MockEnvironment::new());
        env.checkout_mock().hold_calls();
        let client = client_over(&env);
        let options = checkout_options();
        let token = CancelToken::new();

        let drive = async {
            while env.checkout_mock().held_count() == 0 {
                tokio::task::yield_now().await;
            }
            token.cancel();
            env.checkout_mock().release_calls();
        };

        let (result, _) = futures::join!(
            client.embed_checkout(&options, "vekto-embed-1", &token),
            drive
        );

        assert!(result.unwrap().is_none());
        let handles = env.checkout_mock().handles();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].close_count(), 1);
    }

    #[tokio::test]
    async fn test_embed_without_namespace_is_silent() {
        let env = Rc::new(MockEnvironment::new().with_no_install_on_load());
        let client = client_over(&env);
        let token = CancelToken::new();

        let result = client
            .embed_checkout(&checkout_options(), "vekto-embed-1", &token)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(env.checkout_mock().embed_calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_mounts_inject_once_with_exact_url() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let options = CheckoutOptions::new("tok_123").with_api_base("https://pay.example.com/");

        client
            .embed_checkout(&options, "vekto-embed-1", &CancelToken::new())
            .await
            .unwrap();
        client
            .embed_checkout(&options, "vekto-embed-2", &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(
            env.injections(),
            vec!["https://pay.example.com/checkout.js".to_string()]
        );
        assert_eq!(env.checkout_mock().embed_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_card_element_mount_selector() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let options = CardElementOptions::default().with_api_base(BASE);

        let handle = client
            .create_card_element(&options, "vekto-card-9", &CancelToken::new())
            .await
            .unwrap();

        assert!(handle.is_some());
        let creates = env.elements_mock().card_creates();
        assert_eq!(creates.len(), 1);
        // selector and options travel as two separate values
        assert_eq!(creates[0].0, "#vekto-card-9");
        assert_eq!(creates[0].1.api_base.as_deref(), Some(BASE));
    }

    #[tokio::test]
    async fn test_card_element_handle_is_the_namespace_instance() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let options = CardElementOptions::default().with_api_base(BASE);

        let handle = client
            .create_card_element(&options, "vekto-card-3", &CancelToken::new())
            .await
            .unwrap()
            .unwrap();

        let issued = env.elements_mock().handles();
        assert_eq!(issued.len(), 1);
        issued[0].set_payload(json!({ "brand": "visa", "last4": "1111" }));
        assert_eq!(
            handle.payload().await.unwrap(),
            json!({ "brand": "visa", "last4": "1111" })
        );
    }

    #[tokio::test]
    async fn test_card_element_cancel_after_creation_suppresses_result() {
        let env = Rc::new(MockEnvironment::new());
        env.elements_mock().hold_calls();
        let client = client_over(&env);
        let options = CardElementOptions::default().with_api_base(BASE);
        let token = CancelToken::new();

        let drive = async {
            while env.elements_mock().held_count() == 0 {
                tokio::task::yield_now().await;
            }
            token.cancel();
            env.elements_mock().release_calls();
        };

        let (result, _) = futures::join!(
            client.create_card_element(&options, "vekto-card-9", &token),
            drive
        );

        // creation ran, but the cancelled surface never sees the handle
        assert!(result.unwrap().is_none());
        assert_eq!(env.elements_mock().card_creates().len(), 1);
    }

    #[tokio::test]
    async fn test_card_element_failure_reaches_live_surface() {
        let env = Rc::new(MockEnvironment::new());
        env.elements_mock()
            .set_failure(CheckoutError::provider("container not found"));
        let client = client_over(&env);
        let options = CardElementOptions::default().with_api_base(BASE);

        let err = client
            .create_card_element(&options, "vekto-card-9", &CancelToken::new())
            .await
            .err()
            .unwrap();

        assert!(err.is_provider_error());
    }

    #[tokio::test]
    async fn test_tokenize_unavailable_without_capability() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let card = CardInput::new("4111111111111111");

        let err = client
            .tokenize_card(&card, &TokenizeOptions::default().with_api_base(BASE))
            .await
            .unwrap_err();

        assert_eq!(err, CheckoutError::TokenizeUnavailable);
        assert_eq!(err.code(), "tokenize_card_not_available");
        assert!(env.elements_mock().tokenize_calls().is_empty());
    }

    #[tokio::test]
    async fn test_tokenize_passes_through_unchanged() {
        let env = Rc::new(MockEnvironment::new());
        let outcome = TokenizeOutcome {
            success: true,
            providers: Default::default(),
            provider_meta: None,
            masked: MaskedCard {
                last4: "1111".to_string(),
                brand: "visa".to_string(),
            },
            elapsed_ms: 87,
        };
        env.elements_mock().enable_tokenize(outcome.clone());
        let client = client_over(&env);
        let card = CardInput::new("4111111111111111").with_expiry(12, 2031);

        let result = client
            .tokenize_card(&card, &TokenizeOptions::default().with_api_base(BASE))
            .await
            .unwrap();

        assert_eq!(result, outcome);
        let calls = env.elements_mock().tokenize_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.number, "4111111111111111");
    }

    #[tokio::test]
    async fn test_pix_unavailable_without_capability() {
        let env = Rc::new(MockEnvironment::new());
        let client = client_over(&env);
        let input = PixChargeInput::for_amount(1000);
        let options = PixOptions::default()
            .with_api_base(BASE)
            .with_provider("woovi");

        let err = client.create_pix_charge(&input, &options).await.unwrap_err();

        assert_eq!(err, CheckoutError::PixUnavailable);
        assert_eq!(err.code(), "pix_create_charge_not_available");
        assert!(env.elements_mock().pix_calls().is_empty());
    }

    #[tokio::test]
    async fn test_pix_charge_passes_through_unchanged() {
        let env = Rc::new(MockEnvironment::new());
        let charge = json!({ "chargeId": "ch_881", "qrCode": "000201..." });
        env.elements_mock().enable_pix(charge.clone());
        let client = client_over(&env);
        let input = PixChargeInput::for_amount(1000);
        let options = PixOptions::default()
            .with_api_base(BASE)
            .with_provider("woovi");

        let result = client.create_pix_charge(&input, &options).await.unwrap();

        assert_eq!(result, charge);
        let calls = env.elements_mock().pix_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.amount, Some(1000));
        assert_eq!(calls[0].1.pix.as_ref().unwrap().provider, "woovi");
    }
}
