//! # JS Namespace Bindings
//!
//! Wrappers implementing the core namespace traits over the raw global
//! objects the loaded script installs. Methods are looked up with
//! `js_sys::Reflect` and invoked as `js_sys::Function`s, so the wrappers
//! stay agnostic of the exact bundle revision. Thrown values and
//! rejections surface as the opaque provider error with their message
//! passed through unchanged.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use vektopay_core::{
    CardElementHandle, CardElementOptions, CardInput, CheckoutError, CheckoutNamespace,
    CheckoutOptions, CheckoutResult, ElementsNamespace, EmbedOptions, PixChargeInput, PixOptions,
    SharedCardElementHandle, SharedWidgetHandle, TokenizeOptions, TokenizeOutcome, WidgetHandle,
};

/// Render a thrown JS value as the opaque provider error
fn provider_error(context: &str, value: JsValue) -> CheckoutError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    CheckoutError::provider(format!("{context}: {message}"))
}

fn get(target: &JsValue, key: &str) -> CheckoutResult<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|err| provider_error("property lookup", err))
}

/// The named property, when it is callable
fn method(target: &JsValue, name: &str) -> CheckoutResult<Option<Function>> {
    let value = get(target, name)?;
    Ok(value.dyn_into::<Function>().ok())
}

/// Serialize options into a plain JS object (maps as objects, not `Map`s)
fn to_js<T: Serialize>(value: &T) -> CheckoutResult<JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| CheckoutError::provider(format!("serialize options: {err}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, context: &str) -> CheckoutResult<T> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|err| CheckoutError::provider(format!("{context}: {err}")))
}

/// Await the returned value when it is a promise, pass it through when
/// it is not (the bundle is free to answer synchronously)
async fn settled(value: JsValue, context: &str) -> CheckoutResult<JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .map_err(|err| provider_error(context, err)),
        Err(value) => Ok(value),
    }
}

async fn call1(
    target: &JsValue,
    name: &str,
    arg: &JsValue,
    context: &str,
) -> CheckoutResult<JsValue> {
    let Some(func) = method(target, name)? else {
        return Err(CheckoutError::provider(format!(
            "{context}: {name} is not a function"
        )));
    };
    let returned = func
        .call1(target, arg)
        .map_err(|err| provider_error(context, err))?;
    settled(returned, context).await
}

async fn call2(
    target: &JsValue,
    name: &str,
    first: &JsValue,
    second: &JsValue,
    context: &str,
) -> CheckoutResult<JsValue> {
    let Some(func) = method(target, name)? else {
        return Err(CheckoutError::provider(format!(
            "{context}: {name} is not a function"
        )));
    };
    let returned = func
        .call2(target, first, second)
        .map_err(|err| provider_error(context, err))?;
    settled(returned, context).await
}

/// `window.VektopayCheckout`
pub struct JsCheckoutNamespace {
    object: JsValue,
}

impl JsCheckoutNamespace {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }
}

#[async_trait(?Send)]
impl CheckoutNamespace for JsCheckoutNamespace {
    async fn open(&self, options: &CheckoutOptions) -> CheckoutResult<SharedWidgetHandle> {
        let args = to_js(options)?;
        let widget = call1(&self.object, "open", &args, "open checkout").await?;
        Ok(Rc::new(JsWidgetHandle::new(widget)))
    }

    async fn embed(&self, options: &EmbedOptions) -> CheckoutResult<SharedWidgetHandle> {
        let args = to_js(options)?;
        let widget = call1(&self.object, "embed", &args, "embed checkout").await?;
        Ok(Rc::new(JsWidgetHandle::new(widget)))
    }
}

/// `window.VektopayElements`
pub struct JsElementsNamespace {
    object: JsValue,
}

impl JsElementsNamespace {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }

    /// The `pix` sub-object, when the bundle ships one
    fn pix_object(&self) -> Option<JsValue> {
        let pix = get(&self.object, "pix").ok()?;
        if pix.is_undefined() || pix.is_null() {
            None
        } else {
            Some(pix)
        }
    }
}

#[async_trait(?Send)]
impl ElementsNamespace for JsElementsNamespace {
    async fn create_card(
        &self,
        mount: &str,
        options: &CardElementOptions,
    ) -> CheckoutResult<SharedCardElementHandle> {
        // the bundle takes the mount selector and the options separately
        let mount_js = JsValue::from_str(mount);
        let options_js = to_js(options)?;
        let element = call2(
            &self.object,
            "createCard",
            &mount_js,
            &options_js,
            "create card element",
        )
        .await?;
        Ok(Rc::new(JsCardElementHandle::new(element)))
    }

    fn supports_tokenize(&self) -> bool {
        matches!(method(&self.object, "tokenizeCard"), Ok(Some(_)))
    }

    async fn tokenize_card(
        &self,
        card: &CardInput,
        options: &TokenizeOptions,
    ) -> CheckoutResult<TokenizeOutcome> {
        if !self.supports_tokenize() {
            return Err(CheckoutError::TokenizeUnavailable);
        }
        let card_js = to_js(card)?;
        let options_js = to_js(options)?;
        let result = call2(
            &self.object,
            "tokenizeCard",
            &card_js,
            &options_js,
            "tokenize card",
        )
        .await?;
        from_js(result, "tokenize result")
    }

    fn supports_pix(&self) -> bool {
        self.pix_object()
            .map(|pix| matches!(method(&pix, "createCharge"), Ok(Some(_))))
            .unwrap_or(false)
    }

    async fn create_pix_charge(
        &self,
        input: &PixChargeInput,
        options: &PixOptions,
    ) -> CheckoutResult<Value> {
        if !self.supports_pix() {
            return Err(CheckoutError::PixUnavailable);
        }
        let pix = self.pix_object().ok_or(CheckoutError::PixUnavailable)?;

        let input_js = to_js(input)?;
        let options_js = to_js(options)?;
        let charge = call2(&pix, "createCharge", &input_js, &options_js, "create pix charge").await?;
        from_js(charge, "pix charge result")
    }
}

/// Widget instance returned by `open` or `embed`
pub struct JsWidgetHandle {
    object: JsValue,
}

impl JsWidgetHandle {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }
}

impl WidgetHandle for JsWidgetHandle {
    fn close(&self) {
        // close is optional on widget instances
        match method(&self.object, "close") {
            Ok(Some(close)) => {
                if let Err(err) = close.call0(&self.object) {
                    warn!(?err, "widget close threw");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "widget close lookup failed"),
        }
    }
}

/// Card element instance returned by `createCard`
pub struct JsCardElementHandle {
    object: JsValue,
}

impl JsCardElementHandle {
    pub fn new(object: JsValue) -> Self {
        Self { object }
    }
}

#[async_trait(?Send)]
impl CardElementHandle for JsCardElementHandle {
    async fn payload(&self) -> CheckoutResult<Value> {
        let Some(get_payload) = method(&self.object, "getPayload")? else {
            return Err(CheckoutError::provider("card payload: getPayload is not a function"));
        };
        let returned = get_payload
            .call0(&self.object)
            .map_err(|err| provider_error("card payload", err))?;
        let payload = settled(returned, "card payload").await?;
        from_js(payload, "card payload")
    }

    async fn validate(&self) -> CheckoutResult<Value> {
        let Some(validate) = method(&self.object, "validate")? else {
            return Err(CheckoutError::provider("card validation: validate is not a function"));
        };
        let returned = validate
            .call0(&self.object)
            .map_err(|err| provider_error("card validation", err))?;
        let verdict = settled(returned, "card validation").await?;
        from_js(verdict, "card validation")
    }
}
