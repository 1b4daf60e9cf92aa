//! # Mock Environment
//!
//! Scriptable implementations of the environment and namespace traits
//! for testing and demo purposes. The environment records every
//! injection attempt, can park injections behind a gate the test
//! releases, and installs (or withholds) the two namespace mocks the way
//! a real script load would. The namespace mocks record their calls and
//! hand out counting handles.

use async_trait::async_trait;
use futures::channel::oneshot;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::card::{CardElementOptions, CardInput, TokenizeOptions, TokenizeOutcome};
use crate::environment::ScriptEnvironment;
use crate::error::{CheckoutError, CheckoutResult};
use crate::namespace::{
    CardElementHandle, CheckoutNamespace, ElementsNamespace, SharedCardElementHandle,
    SharedCheckoutNamespace, SharedElementsNamespace, SharedWidgetHandle, WidgetHandle,
};
use crate::options::{CheckoutOptions, EmbedOptions};
use crate::pix::{PixChargeInput, PixOptions};

/// Parks calls until the test releases them
#[derive(Default)]
struct CallGate {
    holding: Cell<bool>,
    parked: RefCell<Vec<oneshot::Sender<()>>>,
}

impl CallGate {
    fn hold(&self) {
        self.holding.set(true);
    }

    fn parked_count(&self) -> usize {
        self.parked.borrow().len()
    }

    fn release_all(&self) -> usize {
        let parked: Vec<_> = self.parked.borrow_mut().drain(..).collect();
        let released = parked.len();
        for gate in parked {
            let _ = gate.send(());
        }
        released
    }

    async fn pass(&self) {
        if !self.holding.get() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        self.parked.borrow_mut().push(tx);
        let _ = rx.await;
    }
}

/// Widget handle that counts its close calls
#[derive(Debug, Default)]
pub struct MockWidgetHandle {
    closes: Cell<usize>,
}

impl MockWidgetHandle {
    /// How many times the handle has been closed
    pub fn close_count(&self) -> usize {
        self.closes.get()
    }
}

impl WidgetHandle for MockWidgetHandle {
    fn close(&self) {
        self.closes.set(self.closes.get() + 1);
    }
}

/// Card element handle returning configurable payload and validation values
#[derive(Debug, Default)]
pub struct MockCardElementHandle {
    payload: RefCell<Value>,
    validation: RefCell<Value>,
}

impl MockCardElementHandle {
    /// Set the value the next `payload` call returns
    pub fn set_payload(&self, value: Value) {
        *self.payload.borrow_mut() = value;
    }

    /// Set the value the next `validate` call returns
    pub fn set_validation(&self, value: Value) {
        *self.validation.borrow_mut() = value;
    }
}

#[async_trait(?Send)]
impl CardElementHandle for MockCardElementHandle {
    async fn payload(&self) -> CheckoutResult<Value> {
        Ok(self.payload.borrow().clone())
    }

    async fn validate(&self) -> CheckoutResult<Value> {
        Ok(self.validation.borrow().clone())
    }
}

/// Checkout namespace mock recording opens and embeds
#[derive(Default)]
pub struct MockCheckoutNamespace {
    opens: RefCell<Vec<CheckoutOptions>>,
    embeds: RefCell<Vec<EmbedOptions>>,
    fail_with: RefCell<Option<CheckoutError>>,
    gate: CallGate,
    handles: RefCell<Vec<Rc<MockWidgetHandle>>>,
}

impl MockCheckoutNamespace {
    /// Make every subsequent call fail with this error
    pub fn set_failure(&self, err: CheckoutError) {
        *self.fail_with.borrow_mut() = Some(err);
    }

    /// Park subsequent calls until [`Self::release_calls`]
    pub fn hold_calls(&self) {
        self.gate.hold();
    }

    /// Calls currently parked behind the gate
    pub fn held_count(&self) -> usize {
        self.gate.parked_count()
    }

    /// Release every parked call, returning how many there were
    pub fn release_calls(&self) -> usize {
        self.gate.release_all()
    }

    /// Options from every `open` call so far
    pub fn open_calls(&self) -> Vec<CheckoutOptions> {
        self.opens.borrow().clone()
    }

    /// Options from every `embed` call so far
    pub fn embed_calls(&self) -> Vec<EmbedOptions> {
        self.embeds.borrow().clone()
    }

    /// Every widget handle handed out so far
    pub fn handles(&self) -> Vec<Rc<MockWidgetHandle>> {
        self.handles.borrow().clone()
    }

    fn issue_handle(&self) -> CheckoutResult<SharedWidgetHandle> {
        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        let handle = Rc::new(MockWidgetHandle::default());
        self.handles.borrow_mut().push(Rc::clone(&handle));
        Ok(handle)
    }
}

#[async_trait(?Send)]
impl CheckoutNamespace for MockCheckoutNamespace {
    async fn open(&self, options: &CheckoutOptions) -> CheckoutResult<SharedWidgetHandle> {
        self.opens.borrow_mut().push(options.clone());
        self.gate.pass().await;
        self.issue_handle()
    }

    async fn embed(&self, options: &EmbedOptions) -> CheckoutResult<SharedWidgetHandle> {
        self.embeds.borrow_mut().push(options.clone());
        self.gate.pass().await;
        self.issue_handle()
    }
}

/// Elements namespace mock recording card, tokenize, and Pix calls.
///
/// The optional capabilities start unavailable; enabling one supplies
/// the canned result it returns.
#[derive(Default)]
pub struct MockElementsNamespace {
    card_creates: RefCell<Vec<(String, CardElementOptions)>>,
    tokenize_calls: RefCell<Vec<(CardInput, TokenizeOptions)>>,
    pix_calls: RefCell<Vec<(PixChargeInput, PixOptions)>>,
    tokenize_result: RefCell<Option<TokenizeOutcome>>,
    pix_result: RefCell<Option<Value>>,
    fail_with: RefCell<Option<CheckoutError>>,
    gate: CallGate,
    handles: RefCell<Vec<Rc<MockCardElementHandle>>>,
}

impl MockElementsNamespace {
    /// Expose the tokenize capability, returning this outcome
    pub fn enable_tokenize(&self, outcome: TokenizeOutcome) {
        *self.tokenize_result.borrow_mut() = Some(outcome);
    }

    /// Expose the Pix capability, returning this charge
    pub fn enable_pix(&self, charge: Value) {
        *self.pix_result.borrow_mut() = Some(charge);
    }

    /// Make every subsequent call fail with this error
    pub fn set_failure(&self, err: CheckoutError) {
        *self.fail_with.borrow_mut() = Some(err);
    }

    /// Park subsequent calls until [`Self::release_calls`]
    pub fn hold_calls(&self) {
        self.gate.hold();
    }

    /// Calls currently parked behind the gate
    pub fn held_count(&self) -> usize {
        self.gate.parked_count()
    }

    /// Release every parked call, returning how many there were
    pub fn release_calls(&self) -> usize {
        self.gate.release_all()
    }

    /// `(mount, options)` from every `create_card` call so far
    pub fn card_creates(&self) -> Vec<(String, CardElementOptions)> {
        self.card_creates.borrow().clone()
    }

    /// `(card, options)` from every `tokenize_card` call so far
    pub fn tokenize_calls(&self) -> Vec<(CardInput, TokenizeOptions)> {
        self.tokenize_calls.borrow().clone()
    }

    /// `(input, options)` from every `create_pix_charge` call so far
    pub fn pix_calls(&self) -> Vec<(PixChargeInput, PixOptions)> {
        self.pix_calls.borrow().clone()
    }

    /// Every card element handle handed out so far
    pub fn handles(&self) -> Vec<Rc<MockCardElementHandle>> {
        self.handles.borrow().clone()
    }
}

#[async_trait(?Send)]
impl ElementsNamespace for MockElementsNamespace {
    async fn create_card(
        &self,
        mount: &str,
        options: &CardElementOptions,
    ) -> CheckoutResult<SharedCardElementHandle> {
        self.card_creates
            .borrow_mut()
            .push((mount.to_string(), options.clone()));
        self.gate.pass().await;

        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        let handle = Rc::new(MockCardElementHandle::default());
        self.handles.borrow_mut().push(Rc::clone(&handle));
        Ok(handle)
    }

    fn supports_tokenize(&self) -> bool {
        self.tokenize_result.borrow().is_some()
    }

    async fn tokenize_card(
        &self,
        card: &CardInput,
        options: &TokenizeOptions,
    ) -> CheckoutResult<TokenizeOutcome> {
        self.tokenize_calls
            .borrow_mut()
            .push((card.clone(), options.clone()));
        self.gate.pass().await;

        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        match self.tokenize_result.borrow().clone() {
            Some(outcome) => Ok(outcome),
            None => Err(CheckoutError::TokenizeUnavailable),
        }
    }

    fn supports_pix(&self) -> bool {
        self.pix_result.borrow().is_some()
    }

    async fn create_pix_charge(
        &self,
        input: &PixChargeInput,
        options: &PixOptions,
    ) -> CheckoutResult<Value> {
        self.pix_calls
            .borrow_mut()
            .push((input.clone(), options.clone()));
        self.gate.pass().await;

        if let Some(err) = self.fail_with.borrow().clone() {
            return Err(err);
        }
        match self.pix_result.borrow().clone() {
            Some(charge) => Ok(charge),
            None => Err(CheckoutError::PixUnavailable),
        }
    }
}

/// Scriptable host-page environment.
///
/// Fresh instances model a live browser page before the widget bundle
/// has loaded: injection succeeds immediately and installs both
/// namespace mocks, the way evaluating the real bundle would.
pub struct MockEnvironment {
    browser: Cell<bool>,
    installed: Cell<bool>,
    install_on_load: Cell<bool>,
    script_tags: RefCell<Vec<String>>,
    injections: RefCell<Vec<String>>,
    inject_error: RefCell<Option<CheckoutError>>,
    holding: Cell<bool>,
    held: RefCell<Vec<oneshot::Sender<CheckoutResult<()>>>>,
    checkout_ns: Rc<MockCheckoutNamespace>,
    elements_ns: Rc<MockElementsNamespace>,
}

impl MockEnvironment {
    /// A browser-like environment with nothing installed yet
    pub fn new() -> Self {
        Self {
            browser: Cell::new(true),
            installed: Cell::new(false),
            install_on_load: Cell::new(true),
            script_tags: RefCell::new(Vec::new()),
            injections: RefCell::new(Vec::new()),
            inject_error: RefCell::new(None),
            holding: Cell::new(false),
            held: RefCell::new(Vec::new()),
            checkout_ns: Rc::new(MockCheckoutNamespace::default()),
            elements_ns: Rc::new(MockElementsNamespace::default()),
        }
    }

    /// Builder: pretend to (not) be a browsing context
    pub fn with_browser(self, browser: bool) -> Self {
        self.browser.set(browser);
        self
    }

    /// Builder: namespaces already installed before any load
    pub fn with_preinstalled_namespaces(self) -> Self {
        self.installed.set(true);
        self
    }

    /// Builder: a load that succeeds without installing the namespaces
    pub fn with_no_install_on_load(self) -> Self {
        self.install_on_load.set(false);
        self
    }

    /// Builder: a script tag with this `src` already in the document
    pub fn with_script_tag(self, src: impl Into<String>) -> Self {
        self.script_tags.borrow_mut().push(src.into());
        self
    }

    /// Builder: park injections until [`Self::release_held`]
    pub fn with_held_injections(self) -> Self {
        self.holding.set(true);
        self
    }

    /// Builder: every injection fails with this error
    pub fn with_inject_error(self, err: CheckoutError) -> Self {
        *self.inject_error.borrow_mut() = Some(err);
        self
    }

    /// Change the injection failure at runtime (`None` restores success)
    pub fn set_inject_error(&self, err: Option<CheckoutError>) {
        *self.inject_error.borrow_mut() = err;
    }

    /// Install both namespaces, as a pre-bundled page would
    pub fn install_namespaces(&self) {
        self.installed.set(true);
    }

    /// Every injected script URL, in order of attempt
    pub fn injections(&self) -> Vec<String> {
        self.injections.borrow().clone()
    }

    /// Injections currently parked behind the gate
    pub fn held_count(&self) -> usize {
        self.held.borrow().len()
    }

    /// Settle every parked injection with this result, returning how
    /// many were released
    pub fn release_held(&self, result: CheckoutResult<()>) -> usize {
        let held: Vec<_> = self.held.borrow_mut().drain(..).collect();
        let released = held.len();
        for gate in held {
            let _ = gate.send(result.clone());
        }
        released
    }

    /// The checkout namespace mock, regardless of install state
    pub fn checkout_mock(&self) -> Rc<MockCheckoutNamespace> {
        Rc::clone(&self.checkout_ns)
    }

    /// The elements namespace mock, regardless of install state
    pub fn elements_mock(&self) -> Rc<MockElementsNamespace> {
        Rc::clone(&self.elements_ns)
    }
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ScriptEnvironment for MockEnvironment {
    fn is_browser(&self) -> bool {
        self.browser.get()
    }

    fn has_script_tag(&self, src: &str) -> bool {
        self.script_tags.borrow().iter().any(|tag| tag == src)
    }

    async fn inject_script(&self, src: &str) -> CheckoutResult<()> {
        self.injections.borrow_mut().push(src.to_string());

        if let Some(err) = self.inject_error.borrow().clone() {
            return Err(err);
        }

        if self.holding.get() {
            let (tx, rx) = oneshot::channel();
            self.held.borrow_mut().push(tx);
            rx.await
                .map_err(|_| CheckoutError::script_load("injection gate dropped"))??;
        }

        if self.install_on_load.get() {
            self.installed.set(true);
        }
        Ok(())
    }

    fn checkout(&self) -> Option<SharedCheckoutNamespace> {
        if !self.installed.get() {
            return None;
        }
        let ns: SharedCheckoutNamespace = self.checkout_ns.clone();
        Some(ns)
    }

    fn elements(&self) -> Option<SharedElementsNamespace> {
        if !self.installed.get() {
            return None;
        }
        let ns: SharedElementsNamespace = self.elements_ns.clone();
        Some(ns)
    }
}
