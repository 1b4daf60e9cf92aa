//! # Browser Environment
//!
//! [`ScriptEnvironment`] over the real page: script-tag queries and
//! async script injection through `web-sys`, namespace lookup through
//! `js_sys::Reflect` on `window`.

use async_trait::async_trait;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlScriptElement};

use vektopay_core::{
    CheckoutError, CheckoutResult, ScriptEnvironment, SharedCheckoutNamespace,
    SharedElementsNamespace, CHECKOUT_GLOBAL, ELEMENTS_GLOBAL,
};

use crate::bindings::{JsCheckoutNamespace, JsElementsNamespace};

fn document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

/// A non-nullish global looked up on `window`
fn page_global(name: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Keeps the tag's load handlers alive and detaches them on drop.
///
/// The injection future can be dropped mid-flight once its cache entry is
/// evicted and every waiter is gone; the handlers have to come off the
/// tag before the closures die, or a late load event would hit a freed
/// closure.
struct HandlerGuard {
    script: HtmlScriptElement,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        self.script.set_onload(None);
        self.script.set_onerror(None);
    }
}

/// The live page the components run in
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserEnvironment;

impl BrowserEnvironment {
    /// Create an environment over the current page
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ScriptEnvironment for BrowserEnvironment {
    fn is_browser(&self) -> bool {
        document().is_some()
    }

    fn has_script_tag(&self, src: &str) -> bool {
        let Some(document) = document() else {
            return false;
        };
        let selector = format!("script[src=\"{src}\"]");
        matches!(document.query_selector(&selector), Ok(Some(_)))
    }

    async fn inject_script(&self, src: &str) -> CheckoutResult<()> {
        let document = document().ok_or_else(|| CheckoutError::script_load("no document"))?;

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|_| CheckoutError::script_load("could not create script element"))?
            .dyn_into()
            .map_err(|_| CheckoutError::script_load("script element has unexpected type"))?;
        script.set_src(src);
        script
            .set_attribute("async", "")
            .map_err(|_| CheckoutError::script_load("could not mark script async"))?;

        // onload/onerror race for one sender; whichever fires first settles
        let sender = Rc::new(RefCell::new(None));
        let (tx, rx) = oneshot::channel::<CheckoutResult<()>>();
        *sender.borrow_mut() = Some(tx);

        let on_load = {
            let sender = Rc::clone(&sender);
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = sender.borrow_mut().take() {
                    let _ = tx.send(Ok(()));
                }
            })
        };
        let on_error = {
            let sender = Rc::clone(&sender);
            let src = src.to_string();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = sender.borrow_mut().take() {
                    let _ = tx.send(Err(CheckoutError::script_load(format!(
                        "failed to load {src}"
                    ))));
                }
            })
        };
        script.set_onload(Some(on_load.as_ref().unchecked_ref()));
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        let _handlers = HandlerGuard {
            script: script.clone(),
            _on_load: on_load,
            _on_error: on_error,
        };

        let head = document
            .head()
            .ok_or_else(|| CheckoutError::script_load("document has no head"))?;
        head.append_child(&script)
            .map_err(|_| CheckoutError::script_load("could not append script tag"))?;
        debug!(%src, "checkout script tag appended");

        rx.await
            .map_err(|_| CheckoutError::script_load("script load interrupted"))?
    }

    fn checkout(&self) -> Option<SharedCheckoutNamespace> {
        let object = page_global(CHECKOUT_GLOBAL)?;
        let ns: SharedCheckoutNamespace = Rc::new(JsCheckoutNamespace::new(object));
        Some(ns)
    }

    fn elements(&self) -> Option<SharedElementsNamespace> {
        let object = page_global(ELEMENTS_GLOBAL)?;
        let ns: SharedElementsNamespace = Rc::new(JsElementsNamespace::new(object));
        Some(ns)
    }
}
