//! # Script Environment
//!
//! Everything the loader and client need from the host page, behind one
//! trait: browsing-context detection, script-tag queries, script
//! injection, and lookup of the two installed namespace objects. The
//! browser crate implements this over `web-sys`; tests and server-side
//! rendering use [`DetachedEnvironment`] or [`crate::mock::MockEnvironment`].

use async_trait::async_trait;
use std::rc::Rc;

use crate::error::{CheckoutError, CheckoutResult};
use crate::namespace::{SharedCheckoutNamespace, SharedElementsNamespace};

/// Host-page capabilities required by the loader and client
#[async_trait(?Send)]
pub trait ScriptEnvironment {
    /// Whether a browsing context (window and document) is available
    fn is_browser(&self) -> bool;

    /// Whether a script tag with exactly this `src` is already present
    fn has_script_tag(&self, src: &str) -> bool;

    /// Inject an async script tag for `src` and resolve once it loads
    async fn inject_script(&self, src: &str) -> CheckoutResult<()>;

    /// The installed checkout namespace, if any
    fn checkout(&self) -> Option<SharedCheckoutNamespace>;

    /// The installed elements namespace, if any
    fn elements(&self) -> Option<SharedElementsNamespace>;
}

/// Shared environment, single-threaded
pub type SharedEnvironment = Rc<dyn ScriptEnvironment>;

/// Environment for execution outside a browsing context.
///
/// Server-side rendering and native test binaries run with no window;
/// every query answers "nothing here" and injection refuses outright.
/// The loader turns that into a silent no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedEnvironment;

impl DetachedEnvironment {
    /// Create a detached environment
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ScriptEnvironment for DetachedEnvironment {
    fn is_browser(&self) -> bool {
        false
    }

    fn has_script_tag(&self, _src: &str) -> bool {
        false
    }

    async fn inject_script(&self, _src: &str) -> CheckoutResult<()> {
        Err(CheckoutError::script_load("no browsing context"))
    }

    fn checkout(&self) -> Option<SharedCheckoutNamespace> {
        None
    }

    fn elements(&self) -> Option<SharedElementsNamespace> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_answers_nothing() {
        let env = DetachedEnvironment::new();

        assert!(!env.is_browser());
        assert!(!env.has_script_tag("https://pay.example.com/checkout.js"));
        assert!(env.checkout().is_none());
        assert!(env.elements().is_none());
    }

    #[tokio::test]
    async fn test_detached_refuses_injection() {
        let env = DetachedEnvironment::new();

        let err = env
            .inject_script("https://pay.example.com/checkout.js")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "checkout_script_load_failed");
    }
}
