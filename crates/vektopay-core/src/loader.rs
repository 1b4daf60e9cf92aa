//! # Single-Flight Script Loader
//!
//! Loads the external widget bundle at most once per normalized script
//! URL. Every caller receives a clone of one shared future, so concurrent
//! loads during the in-flight window join the same operation and observe
//! the same settlement. Entries live for the process lifetime; a settled
//! failure keeps replaying until the host explicitly calls
//! [`ScriptLoader::forget`].

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, instrument, warn};

use crate::environment::SharedEnvironment;
use crate::error::CheckoutResult;
use crate::options::ScriptOptions;

/// File name of the widget bundle, resolved under the API base
pub const CHECKOUT_SCRIPT: &str = "checkout.js";

/// One script load, shared by every caller for its URL
pub type SharedLoad = Shared<LocalBoxFuture<'static, CheckoutResult<()>>>;

/// Strip at most one trailing slash from a base URL. Absent bases
/// normalize to the empty string (same-origin serving).
pub fn normalize_base(base: Option<&str>) -> String {
    let base = base.unwrap_or("");
    base.strip_suffix('/').unwrap_or(base).to_string()
}

/// Absolute URL of the widget bundle under `base`
pub fn script_url(base: Option<&str>) -> String {
    format!("{}/{}", normalize_base(base), CHECKOUT_SCRIPT)
}

/// Lazy, idempotent loader for the widget bundle.
///
/// Holds the per-URL cache of shared load futures. Injected into
/// [`crate::client::CheckoutClient`] rather than living in a hidden
/// global, so tests can drive it against a mock environment.
pub struct ScriptLoader {
    env: SharedEnvironment,
    cache: RefCell<HashMap<String, SharedLoad>>,
}

impl ScriptLoader {
    /// Create a loader over the given environment
    pub fn new(env: SharedEnvironment) -> Self {
        Self {
            env,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The shared load for these options.
    ///
    /// The future is registered in the cache before it is first polled,
    /// so callers arriving during the in-flight window share the same
    /// load instead of starting a second one.
    pub fn load(&self, options: &ScriptOptions) -> SharedLoad {
        let url = script_url(options.api_base.as_deref());

        let cached = self.cache.borrow().get(&url).cloned();
        if let Some(shared) = cached {
            debug!(%url, "script load cache hit");
            return shared;
        }

        debug!(%url, "registering script load");
        let shared = load_once(Rc::clone(&self.env), url.clone())
            .boxed_local()
            .shared();
        self.cache.borrow_mut().insert(url, shared.clone());
        shared
    }

    /// Whether a load (in flight or settled) is cached for these options
    pub fn is_cached(&self, options: &ScriptOptions) -> bool {
        let url = script_url(options.api_base.as_deref());
        self.cache.borrow().contains_key(&url)
    }

    /// Evict the cached load for these options so the next [`Self::load`]
    /// starts over. This is the host-driven recovery path for a failed
    /// load; nothing in this crate calls it implicitly.
    pub fn forget(&self, options: &ScriptOptions) -> bool {
        let url = script_url(options.api_base.as_deref());
        let evicted = self.cache.borrow_mut().remove(&url).is_some();
        if evicted {
            debug!(%url, "evicted cached script load");
        }
        evicted
    }
}

/// The actual load procedure, run once per cached URL.
///
/// Short-circuits, in order: no browsing context, namespaces already
/// installed (pre-bundled integration), script tag already present
/// (earlier mount or host-managed tag). Only then injects.
#[instrument(skip(env))]
async fn load_once(env: SharedEnvironment, url: String) -> CheckoutResult<()> {
    if !env.is_browser() {
        debug!("no browsing context, skipping script load");
        return Ok(());
    }

    if env.checkout().is_some() && env.elements().is_some() {
        debug!("namespaces already installed, skipping injection");
        return Ok(());
    }

    if env.has_script_tag(&url) {
        debug!("script tag already present, skipping injection");
        return Ok(());
    }

    debug!("injecting checkout script");
    match env.inject_script(&url).await {
        Ok(()) => {
            debug!("checkout script loaded");
            Ok(())
        }
        Err(err) => {
            warn!(error = %err, "checkout script failed to load");
            Err(err)
        }
    }
}
