//! # Checkout Components
//!
//! Leptos surfaces over [`crate::api::checkout_client`]: an embedded
//! checkout, a checkout trigger button, and a hosted card element. The
//! embedded surfaces render a container `<div>` with a generated id,
//! kick off the mount work in an effect, and retire the run through a
//! drop guard when props change or the component unmounts.

use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

use vektopay_core::{
    CancelToken, CardElementOptions, CheckoutError, CheckoutOptions, SharedCardElementHandle,
    SharedWidgetHandle,
};

use crate::api::checkout_client;

/// DOM id for one surface instance, unique across repeated mounts and
/// multiple widgets on a page
fn next_mount_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Retires one mount run when dropped: cancels the run's token and, for
/// surfaces that own a closable widget, closes the retained handle.
///
/// Stored in the component's arena so unmount drops it; replacing it in
/// its slot retires the previous run when reactive props change.
struct MountGuard {
    cancel: CancelToken,
    widget: Option<Rc<RefCell<Option<SharedWidgetHandle>>>>,
}

impl MountGuard {
    /// Guard that closes the retained widget on teardown
    fn closing(cancel: CancelToken, widget: Rc<RefCell<Option<SharedWidgetHandle>>>) -> Self {
        Self {
            cancel,
            widget: Some(widget),
        }
    }

    /// Guard that only cancels; card elements have no teardown call
    fn cancel_only(cancel: CancelToken) -> Self {
        Self {
            cancel,
            widget: None,
        }
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(widget) = &self.widget {
            if let Some(handle) = widget.borrow_mut().take() {
                handle.close();
            }
        }
    }
}

/// Checkout embedded into a host-owned container.
///
/// Loads the widget bundle on mount, embeds the checkout into the
/// rendered `<div>`, and closes the widget instance again when the
/// component unmounts. Changing `token` or `api_base` retires the
/// current widget and embeds a fresh one.
#[component]
pub fn EmbeddedCheckout(
    /// Checkout session token
    #[prop(into)]
    token: Signal<String>,
    /// API base the widget bundle is served from
    #[prop(optional, into)]
    api_base: MaybeProp<String>,
    /// Extra classes for the container element
    #[prop(optional, into)]
    class: MaybeProp<String>,
    /// Inline style for the container element
    #[prop(optional, into)]
    style: MaybeProp<String>,
    /// Called with the widget handle once embedding succeeds
    #[prop(optional)]
    on_ready: Option<Callback<SharedWidgetHandle>>,
    /// Called when loading or embedding fails while still mounted
    #[prop(optional)]
    on_error: Option<Callback<CheckoutError>>,
) -> impl IntoView {
    let mount_id = next_mount_id("vekto-embed");
    let run: StoredValue<Option<MountGuard>, LocalStorage> = StoredValue::new_local(None);

    Effect::new({
        let mount_id = mount_id.clone();
        move |_| {
            let session_token = token.get();
            let base = api_base.get();

            let cancel = CancelToken::new();
            let widget = Rc::new(RefCell::new(None));
            // replacing the previous guard retires that run
            run.set_value(Some(MountGuard::closing(cancel.clone(), Rc::clone(&widget))));

            let mount_id = mount_id.clone();
            leptos::task::spawn_local(async move {
                let mut options = CheckoutOptions::new(session_token);
                if let Some(base) = base {
                    options = options.with_api_base(base);
                }

                match checkout_client()
                    .embed_checkout(&options, &mount_id, &cancel)
                    .await
                {
                    Ok(Some(handle)) => {
                        *widget.borrow_mut() = Some(Rc::clone(&handle));
                        if let Some(on_ready) = on_ready {
                            on_ready.run(handle);
                        }
                    }
                    Ok(None) => {}
                    Err(err) => match on_error {
                        Some(on_error) => on_error.run(err),
                        None => debug!(error = %err, "embedded checkout failed, no error handler"),
                    },
                }
            });
        }
    });

    view! {
        <div id=mount_id class=move || class.get().unwrap_or_default() style=move || style.get().unwrap_or_default()></div>
    }
}

/// Button that opens the hosted checkout in the provider's own flow.
///
/// The click continuation has no unmount suppression: a checkout opened
/// from a button that has since left the page still calls back.
#[component]
pub fn CheckoutButton(
    /// Checkout session token
    #[prop(into)]
    token: Signal<String>,
    /// API base the widget bundle is served from
    #[prop(optional, into)]
    api_base: MaybeProp<String>,
    /// Extra classes for the button element
    #[prop(optional, into)]
    class: MaybeProp<String>,
    /// Inline style for the button element
    #[prop(optional, into)]
    style: MaybeProp<String>,
    /// Called with the widget handle once the checkout opens
    #[prop(optional)]
    on_ready: Option<Callback<SharedWidgetHandle>>,
    /// Called when loading or opening fails
    #[prop(optional)]
    on_error: Option<Callback<CheckoutError>>,
    /// Button label; defaults to "Open Checkout"
    #[prop(optional)]
    children: Option<Children>,
) -> impl IntoView {
    let widget: StoredValue<Option<SharedWidgetHandle>, LocalStorage> =
        StoredValue::new_local(None);

    let open = move |_| {
        let session_token = token.get();
        let base = api_base.get();

        leptos::task::spawn_local(async move {
            let mut options = CheckoutOptions::new(session_token);
            if let Some(base) = base {
                options = options.with_api_base(base);
            }

            match checkout_client().open_checkout(&options).await {
                Ok(handle) => {
                    widget.try_set_value(Some(Rc::clone(&handle)));
                    if let Some(on_ready) = on_ready {
                        on_ready.run(handle);
                    }
                }
                Err(err) => match on_error {
                    Some(on_error) => on_error.run(err),
                    None => debug!(error = %err, "checkout open failed, no error handler"),
                },
            }
        });
    };

    view! {
        <button
            type="button"
            class=move || class.get().unwrap_or_default()
            style=move || style.get().unwrap_or_default()
            on:click=open
        >
            {match children {
                Some(children) => children().into_any(),
                None => "Open Checkout".into_any(),
            }}
        </button>
    }
}

/// Hosted card element mounted into a host-owned container.
///
/// Unmounting cancels an in-flight mount; a card element that finished
/// mounting is simply left to the page (the bundle exposes no teardown
/// for it).
#[component]
pub fn CardElement(
    /// API base the widget bundle is served from
    #[prop(optional, into)]
    api_base: MaybeProp<String>,
    /// Extra classes for the container element
    #[prop(optional, into)]
    class: MaybeProp<String>,
    /// Inline style for the container element
    #[prop(optional, into)]
    style: MaybeProp<String>,
    /// Called with the element handle once mounting succeeds
    #[prop(optional)]
    on_ready: Option<Callback<SharedCardElementHandle>>,
    /// Called when loading or mounting fails while still mounted
    #[prop(optional)]
    on_error: Option<Callback<CheckoutError>>,
) -> impl IntoView {
    let mount_id = next_mount_id("vekto-card");
    let run: StoredValue<Option<MountGuard>, LocalStorage> = StoredValue::new_local(None);

    Effect::new({
        let mount_id = mount_id.clone();
        move |_| {
            let base = api_base.get();

            let cancel = CancelToken::new();
            // replacing the previous guard cancels that run
            run.set_value(Some(MountGuard::cancel_only(cancel.clone())));

            let mount_id = mount_id.clone();
            leptos::task::spawn_local(async move {
                let mut options = CardElementOptions::default();
                if let Some(base) = base {
                    options = options.with_api_base(base);
                }

                match checkout_client()
                    .create_card_element(&options, &mount_id, &cancel)
                    .await
                {
                    Ok(Some(handle)) => {
                        if let Some(on_ready) = on_ready {
                            on_ready.run(handle);
                        }
                    }
                    Ok(None) => {}
                    Err(err) => match on_error {
                        Some(on_error) => on_error.run(err),
                        None => debug!(error = %err, "card element failed, no error handler"),
                    },
                }
            });
        }
    });

    view! {
        <div id=mount_id class=move || class.get().unwrap_or_default() style=move || style.get().unwrap_or_default()></div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vektopay_core::mock::MockWidgetHandle;

    #[test]
    fn test_mount_ids_are_prefixed_and_unique() {
        let a = next_mount_id("vekto-embed");
        let b = next_mount_id("vekto-embed");

        assert!(a.starts_with("vekto-embed-"));
        assert!(b.starts_with("vekto-embed-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_closing_guard_cancels_and_closes_on_drop() {
        let cancel = CancelToken::new();
        let widget = Rc::new(RefCell::new(None));
        let handle = Rc::new(MockWidgetHandle::default());
        let shared: SharedWidgetHandle = handle.clone();
        *widget.borrow_mut() = Some(shared);

        drop(MountGuard::closing(cancel.clone(), Rc::clone(&widget)));

        assert!(cancel.is_cancelled());
        assert_eq!(handle.close_count(), 1);
        assert!(widget.borrow().is_none());
    }

    #[test]
    fn test_closing_guard_without_widget_only_cancels() {
        let cancel = CancelToken::new();
        let widget = Rc::new(RefCell::new(None));

        drop(MountGuard::closing(cancel.clone(), widget));

        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancel_only_guard_just_cancels() {
        let cancel = CancelToken::new();

        drop(MountGuard::cancel_only(cancel.clone()));

        assert!(cancel.is_cancelled());
    }
}
