//! # Checkout Option Types
//!
//! Plain configuration value objects forwarded to the external script
//! unchanged. No validation or mutation happens here: the hosted widget
//! owns the semantics of every field.
//!
//! Wire format note: the loaded script reads camelCase keys (`apiBase`),
//! so these types serialize with `rename_all = "camelCase"`.

use serde::{Deserialize, Serialize};

/// Options for loading the external script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOptions {
    /// API base the script is served from (e.g. "https://pay.example.com").
    /// Empty or absent means same-origin (`/checkout.js`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ScriptOptions {
    /// Options for a same-origin script
    pub fn same_origin() -> Self {
        Self::default()
    }

    /// Options for a script served from the given base
    pub fn for_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: Some(api_base.into()),
        }
    }
}

/// Options for opening or embedding a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    /// Checkout session token issued by the merchant backend
    pub token: String,

    /// API base the widget talks to (and the script is served from)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl CheckoutOptions {
    /// Create options for the given session token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: None,
        }
    }

    /// Builder: set the API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// The script options implied by these checkout options
    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            api_base: self.api_base.clone(),
        }
    }
}

/// Options for embedding a checkout into a host-page element.
///
/// Same shape as [`CheckoutOptions`] plus the `mount` CSS selector of the
/// element the widget renders into (`{token, apiBase, mount}` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    #[serde(flatten)]
    pub checkout: CheckoutOptions,

    /// CSS selector of the mount element (e.g. "#vekto-embed-1f3a")
    pub mount: String,
}

impl EmbedOptions {
    /// Embed options targeting an element by its DOM id
    pub fn for_mount_id(checkout: CheckoutOptions, mount_id: &str) -> Self {
        Self {
            checkout,
            mount: format!("#{mount_id}"),
        }
    }
}
