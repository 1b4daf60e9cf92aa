//! # Card Element & Tokenization Types
//!
//! Input, option, and result structures for the card element surface and
//! for direct card tokenization. Everything here is a passthrough: the
//! external script receives the inputs verbatim and its result structure
//! is deserialized without transformation.
//!
//! Tokenization results keep the provider-side snake_case keys
//! (`token_id`, `elapsed_ms`, ...); options serialize camelCase like the
//! rest of the wire surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::options::ScriptOptions;

/// Options for creating a card element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardElementOptions {
    /// API base the element talks to (and the script is served from)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl CardElementOptions {
    /// Builder: set the API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// The script options implied by these element options
    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            api_base: self.api_base.clone(),
        }
    }
}

/// Raw card data handed to the tokenize capability.
///
/// Never inspected or validated by this layer; unknown fields ride along
/// in `extra` so the payload reaches the provider unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    /// Primary account number
    pub number: String,

    /// Cardholder name as printed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,

    /// Expiry month (1-12)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<u8>,

    /// Expiry year (four digits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<u16>,

    /// Card verification value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,

    /// Holder document (CPF/CNPJ for Brazilian providers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    /// Provider-specific fields, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CardInput {
    /// Create an input for the given card number
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }

    /// Builder: set the cardholder name
    pub fn with_holder_name(mut self, name: impl Into<String>) -> Self {
        self.holder_name = Some(name.into());
        self
    }

    /// Builder: set the expiry
    pub fn with_expiry(mut self, month: u8, year: u16) -> Self {
        self.exp_month = Some(month);
        self.exp_year = Some(year);
        self
    }

    /// Builder: set the CVV
    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }
}

/// Options for the tokenize capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeOptions {
    /// API base the script is served from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Providers to tokenize against; absent means the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,

    /// Provider-specific options, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenizeOptions {
    /// Builder: set the API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Builder: select the providers to tokenize against
    pub fn with_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(providers.into_iter().map(Into::into).collect());
        self
    }

    /// The script options implied by these tokenize options
    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            api_base: self.api_base.clone(),
        }
    }
}

/// Per-provider outcome inside a tokenization result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// The provider issued a token
    Success,
    /// The provider rejected the card or errored
    Error,
}

/// A single provider's tokenization result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTokenResult {
    /// Whether this provider issued a token
    pub status: TokenStatus,

    /// Provider-issued token identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,

    /// Token type (e.g. "card", "network_token")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Card fingerprint for deduplication, if the provider computes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_id: Option<String>,

    /// Provider error code (error status only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Human-readable provider error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Opaque provider extras
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ProviderTokenResult {
    /// Whether this provider issued a token
    pub fn is_success(&self) -> bool {
        self.status == TokenStatus::Success
    }
}

/// Masked card echo included in every tokenization result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedCard {
    /// Last four digits of the PAN
    pub last4: String,

    /// Detected card brand (e.g. "visa", "mastercard", "elo")
    pub brand: String,
}

/// Result structure returned by the tokenize capability, unchanged.
///
/// `success` is the provider's own aggregate flag; this layer does not
/// recompute it from the per-provider entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizeOutcome {
    /// Aggregate success flag computed by the provider
    pub success: bool,

    /// Per-provider results keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderTokenResult>,

    /// Opaque provider-level metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_meta: Option<Value>,

    /// Masked card echo
    #[serde(default)]
    pub masked: MaskedCard,

    /// Time the provider spent tokenizing, in milliseconds
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl TokenizeOutcome {
    /// Result for a single provider, if present
    pub fn provider(&self, name: &str) -> Option<&ProviderTokenResult> {
        self.providers.get(name)
    }

    /// Names of the providers that issued a token
    pub fn succeeded_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|(_, result)| result.is_success())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
