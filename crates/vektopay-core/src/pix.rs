//! # Pix Charge Types
//!
//! Inputs and options for creating a Pix charge through the hosted
//! widget. The charge result is provider-defined and returned as raw
//! JSON; only the inputs get a typed surface here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::ScriptOptions;

/// Input for a Pix charge, forwarded verbatim to the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixChargeInput {
    /// Charge amount in the provider's minor unit (centavos)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,

    /// Provider-specific fields, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PixChargeInput {
    /// Create an input for the given amount in centavos
    pub fn for_amount(amount: i64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

/// Provider selection for a Pix charge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixProviderOptions {
    /// Provider name (e.g. "woovi")
    pub provider: String,

    /// Provider-specific options, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PixProviderOptions {
    /// Select a provider by name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }
}

/// Options for the Pix charge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixOptions {
    /// API base the script is served from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Pix provider selection; absent means the provider default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix: Option<PixProviderOptions>,
}

impl PixOptions {
    /// Builder: set the API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Builder: select a Pix provider by name
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.pix = Some(PixProviderOptions::new(provider));
        self
    }

    /// The script options implied by these Pix options
    pub fn script_options(&self) -> ScriptOptions {
        ScriptOptions {
            api_base: self.api_base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_input_wire_shape() {
        let input = PixChargeInput::for_amount(1000);
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["amount"], 1000);
    }

    #[test]
    fn test_pix_options_provider_selection() {
        let options = PixOptions::default()
            .with_api_base("https://pay.example.com")
            .with_provider("woovi");
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["apiBase"], "https://pay.example.com");
        assert_eq!(json["pix"]["provider"], "woovi");
    }

    #[test]
    fn test_extra_fields_ride_along() {
        let mut input = PixChargeInput::for_amount(2500);
        input
            .extra
            .insert("correlationId".to_string(), Value::from("ord_1139"));
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json["amount"], 2500);
        assert_eq!(json["correlationId"], "ord_1139");
    }
}
