//! # Cart Settings
//!
//! Tunables loaded from `config/cart.toml`. Every section is optional and
//! falls back to the built-in defaults.

use crate::checkout::CheckoutSettings;
use crate::error::{CartError, CartResult};
use crate::pricing::DiscountPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    #[serde(default)]
    pub discount: DiscountPolicy,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl CartSettings {
    /// Parse and validate settings from a TOML string
    pub fn from_toml(toml_str: &str) -> CartResult<Self> {
        let settings: CartSettings =
            toml::from_str(toml_str).map_err(|e| CartError::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CartResult<()> {
        self.discount.validate()?;
        self.checkout.validate()
    }
}
