//! Storefront configuration.
//!
//! Loaded with `confy`, so it lives in the platform config directory as
//! TOML. A missing file is created with defaults; a broken one is logged
//! and replaced by defaults in memory.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{cart::LineItem, error::ConfigError, money::Currency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldTiming {
    /// Delay before a held +/- control starts repeating.
    pub initial_delay_ms: u64,
    pub repeat_interval_ms: u64,
}

impl HoldTiming {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn repeat_interval(&self) -> Duration {
        // A zero interval would repeat on every tick forever.
        Duration::from_millis(self.repeat_interval_ms.max(1))
    }
}

impl Default for HoldTiming {
    fn default() -> Self {
        Self {
            initial_delay_ms: 400,
            repeat_interval_ms: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastTiming {
    pub visible_ms: u64,
    pub fade_ms: u64,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            visible_ms: 1500,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub cart_key: String,
    pub wishlist_key: String,
    pub shipping: f64,
    pub currency_symbol: String,
    /// Simulated payment processing time; zero completes checkout at once.
    pub checkout_delay_ms: u64,
    pub search_debounce_ms: u64,
    /// Items used when no cart has been persisted yet. Empty disables the
    /// demo seeding.
    pub seed: Vec<LineItem>,
    pub hold: HoldTiming,
    pub toast: ToastTiming,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            cart_key: "prototype_cart_v1".to_string(),
            wishlist_key: "wishlist".to_string(),
            shipping: 25.0,
            currency_symbol: "$".to_string(),
            checkout_delay_ms: 600,
            search_debounce_ms: 180,
            seed: default_seed(),
            hold: HoldTiming::default(),
            toast: ToastTiming::default(),
        }
    }
}

fn default_seed() -> Vec<LineItem> {
    vec![
        LineItem::new(1, "Elegant Wedding Dress", 200.0)
            .with_img("images/wedding dress.jpg")
            .with_meta("Women"),
        LineItem::new(4, "Pretty Ball Gown", 150.0)
            .with_qty(2)
            .with_img("images/Pretty ball gown wedding dresses.jpg")
            .with_meta("Women"),
        LineItem::new(6, "Groom Sherwani", 199.0)
            .with_img("images/Groom Wear For Indian Wedding Indian Wedding Sherwani For Groom.jpg")
            .with_meta("Men"),
    ]
}

impl StorefrontConfig {
    /// Loads `<config dir>/<app_name>/storefront.toml`, falling back to
    /// defaults.
    pub fn load(app_name: &str) -> Self {
        Self::or_default(confy::load(app_name, "storefront").map_err(ConfigError::from))
    }

    pub fn load_path(path: impl AsRef<Path>) -> Self {
        Self::or_default(confy::load_path(path).map_err(ConfigError::from))
    }

    pub fn try_load_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    pub fn store_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        Ok(confy::store_path(path, self)?)
    }

    fn or_default(result: Result<Self, ConfigError>) -> Self {
        result.unwrap_or_else(|err| {
            warn!(error = %err, "using default storefront config");
            Self::default()
        })
    }

    pub fn currency(&self) -> Currency {
        Currency::new(self.currency_symbol.clone())
    }

    pub fn checkout_delay(&self) -> Duration {
        Duration::from_millis(self.checkout_delay_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
