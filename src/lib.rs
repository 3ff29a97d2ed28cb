//! # Storefront
//! Storefront is the client-side state engine of a static shop: a persisted cart, a
//! selection-driven order summary, a checkout modal and the small pieces of UI glue around them.
//!
//! ## Example: Cart page
//! ```rust
//! use std::rc::Rc;
//!
//! use storefront::prelude::*;
//!
//! let config = StorefrontConfig::default();
//! let storage = MemoryStorage::new();
//! let store = CartStore::from_config(storage, &config);
//! let mut page = CartController::new(store, &config, Rc::new(ManualClock::new()), Notifier::new());
//!
//! page.handle(CartEvent::ToggleSelected { id: ProductId(1) });
//! assert_eq!(page.view().summary.total, "$225.00");
//! assert_eq!(page.view().checkout.label, "Checkout (1 items)");
//! ```
//!
//! ## State
//!
//! The cart lives in a [`KeyValueStore`](storage::KeyValueStore) under a single key, as a JSON
//! array of line items. Nothing caches it: every [`CartStore`](cart::CartStore) operation reads,
//! modifies and writes back, so two pages sharing the same storage never drift apart.
//!
//! The selection is page-local and never persisted. It decides what the order summary totals and
//! what checkout removes.
//!
//! ## Views
//!
//! [`binder::render`] projects a cart and a selection into a [`CartView`](binder::CartView): rows,
//! whole-cart totals, the summary box and the checkout button, all pre-formatted. The view is
//! plain data; a front end copies it into widgets and feeds user input back as
//! [`CartEvent`](controller::CartEvent)s.
//!
//! ## Time
//!
//! Hold-to-repeat and the checkout processing delay run on a [`Scheduler`](action::Scheduler)
//! backed by a [`Clock`](action::Clock). Hosts drive it by calling
//! [`CartController::tick`](controller::CartController::tick) once
//! [`next_deadline`](controller::CartController::next_deadline) has passed; tests use a
//! [`ManualClock`](action::ManualClock) and advance it explicitly.
//!
//! ## Across pages
//!
//! A [`Notifier`](notifier::Notifier) carries cart-change messages inside a page. Storage writes
//! made by other pages arrive as storage events and are relayed on the same notifier, which is
//! what keeps the header [`Badge`](badge::Badge) current everywhere.

pub mod action;
pub mod badge;
pub mod binder;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod controller;
pub mod error;
pub mod hold_repeat;
pub mod money;
pub mod notifier;
pub mod selection;
pub mod storage;

pub use binder::render;
pub use cart::{Cart, CartStore, LineItem, ProductId, Quantity};
pub use config::StorefrontConfig;
pub use controller::{CartController, CartEvent};
pub use error::{CartError, ConfigError, StorageError};

pub mod prelude {
    pub use crate::action::{Clock, ManualClock, SystemClock};
    pub use crate::badge::{Badge, BadgeHost, BadgeView};
    pub use crate::binder::{CartView, Pricing};
    pub use crate::cart::{Cart, CartStore, LineItem, ProductId, Quantity};
    pub use crate::catalog::{Catalog, CatalogQuery, Product, SortOrder};
    pub use crate::checkout::{Dismiss, ModalView};
    pub use crate::config::StorefrontConfig;
    pub use crate::controller::{CartController, CartEvent};
    pub use crate::hold_repeat::StepDirection;
    pub use crate::notifier::{CartMessage, Notifier};
    pub use crate::selection::{ActivationKey, RowActivation, TargetKind};
    pub use crate::storage::{FileStorage, KeyValueStore, MemoryStorage};
}
