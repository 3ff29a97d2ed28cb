//! Testing utilities for storefront pages.
//!
//! This crate simulates several browser tabs sharing one storage area and
//! one manually driven clock, so cross-tab and timer behavior can be tested
//! without a browser.
//!
//! # Example
//!
//! ```rust
//! use storefront_test::prelude::*;
//!
//! let harness = TestHarness::new();
//! let mut cart = harness.open_cart_tab();
//! let mut other = harness.open_cart_tab();
//!
//! cart.handle(CartEvent::Remove { id: ProductId(1) });
//! other.sync();
//!
//! assert_eq!(other.badge_text(), "3");
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;

use storefront::action::{Clock, ManualClock};
use storefront::badge::{Badge, BadgeClasses, BadgeHost, BadgeView};
use storefront::cart::CartStore;
use storefront::catalog::{Catalog, Product, sample_products};
use storefront::config::StorefrontConfig;
use storefront::controller::{CartController, CartEvent};
use storefront::notifier::Notifier;
use storefront::storage::{KeyValueStore, MemoryStorage};

/// Prelude module for convenient imports in tests.
pub mod prelude {
    pub use super::{CartTab, CatalogTab, RecordingBadgeHost, TestHarness, init_tracing};
    pub use storefront::prelude::*;
}

/// Installs a test-friendly `tracing` subscriber once per process.
///
/// Output is captured by the test runner; set `RUST_LOG` to see it.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One storage area and one clock shared by every tab it opens.
pub struct TestHarness {
    storage: MemoryStorage,
    clock: ManualClock,
    config: StorefrontConfig,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::default())
    }

    pub fn with_config(config: StorefrontConfig) -> Self {
        init_tracing();
        Self {
            storage: MemoryStorage::new(),
            clock: ManualClock::new(),
            config,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// A context of the shared storage that belongs to no tab, for poking
    /// at the raw values.
    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Raw value stored under the cart key.
    pub fn raw_cart(&self) -> Option<String> {
        self.storage.get_item(&self.config.cart_key).ok().flatten()
    }

    fn clock_handle(&self) -> Rc<dyn Clock> {
        Rc::new(self.clock.clone())
    }

    /// Opens the cart page in a new tab. The page loads, persists and renders
    /// immediately, like a page load.
    pub fn open_cart_tab(&self) -> CartTab {
        let storage = Rc::new(self.storage.open_context());
        let notifier = Notifier::new();
        let host = RecordingBadgeHost::new();
        let badge = Rc::new(RefCell::new(
            Badge::new(storage.clone(), self.config.cart_key.clone()).with_host(host.clone()),
        ));
        Badge::connect(&badge, &notifier);
        badge.borrow_mut().render();

        let store = CartStore::from_config(storage, &self.config);
        let controller =
            CartController::new(store, &self.config, self.clock_handle(), notifier.clone());
        CartTab {
            controller,
            badge,
            host,
            notifier,
            clock: self.clock.clone(),
        }
    }

    /// Opens the catalog page with the sample products.
    pub fn open_catalog_tab(&self) -> CatalogTab {
        self.open_catalog_tab_with(sample_products())
    }

    pub fn open_catalog_tab_with(&self, products: Vec<Product>) -> CatalogTab {
        let storage = Rc::new(self.storage.open_context());
        let notifier = Notifier::new();
        let host = RecordingBadgeHost::new();
        let badge = Rc::new(RefCell::new(
            Badge::new(storage.clone(), self.config.cart_key.clone()).with_host(host.clone()),
        ));
        Badge::connect(&badge, &notifier);
        badge.borrow_mut().render();

        let catalog = Catalog::new(
            storage.clone(),
            &self.config,
            products,
            self.clock_handle(),
            notifier.clone(),
        );
        CatalogTab {
            catalog,
            storage,
            badge,
            host,
            notifier,
            clock: self.clock.clone(),
        }
    }
}

type TabStorage = Rc<MemoryStorage>;

/// A cart page with its navbar badge.
pub struct CartTab {
    pub controller: CartController<TabStorage>,
    pub badge: Rc<RefCell<Badge<TabStorage>>>,
    pub host: RecordingBadgeHost,
    pub notifier: Notifier,
    clock: ManualClock,
}

impl CartTab {
    pub fn handle(&mut self, event: CartEvent) {
        self.controller.handle(event);
    }

    /// Delivers storage notifications written by other tabs.
    pub fn sync(&mut self) {
        self.controller.sync_storage();
    }

    /// Moves the shared clock forward by `by`, firing each due timer at its
    /// own deadline.
    pub fn advance(&mut self, by: Duration) {
        let end = self.clock.elapsed() + by;
        while let Some(deadline) = self.controller.next_deadline() {
            let now = self.clock.now();
            let step = deadline.saturating_duration_since(now);
            if self.clock.elapsed() + step > end {
                break;
            }
            self.clock.advance(step);
            self.controller.tick();
        }
        let rest = end.saturating_sub(self.clock.elapsed());
        self.clock.advance(rest);
    }

    pub fn badge_text(&self) -> String {
        self.host.text()
    }
}

/// A catalog page with its navbar badge.
pub struct CatalogTab {
    pub catalog: Catalog<TabStorage>,
    pub storage: TabStorage,
    pub badge: Rc<RefCell<Badge<TabStorage>>>,
    pub host: RecordingBadgeHost,
    pub notifier: Notifier,
    clock: ManualClock,
}

impl CatalogTab {
    /// Delivers storage notifications written by other tabs.
    pub fn sync(&mut self) {
        self.notifier.forward_storage_events(&self.storage);
    }

    pub fn advance(&mut self, by: Duration) {
        let end = self.clock.elapsed() + by;
        while let Some(deadline) = self.catalog.next_deadline() {
            let step = deadline.saturating_duration_since(self.clock.now());
            if self.clock.elapsed() + step > end {
                break;
            }
            self.clock.advance(step);
            self.catalog.tick();
        }
        let rest = end.saturating_sub(self.clock.elapsed());
        self.clock.advance(rest);
    }

    pub fn badge_text(&self) -> String {
        self.host.text()
    }
}

/// Badge host that remembers every view applied to it.
#[derive(Clone, Default)]
pub struct RecordingBadgeHost {
    views: Rc<RefCell<Vec<BadgeView>>>,
}

impl RecordingBadgeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<BadgeView> {
        self.views.borrow().clone()
    }

    pub fn last(&self) -> Option<BadgeView> {
        self.views.borrow().last().cloned()
    }

    /// Text of the latest view, empty before the first render.
    pub fn text(&self) -> String {
        self.last().map(|view| view.text).unwrap_or_default()
    }

    pub fn is_shown(&self) -> bool {
        self.last()
            .is_some_and(|view| view.classes.contains(BadgeClasses::SHOW))
    }

    pub fn pulsed(&self) -> bool {
        self.last()
            .is_some_and(|view| view.classes.contains(BadgeClasses::PULSE))
    }

    pub fn clear(&self) {
        self.views.borrow_mut().clear();
    }
}

impl BadgeHost for RecordingBadgeHost {
    fn apply(&mut self, view: &BadgeView) {
        self.views.borrow_mut().push(view.clone());
    }
}
