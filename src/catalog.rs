//! Product catalog page.
//!
//! The catalog only writes to the cart through
//! [`CartStore::add_or_increment`]; it never reads cart contents. With no
//! stored cart it starts from an empty one, never from the demo seed. It
//! also owns the wishlist, a separate persisted set of product ids.

use std::{rc::Rc, time::Duration};

use indexmap::IndexSet;
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::{
    action::{Clock, Scheduler, TimerToken},
    cart::{Cart, CartStore, LineItem, ProductId, Quantity},
    config::{StorefrontConfig, ToastTiming},
    error::CartError,
    money::Currency,
    notifier::{CartMessage, Notifier},
    storage::KeyValueStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub rating: f64,
    pub category: String,
    pub img: String,
    pub desc: String,
}

impl Product {
    fn line_item(&self) -> LineItem {
        LineItem::new(self.id, self.title.clone(), self.price)
            .with_img(self.img.clone())
            .with_meta(self.category.clone())
    }
}

pub fn sample_products() -> Vec<Product> {
    let product = |id, title: &str, price, rating, category: &str, img: &str, desc: &str| Product {
        id: ProductId(id),
        title: title.to_string(),
        price,
        rating,
        category: category.to_string(),
        img: img.to_string(),
        desc: desc.to_string(),
    };
    vec![
        product(
            1,
            "Elegant Wedding Dress",
            200.0,
            4.6,
            "Women",
            "images/wedding dress.jpg",
            "Elegant long-sleeve ball gown with delicate lace.",
        ),
        product(
            2,
            "Casual Fall Wedding Attire",
            100.0,
            4.1,
            "Men",
            "images/casual fall wedding attire.png",
            "Comfortable yet stylish autumn outfit suitable for casual weddings.",
        ),
        product(
            3,
            "Bride & Groom Matching",
            400.0,
            4.8,
            "Accessories",
            "images/Bride And Groom Matching Dress For Wedding.jpg",
            "Coordinated set for couple photos with premium finishing.",
        ),
        product(
            4,
            "Pretty Ball Gown",
            150.0,
            4.2,
            "Women",
            "images/Pretty ball gown wedding dresses.jpg",
            "Classic ball gown silhouette with soft tulle.",
        ),
        product(
            5,
            "Cathedral Style Dresses",
            180.0,
            3.9,
            "Women",
            "images/Cathedral style wedding dresses.jpg",
            "Dramatic train and cathedral veil options.",
        ),
        product(
            6,
            "Groom Sherwani",
            199.0,
            4.3,
            "Men",
            "images/Groom Wear For Indian Wedding Indian Wedding Sherwani For Groom.jpg",
            "Traditional sherwani with modern tailoring.",
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SortOrder {
    /// Source order; the sample data carries no dates.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

pub const DEFAULT_MAX_PRICE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub query: String,
    pub categories: IndexSet<String>,
    pub max_price: f64,
    pub min_rating: f64,
    pub sort: SortOrder,
    pub layout: Layout,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            categories: IndexSet::new(),
            max_price: DEFAULT_MAX_PRICE,
            min_rating: 0.0,
            sort: SortOrder::default(),
            layout: Layout::default(),
        }
    }
}

impl CatalogQuery {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.query.trim().to_lowercase();
        let mut out: Vec<&Product> = products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || format!("{} {}", p.title, p.desc)
                        .to_lowercase()
                        .contains(&needle)
            })
            .filter(|p| self.categories.is_empty() || self.categories.contains(&p.category))
            .filter(|p| p.price <= self.max_price)
            .filter(|p| p.rating >= self.min_rating)
            .collect();

        match self.sort {
            SortOrder::Newest => {}
            SortOrder::PriceAsc => out.sort_by(|a, b| a.price.total_cmp(&b.price)),
            SortOrder::PriceDesc => out.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortOrder::Rating => out.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
        out
    }
}

/// Persisted set of wishlisted product ids.
pub struct Wishlist<S> {
    storage: S,
    key: String,
    ids: IndexSet<ProductId>,
}

impl<S: KeyValueStore> Wishlist<S> {
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let ids = match storage.get_item(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%key, error = %err, "malformed wishlist, starting empty");
                IndexSet::new()
            }),
            Ok(None) => IndexSet::new(),
            Err(err) => {
                warn!(%key, error = %err, "failed to read wishlist");
                IndexSet::new()
            }
        };
        Self { storage, key, ids }
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    /// Flips membership of `id`, persists, and returns the new membership.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        let added = if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.save();
        added
    }

    fn save(&self) {
        if let Err(err) = self.try_save() {
            warn!(key = %self.key, error = %err, "failed to save wishlist");
        }
    }

    fn try_save(&self) -> Result<(), CartError> {
        let json = serde_json::to_string(&self.ids)?;
        self.storage.set_item(&self.key, &json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Fading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub phase: ToastPhase,
    token: TimerToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CatalogTimer {
    Search(String),
    ToastFade,
    ToastRemove,
}

/// State of the catalog page.
pub struct Catalog<S> {
    products: Vec<Product>,
    query: CatalogQuery,
    wishlist: Wishlist<S>,
    cart: CartStore<S>,
    notifier: Notifier,
    currency: Currency,
    quick_view: Option<ProductId>,
    toast: Option<Toast>,
    toast_timing: ToastTiming,
    search_debounce: Duration,
    pending_search: Option<TimerToken>,
    scheduler: Scheduler<CatalogTimer>,
}

impl<S: KeyValueStore + Clone> Catalog<S> {
    pub fn new(
        storage: S,
        config: &StorefrontConfig,
        products: Vec<Product>,
        clock: Rc<dyn Clock>,
        notifier: Notifier,
    ) -> Self {
        Self {
            products,
            query: CatalogQuery::default(),
            wishlist: Wishlist::load(storage.clone(), config.wishlist_key.clone()),
            cart: CartStore::new(storage, config.cart_key.clone(), Cart::new()),
            notifier,
            currency: config.currency(),
            quick_view: None,
            toast: None,
            toast_timing: config.toast.clone(),
            search_debounce: config.search_debounce(),
            pending_search: None,
            scheduler: Scheduler::new(clock),
        }
    }
}

impl<S: KeyValueStore> Catalog<S> {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn query(&self) -> &CatalogQuery {
        &self.query
    }

    /// Products passing the current filters, in display order.
    pub fn visible(&self) -> Vec<&Product> {
        self.query.apply(&self.products)
    }

    pub fn format_price(&self, product: &Product) -> String {
        self.currency.format(product.price)
    }

    pub fn wishlist(&self) -> &Wishlist<S> {
        &self.wishlist
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Search text is applied once typing pauses for the debounce period.
    pub fn search_input(&mut self, text: &str) {
        if let Some(token) = self.pending_search.take() {
            self.scheduler.cancel(token);
        }
        let token = self
            .scheduler
            .exec_after(self.search_debounce, CatalogTimer::Search(text.trim().to_string()));
        self.pending_search = Some(token);
    }

    pub fn set_category(&mut self, category: &str, enabled: bool) {
        if enabled {
            self.query.categories.insert(category.to_string());
        } else {
            self.query.categories.shift_remove(category);
        }
    }

    pub fn set_max_price(&mut self, max_price: f64) {
        self.query.max_price = max_price;
    }

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.query.min_rating = min_rating;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.query.layout = layout;
    }

    pub fn clear_filters(&mut self) {
        if let Some(token) = self.pending_search.take() {
            self.scheduler.cancel(token);
        }
        self.query.clear();
    }

    pub fn quick_view(&self) -> Option<&Product> {
        self.quick_view.and_then(|id| self.product(id))
    }

    pub fn open_quick_view(&mut self, id: ProductId) -> bool {
        if self.product(id).is_none() {
            return false;
        }
        self.quick_view = Some(id);
        true
    }

    pub fn close_quick_view(&mut self) {
        self.quick_view = None;
    }

    pub fn toggle_wishlist(&mut self, id: ProductId) -> bool {
        self.wishlist.toggle(id)
    }

    /// Toggles the quick-viewed product; no-op when nothing is open.
    pub fn toggle_quick_view_wishlist(&mut self) -> Option<bool> {
        let id = self.quick_view?;
        Some(self.wishlist.toggle(id))
    }

    pub fn add_to_cart(&mut self, id: ProductId, qty: u32) -> bool {
        let Some(product) = self.product(id) else {
            return false;
        };
        let title = product.title.clone();
        let item = product.line_item();
        if let Err(err) = self.cart.add_or_increment(item, Quantity::new(qty)) {
            warn!(%id, error = %err, "failed to add product to cart");
            return false;
        }
        debug!(%id, qty, "added to cart");
        self.notifier.emit(CartMessage::CartChanged);
        self.show_toast(format!("{title} added to cart"));
        true
    }

    /// Adds the quick-viewed product and closes the quick view.
    pub fn add_from_quick_view(&mut self) -> bool {
        let Some(id) = self.quick_view else {
            return false;
        };
        let added = self.add_to_cart(id, 1);
        self.close_quick_view();
        added
    }

    fn show_toast(&mut self, text: String) {
        if let Some(old) = self.toast.take() {
            self.scheduler.cancel(old.token);
        }
        let token = self.scheduler.exec_after(
            Duration::from_millis(self.toast_timing.visible_ms),
            CatalogTimer::ToastFade,
        );
        self.toast = Some(Toast {
            text,
            phase: ToastPhase::Visible,
            token,
        });
    }

    pub fn next_deadline(&self) -> Option<crate::action::Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs due timers.
    pub fn tick(&mut self) {
        for (token, timer) in self.scheduler.fire_due() {
            match timer {
                CatalogTimer::Search(text) if self.pending_search == Some(token) => {
                    self.pending_search = None;
                    self.query.query = text;
                }
                CatalogTimer::ToastFade => self.advance_toast(token, ToastPhase::Visible),
                CatalogTimer::ToastRemove => self.advance_toast(token, ToastPhase::Fading),
                CatalogTimer::Search(_) => {}
            }
        }
    }

    fn advance_toast(&mut self, fired: TimerToken, expected: ToastPhase) {
        let Some(toast) = self.toast.as_mut() else {
            return;
        };
        if toast.token != fired || toast.phase != expected {
            return;
        }
        match expected {
            ToastPhase::Visible => {
                toast.phase = ToastPhase::Fading;
                toast.token = self.scheduler.exec_after(
                    Duration::from_millis(self.toast_timing.fade_ms),
                    CatalogTimer::ToastRemove,
                );
            }
            ToastPhase::Fading => self.toast = None,
        }
    }
}
