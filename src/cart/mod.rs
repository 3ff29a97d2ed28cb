//! Line items and the cart sequence.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, unique by id. Display
//! order is insertion order. Quantities are always whole numbers of at
//! least one; every path that writes a quantity goes through
//! [`Quantity`], which clamps instead of rejecting.

mod store;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use store::CartStore;

/// Stable product identifier shared by the catalog and the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

/// A line-item quantity, never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Self {
        Quantity(value.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Clamps a raw numeric value: non-finite or sub-one values become 1,
    /// fractions truncate toward zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value < 1.0 {
            return Self::ONE;
        }
        // `as` saturates at u32::MAX.
        Quantity(value.trunc() as u32)
    }

    /// Clamps free-form input text (`"abc"` → 1, `"-5"` → 1, `"3.9"` → 3).
    pub fn parse_clamped(raw: &str) -> Self {
        raw.trim()
            .parse::<f64>()
            .map(Self::from_f64)
            .unwrap_or(Self::ONE)
    }

    /// Moves by `delta` steps, stopping at one.
    pub fn step(self, delta: i64) -> Self {
        let next = (self.0 as i64).saturating_add(delta);
        Quantity(next.clamp(1, u32::MAX as i64) as u32)
    }

    pub fn saturating_add(self, other: Quantity) -> Self {
        Quantity(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Persisted quantities may have been written by older scripts as
        // strings, fractions or zero; they are clamped rather than rejected.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(serde::de::IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Quantity::from_f64(value),
            Raw::Text(text) => Quantity::parse_clamped(&text),
            Raw::Other(_) => Quantity::ONE,
        })
    }
}

/// One product instance in the cart. `price` is captured when the product
/// is added and never re-synced with the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub qty: Quantity,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub meta: String,
}

impl LineItem {
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            qty: Quantity::ONE,
            img: String::new(),
            meta: String::new(),
        }
    }

    pub fn with_qty(mut self, qty: u32) -> Self {
        self.qty = Quantity::new(qty);
        self
    }

    pub fn with_img(mut self, img: impl Into<String>) -> Self {
        self.img = img.into();
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = meta.into();
        self
    }

    pub fn subtotal(&self) -> f64 {
        self.price * self.qty.get() as f64
    }

    fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from arbitrary items, merging duplicate ids into the
    /// first occurrence.
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Cart::new();
        for item in items {
            match cart.position(item.id) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.qty = existing.qty.saturating_add(item.qty);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Parses the persisted JSON form. `None` means the data is malformed
    /// and the caller should fall back to its seed set.
    pub(crate) fn from_json(raw: &str) -> Option<Self> {
        let items: Vec<LineItem> = serde_json::from_str(raw).ok()?;
        if !items.iter().all(LineItem::has_valid_price) {
            return None;
        }
        Some(Self::from_items(items))
    }

    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Σ price × qty over every row.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Σ qty over every row.
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| item.qty.get() as u64).sum()
    }

    /// Sets the quantity of `id` from raw input text. Returns the quantity
    /// that was stored, or `None` if the id is not in the cart.
    pub fn set_quantity(&mut self, id: ProductId, raw: &str) -> Option<Quantity> {
        let qty = Quantity::parse_clamped(raw);
        self.set_quantity_to(id, qty).then_some(qty)
    }

    pub fn set_quantity_to(&mut self, id: ProductId, qty: Quantity) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.qty = qty;
                true
            }
            None => false,
        }
    }

    pub fn step_quantity(&mut self, id: ProductId, delta: i64) -> Option<Quantity> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.qty = item.qty.step(delta);
        Some(item.qty)
    }

    /// Removes `id`. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Removes every row whose id is in `ids`, returning how many went.
    pub fn remove_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a ProductId>) -> usize {
        let ids: rustc_hash::FxHashSet<ProductId> = ids.into_iter().copied().collect();
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    /// Increments an existing row by `qty`, or appends `item` with `qty`.
    pub fn add_or_increment(&mut self, item: LineItem, qty: Quantity) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.qty = existing.qty.saturating_add(qty),
            None => self.items.push(LineItem { qty, ..item }),
        }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
