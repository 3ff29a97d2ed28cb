use tracing::{debug, trace, warn};

use super::{Cart, LineItem, ProductId, Quantity};
use crate::{config::StorefrontConfig, error::CartError, storage::KeyValueStore};

/// Owns the authoritative cart in a [`KeyValueStore`].
///
/// Nothing here caches the cart: every mutation reads the persisted value,
/// applies the change to that copy and writes the whole cart back. All of
/// it happens inside one call, so no other mutation can interleave.
pub struct CartStore<S> {
    storage: S,
    key: String,
    seed: Cart,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(storage: S, key: impl Into<String>, seed: Cart) -> Self {
        Self {
            storage,
            key: key.into(),
            seed,
        }
    }

    pub fn from_config(storage: S, config: &StorefrontConfig) -> Self {
        Self::new(
            storage,
            config.cart_key.clone(),
            Cart::from_items(config.seed.iter().cloned()),
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn seed(&self) -> &Cart {
        &self.seed
    }

    /// Reads the persisted cart. Missing, unreadable or malformed data all
    /// yield the seed set; this never fails.
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no persisted cart, using seed");
                return self.seed.clone();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read cart, using seed");
                return self.seed.clone();
            }
        };
        match Cart::from_json(&raw) {
            Some(cart) => cart,
            None => {
                warn!(key = %self.key, "persisted cart is malformed, using seed");
                self.seed.clone()
            }
        }
    }

    /// Replaces the persisted cart with `cart`.
    pub fn save(&self, cart: &Cart) -> Result<(), CartError> {
        let json = cart.to_json()?;
        self.storage.set_item(&self.key, &json)?;
        trace!(key = %self.key, items = cart.len(), "saved cart");
        Ok(())
    }

    /// Read-modify-write in one step. Returns the cart as saved.
    pub fn update(&self, f: impl FnOnce(&mut Cart)) -> Result<Cart, CartError> {
        let mut cart = self.load();
        f(&mut cart);
        self.save(&cart)?;
        Ok(cart)
    }

    pub fn set_quantity(&self, id: ProductId, raw: &str) -> Result<Cart, CartError> {
        self.update(|cart| {
            if let Some(qty) = cart.set_quantity(id, raw) {
                if raw.trim() != qty.to_string() {
                    debug!(%id, raw, %qty, "clamped quantity input");
                }
            }
        })
    }

    pub fn step_quantity(&self, id: ProductId, delta: i64) -> Result<Cart, CartError> {
        self.update(|cart| {
            cart.step_quantity(id, delta);
        })
    }

    pub fn remove(&self, id: ProductId) -> Result<Cart, CartError> {
        self.update(|cart| {
            if cart.remove(id) {
                debug!(%id, "removed line item");
            }
        })
    }

    pub fn remove_many<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ProductId>,
    ) -> Result<Cart, CartError> {
        self.update(|cart| {
            let removed = cart.remove_many(ids);
            debug!(removed, "removed line items");
        })
    }

    pub fn add_or_increment(&self, item: LineItem, qty: Quantity) -> Result<Cart, CartError> {
        self.update(|cart| cart.add_or_increment(item, qty))
    }

    /// Σ qty over the persisted cart.
    pub fn count(&self) -> u64 {
        self.load().count()
    }
}
