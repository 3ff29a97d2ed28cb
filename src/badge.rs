//! Cart count badge.
//!
//! The badge shows Σ qty of the persisted cart next to the cart link. It is
//! a read-only consumer: it never goes through [`CartStore`], it re-reads
//! the raw stored value every time it is told something changed. An absent
//! or malformed value counts as zero.
//!
//! [`CartStore`]: crate::cart::CartStore

use std::{cell::RefCell, rc::Rc};

use bitflags::bitflags;
use serde_json::Value;
use tracing::warn;

use crate::{
    notifier::{CartMessage, Notifier, SubscriptionId},
    storage::KeyValueStore,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BadgeClasses: u8 {
        const SHOW = 1 << 0;
        /// One-shot; set only on the render where the count changed.
        const PULSE = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BadgeView {
    pub text: String,
    pub classes: BadgeClasses,
}

impl BadgeView {
    pub const ARIA_LABEL: &'static str = "Cart items count";
    pub const ROLE: &'static str = "status";
}

/// Where the badge is drawn, e.g. the navbar cart link.
pub trait BadgeHost {
    fn apply(&mut self, view: &BadgeView);
}

pub struct Badge<S> {
    storage: S,
    key: String,
    host: Option<Box<dyn BadgeHost>>,
    last_count: Option<u64>,
}

impl<S: KeyValueStore> Badge<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            host: None,
            last_count: None,
        }
    }

    pub fn with_host(mut self, host: impl BadgeHost + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn last_count(&self) -> Option<u64> {
        self.last_count
    }

    /// Σ qty of the persisted cart.
    pub fn read_count(&self) -> u64 {
        let raw = match self.storage.get_item(&self.key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.key, error = %err, "badge failed to read cart");
                None
            }
        };
        raw.as_deref().map(count_items).unwrap_or(0)
    }

    /// Recomputes the badge and applies it to the host. Without a host this
    /// does nothing and returns `None`.
    pub fn render(&mut self) -> Option<BadgeView> {
        if self.host.is_none() {
            return None;
        }
        let count = self.read_count();
        let view = if count == 0 {
            BadgeView::default()
        } else {
            let mut classes = BadgeClasses::SHOW;
            if self.last_count.is_some_and(|last| last != count) {
                classes |= BadgeClasses::PULSE;
            }
            BadgeView {
                text: count.to_string(),
                classes,
            }
        };
        if let Some(host) = self.host.as_mut() {
            host.apply(&view);
        }
        self.last_count = Some(count);
        Some(view)
    }
}

impl<S: KeyValueStore + 'static> Badge<S> {
    /// Subscribes `badge` to in-page cart changes and to storage changes of
    /// its key made by other contexts.
    pub fn connect(badge: &Rc<RefCell<Self>>, notifier: &Notifier) -> SubscriptionId {
        let badge = badge.clone();
        notifier.subscribe(move |message| {
            let relevant = match message {
                CartMessage::CartChanged => true,
                CartMessage::ExternalStorageChanged { key } => *key == badge.borrow().key,
            };
            if relevant {
                badge.borrow_mut().render();
            }
        })
    }
}

fn count_items(raw: &str) -> u64 {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        return 0;
    };
    items
        .iter()
        .map(|item| match item.get("qty") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        })
        .filter(|qty| qty.is_finite() && *qty > 0.0)
        .map(|qty| qty.trunc().min(u32::MAX as f64) as u64)
        .fold(0, u64::saturating_add)
}
