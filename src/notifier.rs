//! In-page publish/subscribe for cart changes.
//!
//! Two kinds of message exist: [`CartMessage::CartChanged`], broadcast after
//! every store mutation made in this page, and
//! [`CartMessage::ExternalStorageChanged`], relayed from storage change
//! notifications caused by other contexts. Subscribers only see messages;
//! they re-read whatever state they need themselves.

use std::{cell::RefCell, rc::Rc};

use slotmap::{SlotMap, new_key_type};
use tracing::trace;

use crate::storage::{KeyValueStore, StorageEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMessage {
    CartChanged,
    ExternalStorageChanged { key: String },
}

new_key_type! {
    pub struct SubscriptionId;
}

type Subscriber = Rc<dyn Fn(&CartMessage)>;

/// Cheap to clone; clones share the subscriber list.
#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Rc<RefCell<SlotMap<SubscriptionId, Subscriber>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, f: impl Fn(&CartMessage) + 'static) -> SubscriptionId {
        self.subscribers.borrow_mut().insert(Rc::new(f))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.borrow_mut().remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn emit(&self, message: CartMessage) {
        // Subscribers may subscribe, unsubscribe or emit while handling a
        // message, so the list must not stay borrowed during delivery.
        let subscribers: Vec<Subscriber> = self.subscribers.borrow().values().cloned().collect();
        trace!(?message, subscribers = subscribers.len(), "emit");
        for subscriber in subscribers {
            subscriber(&message);
        }
    }

    /// Relays pending storage notifications from `storage` as
    /// [`CartMessage::ExternalStorageChanged`] and returns them.
    pub fn forward_storage_events(&self, storage: &impl KeyValueStore) -> Vec<StorageEvent> {
        let events = storage.drain_events();
        for event in &events {
            self.emit(CartMessage::ExternalStorageChanged {
                key: event.key.clone(),
            });
        }
        events
    }
}
