//! Row selection.
//!
//! The selection is the set of checked rows. It is never persisted, and a
//! full re-render starts over with nothing checked.

use indexmap::IndexSet;
use strum::EnumString;

use crate::cart::{Cart, ProductId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<ProductId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    pub fn set(&mut self, id: ProductId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.shift_remove(&id);
        }
    }

    /// Flips `id` and returns its new state.
    pub fn toggle(&mut self, id: ProductId) -> bool {
        let selected = !self.is_selected(id);
        self.set(id, selected);
        selected
    }

    pub fn select_all(&mut self, cart: &Cart) {
        self.ids = cart.iter().map(|item| item.id).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drops ids that are no longer in `cart`.
    pub fn retain_in(&mut self, cart: &Cart) {
        self.ids.retain(|id| cart.contains(*id));
    }

    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// What the pointer or keyboard focus was on when a row was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TargetKind {
    Input,
    Button,
    #[strum(serialize = "a", serialize = "link")]
    Link,
    Label,
    /// The row itself or any non-interactive descendant.
    Row,
}

impl TargetKind {
    /// Maps an element tag name; anything not interactive counts as the row.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(TargetKind::Row)
    }

    /// Controls handle their own activation; toggling the row as well would
    /// flip the checkbox twice.
    pub fn is_control(self) -> bool {
        !matches!(self, TargetKind::Row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActivation {
    Click,
    Key(ActivationKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKey {
    Space,
    Enter,
    Other,
}

impl ActivationKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Self {
        match key {
            " " | "Space" | "Spacebar" => ActivationKey::Space,
            "Enter" => ActivationKey::Enter,
            _ => ActivationKey::Other,
        }
    }
}

impl RowActivation {
    pub fn toggles_row(self, target: TargetKind) -> bool {
        if target.is_control() {
            return false;
        }
        match self {
            RowActivation::Click => true,
            RowActivation::Key(key) => key != ActivationKey::Other,
        }
    }
}
