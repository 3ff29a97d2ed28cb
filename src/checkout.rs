//! Checkout confirmation modal.
//!
//! ```text
//! Idle --open--> ModalOpen --confirm--> Processing --timer--> Completed --acknowledge--> Idle
//!                    |
//!                    +--cancel / backdrop / close--> Idle
//! ```
//!
//! The flow only tracks the modal. It never touches the store: the owner
//! removes the ids handed out by [`CheckoutFlow::confirm`] or
//! [`CheckoutFlow::on_timer`] and reports back through
//! [`CheckoutFlow::complete`].

use std::time::Duration;

use tracing::debug;

use crate::{
    action::{Scheduler, TimerToken},
    cart::ProductId,
    selection::Selection,
};

/// Timer payload marker for the simulated processing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTick;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    ModalOpen { count: usize },
    Processing { ids: Vec<ProductId>, token: TimerToken },
    Completed { removed: usize },
}

/// How the user tried to leave the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    Cancel,
    Backdrop,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Confirm { message: String },
    Processing { message: String },
    Success { message: String },
}

impl ModalView {
    pub fn message(&self) -> &str {
        match self {
            ModalView::Confirm { message }
            | ModalView::Processing { message }
            | ModalView::Success { message } => message,
        }
    }
}

/// What the owner must do after [`CheckoutFlow::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    /// Remove these ids now, then call [`CheckoutFlow::complete`].
    RemoveNow(Vec<ProductId>),
    /// Wait for the processing timer.
    Pending,
    /// The modal was not awaiting confirmation, or the selection emptied
    /// and the modal was closed.
    Ignored,
}

pub struct CheckoutFlow {
    state: CheckoutState,
    delay: Duration,
}

impl CheckoutFlow {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: CheckoutState::Idle,
            delay,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether the overlay is up, in any of its phases.
    pub fn is_open(&self) -> bool {
        self.state != CheckoutState::Idle
    }

    /// Opens the modal. Refused with an empty selection or when a modal is
    /// already up.
    pub fn open(&mut self, selection: &Selection) -> bool {
        if self.is_open() || selection.is_empty() {
            return false;
        }
        let count = selection.len();
        debug!(count, "checkout modal opened");
        self.state = CheckoutState::ModalOpen { count };
        true
    }

    pub fn confirm<T: From<CheckoutTick>>(
        &mut self,
        selection: &Selection,
        scheduler: &mut Scheduler<T>,
    ) -> Confirmed {
        if !matches!(self.state, CheckoutState::ModalOpen { .. }) {
            return Confirmed::Ignored;
        }
        if selection.is_empty() {
            // Everything selected left the cart while the modal was up.
            debug!("checkout closed, nothing left to order");
            self.state = CheckoutState::Idle;
            return Confirmed::Ignored;
        }
        let ids: Vec<ProductId> = selection.ids().collect();
        if self.delay.is_zero() {
            return Confirmed::RemoveNow(ids);
        }
        let token = scheduler.exec_after(self.delay, CheckoutTick.into());
        debug!(count = ids.len(), "checkout processing");
        self.state = CheckoutState::Processing { ids, token };
        Confirmed::Pending
    }

    /// Handles the processing timer; returns the ids to remove.
    pub fn on_timer(&mut self, fired: TimerToken) -> Option<Vec<ProductId>> {
        match &mut self.state {
            CheckoutState::Processing { ids, token } if *token == fired => {
                Some(std::mem::take(ids))
            }
            _ => None,
        }
    }

    /// Records that `removed` line items were taken out of the cart.
    pub fn complete(&mut self, removed: usize) {
        debug!(removed, "checkout completed");
        self.state = CheckoutState::Completed { removed };
    }

    /// Leaves the modal from the confirmation step. Ignored while
    /// processing; from the success step it acts as an acknowledgement and
    /// returns [`Dismissed::Acknowledged`].
    pub fn dismiss(&mut self, how: Dismiss) -> Dismissed {
        match self.state {
            CheckoutState::ModalOpen { .. } => {
                debug!(?how, "checkout cancelled");
                self.state = CheckoutState::Idle;
                Dismissed::Cancelled
            }
            CheckoutState::Completed { .. } => self.acknowledge(),
            CheckoutState::Idle | CheckoutState::Processing { .. } => Dismissed::Ignored,
        }
    }

    pub fn acknowledge(&mut self) -> Dismissed {
        if let CheckoutState::Completed { .. } = self.state {
            self.state = CheckoutState::Idle;
            Dismissed::Acknowledged
        } else {
            Dismissed::Ignored
        }
    }

    pub fn modal(&self) -> Option<ModalView> {
        match &self.state {
            CheckoutState::Idle => None,
            CheckoutState::ModalOpen { count } => Some(ModalView::Confirm {
                message: format!("Proceed to checkout with {count} items?"),
            }),
            CheckoutState::Processing { .. } => Some(ModalView::Processing {
                message: "Processing your order...".to_string(),
            }),
            CheckoutState::Completed { removed } => Some(ModalView::Success {
                message: format!("Order placed! {removed} items removed from your cart."),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissed {
    /// Closed without touching the cart.
    Cancelled,
    /// Closed after a completed checkout; the owner should re-render.
    Acknowledged,
    Ignored,
}
