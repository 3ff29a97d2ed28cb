//! The cart page.
//!
//! [`CartController`] is the single owner of the page's state: the store
//! handle, the selection, the checkout modal, the hold-repeat machine and
//! the timers behind them. Input arrives as [`CartEvent`]s; after each one
//! the controller rebuilds its [`CartView`] from a fresh store read.
//!
//! Every store mutation is followed by a [`CartMessage::CartChanged`]
//! broadcast, except checkout, which broadcasts once the success message is
//! acknowledged.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::{
    action::{Clock, Instant, Scheduler, TimerToken},
    binder::{self, CartView, Pricing, TotalFlash},
    cart::{Cart, CartStore, ProductId},
    checkout::{CheckoutFlow, CheckoutTick, Confirmed, Dismiss, Dismissed},
    config::StorefrontConfig,
    error::CartError,
    hold_repeat::{HoldRepeat, HoldTick, Step, StepDirection},
    notifier::{CartMessage, Notifier},
    selection::{RowActivation, Selection, TargetKind},
    storage::KeyValueStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The quantity input of a row was edited.
    QuantityInput { id: ProductId, raw: String },
    /// A single +/- activation, e.g. from the keyboard.
    Step { id: ProductId, direction: StepDirection },
    /// Pointer or touch went down on a +/- control.
    HoldStart { id: ProductId, direction: StepDirection },
    /// Pointer up, pointer leave, touch end or touch cancel.
    HoldEnd,
    Remove { id: ProductId },
    /// The row checkbox itself changed.
    ToggleSelected { id: ProductId },
    SetAllSelected(bool),
    /// Click or key press somewhere inside a row.
    RowActivated {
        id: ProductId,
        activation: RowActivation,
        target: TargetKind,
    },
    Checkout,
    ConfirmCheckout,
    DismissModal(Dismiss),
    AcknowledgeCheckout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerTimer {
    Hold,
    Checkout,
}

impl From<HoldTick> for ControllerTimer {
    fn from(_: HoldTick) -> Self {
        ControllerTimer::Hold
    }
}

impl From<CheckoutTick> for ControllerTimer {
    fn from(_: CheckoutTick) -> Self {
        ControllerTimer::Checkout
    }
}

/// How much of the page a change invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
    /// Rows are rebuilt from scratch; every checkbox starts unchecked.
    Full,
    /// Rows stay; selection survives for ids still in the cart.
    Recalc,
}

pub struct CartController<S> {
    store: CartStore<S>,
    pricing: Pricing,
    notifier: Notifier,
    selection: Selection,
    checkout: CheckoutFlow,
    hold: HoldRepeat,
    flash: TotalFlash,
    scheduler: Scheduler<ControllerTimer>,
    cart: Cart,
    view: CartView,
}

impl<S: KeyValueStore> CartController<S> {
    /// Loads the cart, writes it back normalized and renders the first view.
    pub fn new(
        store: CartStore<S>,
        config: &StorefrontConfig,
        clock: Rc<dyn Clock>,
        notifier: Notifier,
    ) -> Self {
        let cart = store.load();
        let pricing = Pricing::from_config(config);
        let selection = Selection::new();
        let view = binder::render(&cart, &selection, &pricing);
        let mut controller = Self {
            store,
            pricing,
            notifier,
            selection,
            checkout: CheckoutFlow::new(config.checkout_delay()),
            hold: HoldRepeat::new(config.hold.clone()),
            flash: TotalFlash::new(),
            scheduler: Scheduler::new(clock),
            cart,
            view,
        };
        controller.persist_current();
        controller.refresh(Refresh::Full);
        controller
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    /// The cart as of the last render.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn checkout(&self) -> &CheckoutFlow {
        &self.checkout
    }

    pub fn hold(&self) -> &HoldRepeat {
        &self.hold
    }

    pub fn store(&self) -> &CartStore<S> {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn handle(&mut self, event: CartEvent) {
        if self.checkout.is_open() && !Self::allowed_with_modal(&event) {
            debug!(?event, "ignored while checkout modal is open");
            return;
        }

        match event {
            CartEvent::QuantityInput { id, raw } => {
                let result = self.store.set_quantity(id, &raw);
                self.after_mutation(result, Refresh::Recalc);
            }
            CartEvent::Step { id, direction } => self.apply_step(Step {
                target: id,
                direction,
            }),
            CartEvent::HoldStart { id, direction } => {
                let step = self.hold.press(id, direction, &mut self.scheduler);
                self.apply_step(step);
            }
            CartEvent::HoldEnd => {
                self.hold.release(&mut self.scheduler);
            }
            CartEvent::Remove { id } => {
                self.hold.release(&mut self.scheduler);
                let result = self.store.remove(id);
                self.after_mutation(result, Refresh::Full);
            }
            CartEvent::ToggleSelected { id } => {
                if self.cart.contains(id) {
                    self.selection.toggle(id);
                    self.refresh(Refresh::Recalc);
                }
            }
            CartEvent::SetAllSelected(selected) => {
                if selected {
                    self.selection.select_all(&self.cart);
                } else {
                    self.selection.clear();
                }
                self.refresh(Refresh::Recalc);
            }
            CartEvent::RowActivated {
                id,
                activation,
                target,
            } => {
                if activation.toggles_row(target) && self.cart.contains(id) {
                    self.selection.toggle(id);
                    self.refresh(Refresh::Recalc);
                }
            }
            CartEvent::Checkout => {
                if self.checkout.open(&self.selection) {
                    self.hold.release(&mut self.scheduler);
                    self.refresh(Refresh::Recalc);
                }
            }
            CartEvent::ConfirmCheckout => {
                match self.checkout.confirm(&self.selection, &mut self.scheduler) {
                    Confirmed::RemoveNow(ids) => self.complete_checkout(ids),
                    Confirmed::Pending => self.refresh(Refresh::Recalc),
                    Confirmed::Ignored => self.refresh_modal(),
                }
            }
            CartEvent::DismissModal(how) => {
                let dismissed = self.checkout.dismiss(how);
                self.after_dismiss(dismissed);
            }
            CartEvent::AcknowledgeCheckout => {
                let dismissed = self.checkout.acknowledge();
                self.after_dismiss(dismissed);
            }
        }
    }

    fn allowed_with_modal(event: &CartEvent) -> bool {
        matches!(
            event,
            CartEvent::ConfirmCheckout
                | CartEvent::DismissModal(_)
                | CartEvent::AcknowledgeCheckout
                | CartEvent::HoldEnd
        )
    }

    /// Runs every timer whose deadline has passed.
    pub fn tick(&mut self) {
        for (token, timer) in self.scheduler.fire_due() {
            self.on_timer(token, timer);
        }
    }

    fn on_timer(&mut self, token: TimerToken, timer: ControllerTimer) {
        match timer {
            ControllerTimer::Hold => {
                if let Some(step) = self.hold.on_timer(token, &mut self.scheduler) {
                    self.apply_step(step);
                }
            }
            ControllerTimer::Checkout => {
                if let Some(ids) = self.checkout.on_timer(token) {
                    self.complete_checkout(ids);
                }
            }
        }
    }

    /// Takes storage notifications from other contexts, relays them on the
    /// notifier and re-renders if the cart key was among them.
    pub fn sync_storage(&mut self) {
        let events = self.notifier.forward_storage_events(self.store.storage());
        if events.iter().any(|event| event.key == self.store.key()) {
            debug!("cart changed in another context");
            self.refresh(Refresh::Recalc);
        }
    }

    fn apply_step(&mut self, step: Step) {
        let result = self
            .store
            .step_quantity(step.target, step.direction.delta());
        self.after_mutation(result, Refresh::Recalc);
    }

    fn complete_checkout(&mut self, ids: Vec<ProductId>) {
        let before = self.store.load();
        let removed = ids.iter().filter(|id| before.contains(**id)).count();
        match self.store.remove_many(&ids) {
            Ok(_) => self.checkout.complete(removed),
            Err(err) => {
                warn!(error = %err, "checkout failed to update the cart");
                self.checkout.complete(0);
            }
        }
        self.refresh_modal();
    }

    fn after_dismiss(&mut self, dismissed: Dismissed) {
        match dismissed {
            Dismissed::Cancelled => self.refresh(Refresh::Recalc),
            Dismissed::Acknowledged => {
                self.refresh(Refresh::Full);
                self.notifier.emit(CartMessage::CartChanged);
            }
            Dismissed::Ignored => {}
        }
    }

    fn after_mutation(&mut self, result: Result<Cart, CartError>, refresh: Refresh) {
        match result {
            Ok(cart) => {
                self.rerender(cart, refresh);
                self.notifier.emit(CartMessage::CartChanged);
            }
            Err(err) => {
                // The store still holds the previous cart; show that.
                warn!(error = %err, "failed to persist cart change");
                self.refresh(refresh);
            }
        }
    }

    /// Writes the loaded cart back so seed data and normalizations become
    /// durable, then tells listeners.
    fn persist_current(&mut self) {
        match self.store.save(&self.cart) {
            Ok(()) => self.notifier.emit(CartMessage::CartChanged),
            Err(err) => warn!(error = %err, "failed to persist initial cart"),
        }
    }

    fn refresh(&mut self, refresh: Refresh) {
        let cart = self.store.load();
        self.rerender(cart, refresh);
    }

    /// Renders `cart`, which must be what the store currently holds.
    fn rerender(&mut self, cart: Cart, refresh: Refresh) {
        self.cart = cart;
        match refresh {
            Refresh::Full => self.selection.clear(),
            Refresh::Recalc => self.selection.retain_in(&self.cart),
        }
        let mut view = binder::render(&self.cart, &self.selection, &self.pricing);
        view.flash = self.flash.observe(&view.summary.total);
        view.modal = self.checkout.modal();
        self.view = view;
    }

    /// Only the modal changed; rows and totals stay as they were rendered.
    fn refresh_modal(&mut self) {
        self.view.flash = false;
        self.view.modal = self.checkout.modal();
    }
}
