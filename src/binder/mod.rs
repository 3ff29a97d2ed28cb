//! Projection of the cart onto the page.
//!
//! [`render`] is a pure function from `(Cart, Selection)` to a [`CartView`].
//! The view carries every string the page shows, already formatted, so an
//! adapter only has to copy fields into whatever widgets it uses.

mod flash;

use bitflags::bitflags;

pub use flash::TotalFlash;

use crate::{
    cart::{Cart, LineItem, ProductId, Quantity},
    checkout::ModalView,
    config::StorefrontConfig,
    money::{Currency, PLACEHOLDER},
    selection::Selection,
};

pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";
pub const CHECKOUT_LABEL: &str = "Checkout";

/// Currency and the flat shipping charge.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    pub currency: Currency,
    pub shipping: f64,
}

impl Pricing {
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self {
            currency: config.currency(),
            shipping: config.shipping,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::from_config(&StorefrontConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

impl Totals {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a LineItem>, shipping: f64) -> Self {
        let subtotal = items.into_iter().map(LineItem::subtotal).sum::<f64>();
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl TotalsView {
    fn format(totals: &Totals, currency: &Currency) -> Self {
        Self {
            subtotal: currency.format(totals.subtotal),
            shipping: currency.format(totals.shipping),
            total: currency.format(totals.total),
        }
    }

    fn placeholder() -> Self {
        Self {
            subtotal: PLACEHOLDER.to_string(),
            shipping: PLACEHOLDER.to_string(),
            total: PLACEHOLDER.to_string(),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowFlags: u8 {
        const SELECTED = 1 << 0;
        /// The decrement control is live (qty above the floor).
        const CAN_DECREMENT = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: ProductId,
    pub title: String,
    pub img: String,
    pub meta: String,
    pub unit_price: String,
    pub qty: Quantity,
    /// Value written back into the quantity input, already sanitized.
    pub qty_text: String,
    pub subtotal: String,
    pub flags: RowFlags,
}

impl RowView {
    pub fn is_selected(&self) -> bool {
        self.flags.contains(RowFlags::SELECTED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryState {
    /// Nothing selected: dashes everywhere, checkout disabled.
    Placeholder,
    Selected { count: usize },
}

/// The order summary box, driven by the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub state: SummaryState,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutButton {
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub rows: Vec<RowView>,
    /// Whole-cart figures, independent of the selection.
    pub totals: Totals,
    pub totals_text: TotalsView,
    pub summary: SummaryView,
    pub checkout: CheckoutButton,
    pub empty_message: Option<&'static str>,
    /// Pulse the summary container; see [`TotalFlash`].
    pub flash: bool,
    pub modal: Option<ModalView>,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: ProductId) -> Option<&RowView> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(RowView::is_selected)
    }
}

fn render_row(item: &LineItem, selected: bool, currency: &Currency) -> RowView {
    let mut flags = RowFlags::empty();
    flags.set(RowFlags::SELECTED, selected);
    flags.set(RowFlags::CAN_DECREMENT, item.qty > Quantity::ONE);
    RowView {
        id: item.id,
        title: item.title.clone(),
        img: item.img.clone(),
        meta: item.meta.clone(),
        unit_price: currency.format(item.price),
        qty: item.qty,
        qty_text: item.qty.to_string(),
        subtotal: currency.format(item.subtotal()),
        flags,
    }
}

fn render_summary(cart: &Cart, selection: &Selection, pricing: &Pricing) -> (SummaryView, CheckoutButton) {
    let selected: Vec<&LineItem> = cart
        .iter()
        .filter(|item| selection.is_selected(item.id))
        .collect();

    if selected.is_empty() {
        let text = TotalsView::placeholder();
        let summary = SummaryView {
            state: SummaryState::Placeholder,
            subtotal: text.subtotal,
            shipping: text.shipping,
            total: text.total,
        };
        let checkout = CheckoutButton {
            enabled: false,
            label: CHECKOUT_LABEL.to_string(),
        };
        return (summary, checkout);
    }

    let count = selected.len();
    let text = TotalsView::format(&Totals::of(selected, pricing.shipping), &pricing.currency);
    let summary = SummaryView {
        state: SummaryState::Selected { count },
        subtotal: text.subtotal,
        shipping: text.shipping,
        total: text.total,
    };
    let checkout = CheckoutButton {
        enabled: true,
        label: format!("{CHECKOUT_LABEL} ({count} items)"),
    };
    (summary, checkout)
}

/// Projects `cart` and `selection` into a view. Selected ids that are not
/// in the cart are ignored. `flash` and `modal` are left for the caller.
pub fn render(cart: &Cart, selection: &Selection, pricing: &Pricing) -> CartView {
    let rows = cart
        .iter()
        .map(|item| render_row(item, selection.is_selected(item.id), &pricing.currency))
        .collect();
    let totals = Totals::of(cart, pricing.shipping);
    let (summary, checkout) = render_summary(cart, selection, pricing);

    CartView {
        rows,
        totals,
        totals_text: TotalsView::format(&totals, &pricing.currency),
        summary,
        checkout,
        empty_message: cart.is_empty().then_some(EMPTY_CART_MESSAGE),
        flash: false,
        modal: None,
    }
}
