//! Tests for the cart page: quantities, totals and the order summary.

use storefront::binder::SummaryState;
use storefront_test::prelude::*;

fn two_item_seed() -> StorefrontConfig {
    StorefrontConfig {
        seed: vec![
            LineItem::new(1, "Elegant Wedding Dress", 200.0),
            LineItem::new(2, "Pretty Ball Gown", 150.0).with_qty(2),
        ],
        ..StorefrontConfig::default()
    }
}

fn qty(tab: &CartTab, id: u64) -> u32 {
    tab.controller
        .cart()
        .get(ProductId(id))
        .map(|item| item.qty.get())
        .unwrap_or(0)
}

#[test]
fn test_setting_quantity_updates_whole_cart_totals() {
    let harness = TestHarness::with_config(two_item_seed());
    let mut tab = harness.open_cart_tab();

    tab.handle(CartEvent::QuantityInput {
        id: ProductId(2),
        raw: "5".into(),
    });

    let view = tab.controller.view();
    assert_eq!(view.totals.subtotal, 950.0);
    assert_eq!(view.totals_text.subtotal, "$950.00");
    assert_eq!(view.totals_text.total, "$975.00");
    assert_eq!(view.row(ProductId(2)).map(|r| r.subtotal.as_str()), Some("$750.00"));
}

#[test]
fn test_selecting_one_row_drives_summary() {
    let harness = TestHarness::with_config(two_item_seed());
    let mut tab = harness.open_cart_tab();

    tab.handle(CartEvent::ToggleSelected { id: ProductId(1) });

    let view = tab.controller.view();
    assert_eq!(view.summary.state, SummaryState::Selected { count: 1 });
    assert_eq!(view.summary.subtotal, "$200.00");
    assert_eq!(view.summary.total, "$225.00");
    assert!(view.checkout.enabled);
    assert!(view.checkout.label.ends_with("(1 items)"));
}

#[test]
fn test_unselecting_everything_restores_placeholder() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();

    tab.handle(CartEvent::SetAllSelected(true));
    assert!(tab.controller.view().all_selected());
    assert_eq!(
        tab.controller.view().checkout.label,
        "Checkout (3 items)"
    );

    for id in [1, 4, 6] {
        tab.handle(CartEvent::ToggleSelected { id: ProductId(id) });
    }

    let view = tab.controller.view();
    assert_eq!(view.summary.state, SummaryState::Placeholder);
    assert_eq!(
        (
            view.summary.subtotal.as_str(),
            view.summary.shipping.as_str(),
            view.summary.total.as_str()
        ),
        ("-", "-", "-")
    );
    assert!(!view.checkout.enabled);
}

#[test]
fn test_malformed_quantity_input_is_clamped() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();

    for (raw, expected) in [("abc", 1), ("-5", 1), ("3.9", 3), ("", 1), (" 7 ", 7)] {
        tab.handle(CartEvent::QuantityInput {
            id: ProductId(6),
            raw: raw.into(),
        });
        assert_eq!(qty(&tab, 6), expected, "input {raw:?}");
        assert_eq!(
            tab.controller.view().row(ProductId(6)).map(|r| r.qty_text.clone()),
            Some(expected.to_string())
        );
    }
}

#[test]
fn test_increment_then_decrement_returns_to_original() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();
    let before = harness.raw_cart();

    for _ in 0..3 {
        tab.handle(CartEvent::Step {
            id: ProductId(4),
            direction: StepDirection::Increment,
        });
    }
    assert_eq!(qty(&tab, 4), 5);
    for _ in 0..3 {
        tab.handle(CartEvent::Step {
            id: ProductId(4),
            direction: StepDirection::Decrement,
        });
    }

    assert_eq!(qty(&tab, 4), 2);
    assert_eq!(harness.raw_cart(), before);
}

#[test]
fn test_decrement_is_floored_at_one() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();

    for _ in 0..4 {
        tab.handle(CartEvent::Step {
            id: ProductId(1),
            direction: StepDirection::Decrement,
        });
    }
    assert_eq!(qty(&tab, 1), 1);
}

#[test]
fn test_remove_missing_id_is_noop() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();
    let before = tab.controller.cart().clone();

    tab.handle(CartEvent::Remove { id: ProductId(99) });

    assert_eq!(tab.controller.cart(), &before);
}

#[test]
fn test_rows_follow_cart_order() {
    let harness = TestHarness::new();
    let tab = harness.open_cart_tab();

    let ids: Vec<u64> = tab.controller.view().rows.iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec![1, 4, 6]);
}

#[test]
fn test_removing_last_row_shows_empty_message() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();

    for id in [1, 4, 6] {
        tab.handle(CartEvent::Remove { id: ProductId(id) });
    }

    let view = tab.controller.view();
    assert!(view.is_empty());
    assert_eq!(view.empty_message, Some("Your cart is empty."));
    assert_eq!(harness.raw_cart().as_deref(), Some("[]"));
}

#[test]
fn test_row_click_on_control_does_not_toggle() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();

    for tag in ["input", "BUTTON", "a", "label"] {
        tab.handle(CartEvent::RowActivated {
            id: ProductId(1),
            activation: RowActivation::Click,
            target: TargetKind::from_tag(tag),
        });
    }
    assert!(tab.controller.selection().is_empty());

    tab.handle(CartEvent::RowActivated {
        id: ProductId(1),
        activation: RowActivation::Key(ActivationKey::from_key(" ")),
        target: TargetKind::from_tag("div"),
    });
    assert!(tab.controller.selection().is_selected(ProductId(1)));

    tab.handle(CartEvent::RowActivated {
        id: ProductId(1),
        activation: RowActivation::Key(ActivationKey::from_key("Tab")),
        target: TargetKind::Row,
    });
    assert!(tab.controller.selection().is_selected(ProductId(1)));
}

#[test]
fn test_flash_only_when_total_text_changes() {
    let harness = TestHarness::new();
    let mut tab = harness.open_cart_tab();
    assert!(!tab.controller.view().flash);

    tab.handle(CartEvent::ToggleSelected { id: ProductId(1) });
    assert!(tab.controller.view().flash);

    tab.handle(CartEvent::ToggleSelected { id: ProductId(4) });
    assert!(tab.controller.view().flash);

    // Same selection, same total.
    tab.handle(CartEvent::QuantityInput {
        id: ProductId(6),
        raw: "3".into(),
    });
    assert!(!tab.controller.view().flash);
}
