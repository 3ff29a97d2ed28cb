//! Tests for the catalog page: filters, wishlist, quick view and toasts.

use std::time::Duration;

use storefront::catalog::{Layout, ToastPhase};
use storefront_test::prelude::*;

fn visible(tab: &CatalogTab) -> Vec<u64> {
    tab.catalog.visible().iter().map(|p| p.id.0).collect()
}

#[test]
fn test_search_is_debounced() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();

    tab.catalog.search_input("g");
    tab.advance(Duration::from_millis(100));
    tab.catalog.search_input("gown");
    tab.advance(Duration::from_millis(179));
    assert_eq!(visible(&tab).len(), 6);

    tab.advance(Duration::from_millis(1));
    assert_eq!(tab.catalog.query().query, "gown");
    assert_eq!(visible(&tab), vec![1, 4]);
}

#[test]
fn test_clear_filters_drops_pending_search() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();

    tab.catalog.set_category("Men", true);
    tab.catalog.set_sort(SortOrder::PriceAsc);
    tab.catalog.set_layout(Layout::List);
    assert_eq!(visible(&tab), vec![2, 6]);

    tab.catalog.search_input("sherwani");
    tab.catalog.clear_filters();
    tab.advance(Duration::from_secs(1));

    assert_eq!(tab.catalog.query(), &CatalogQuery::default());
    assert_eq!(visible(&tab).len(), 6);
}

#[test]
fn test_wishlist_persists_across_tabs() {
    let harness = TestHarness::new();
    let mut first = harness.open_catalog_tab();

    assert!(first.catalog.toggle_wishlist(ProductId(3)));
    assert!(first.catalog.toggle_wishlist(ProductId(5)));
    assert!(!first.catalog.toggle_wishlist(ProductId(3)));

    let second = harness.open_catalog_tab();
    let ids: Vec<u64> = second.catalog.wishlist().ids().map(|id| id.0).collect();
    assert_eq!(ids, vec![5]);
}

#[test]
fn test_quick_view_add_and_toast() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();

    assert!(!tab.catalog.open_quick_view(ProductId(42)));
    assert!(tab.catalog.open_quick_view(ProductId(2)));
    assert_eq!(tab.catalog.toggle_quick_view_wishlist(), Some(true));
    assert!(tab.catalog.add_from_quick_view());
    assert!(tab.catalog.quick_view().is_none());
    assert_eq!(tab.catalog.toggle_quick_view_wishlist(), None);

    let toast = tab.catalog.toast().cloned();
    assert_eq!(
        toast.as_ref().map(|t| t.text.as_str()),
        Some("Casual Fall Wedding Attire added to cart")
    );
    assert_eq!(toast.map(|t| t.phase), Some(ToastPhase::Visible));

    tab.advance(Duration::from_millis(1500));
    assert_eq!(tab.catalog.toast().map(|t| t.phase), Some(ToastPhase::Fading));
    tab.advance(Duration::from_millis(300));
    assert!(tab.catalog.toast().is_none());
    assert_eq!(tab.badge_text(), "1");
}

#[test]
fn test_first_add_skips_seed() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();
    assert_eq!(tab.badge_text(), "");

    assert!(tab.catalog.add_to_cart(ProductId(3), 2));
    assert_eq!(tab.badge_text(), "2");

    let cart = harness.open_cart_tab();
    let rows: Vec<(u64, u32)> = cart
        .controller
        .cart()
        .iter()
        .map(|item| (item.id.0, item.qty.get()))
        .collect();
    assert_eq!(rows, vec![(3, 2)]);
    assert_eq!(cart.badge_text(), "2");
}

#[test]
fn test_new_toast_replaces_old() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();

    tab.catalog.add_to_cart(ProductId(1), 1);
    tab.advance(Duration::from_millis(1000));
    tab.catalog.add_to_cart(ProductId(6), 1);
    tab.advance(Duration::from_millis(1000));

    let toast = tab.catalog.toast();
    assert_eq!(toast.map(|t| t.text.as_str()), Some("Groom Sherwani added to cart"));
    assert_eq!(toast.map(|t| t.phase), Some(ToastPhase::Visible));
}

#[test]
fn test_unknown_product_is_not_added() {
    let harness = TestHarness::new();
    let mut tab = harness.open_catalog_tab();

    assert!(!tab.catalog.add_to_cart(ProductId(77), 1));
    assert!(tab.catalog.toast().is_none());
}

#[test]
fn test_price_formatting() {
    let harness = TestHarness::new();
    let tab = harness.open_catalog_tab();

    let prices: Vec<String> = tab
        .catalog
        .products()
        .iter()
        .map(|p| tab.catalog.format_price(p))
        .collect();
    assert_eq!(prices[0], "$200.00");
    assert_eq!(prices[5], "$199.00");
}

#[test]
fn test_malformed_wishlist_starts_empty() {
    let harness = TestHarness::new();
    harness
        .storage()
        .set_item(&harness.config().wishlist_key, "[1, \"two\"")
        .expect("write");

    let tab = harness.open_catalog_tab();
    assert_eq!(tab.catalog.wishlist().ids().count(), 0);
}
