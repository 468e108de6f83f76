//! Integration tests for the cart store.

use rust_decimal::Decimal;

use bazaar_core::{Role, UserId};
use bazaar_integration_tests::TestMarket;

#[tokio::test]
async fn test_add_then_remove_returns_to_previous_length() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let product = market.product(UserId::random(), 20, None);
    let cart = market.storefront.cart();

    cart.add_to_cart(customer.id, product.id, 1, None)
        .await
        .expect("add should succeed");
    let before = cart.items().len();

    let line = cart
        .add_to_cart(customer.id, product.id, 2, None)
        .await
        .expect("add should succeed");
    cart.remove_item(line.id).await.expect("remove should succeed");

    assert_eq!(cart.items().len(), before);
}

#[tokio::test]
async fn test_total_follows_discount_and_quantity() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let seller = UserId::random();
    let discounted = market.product(seller, 100, Some(75));
    let full_price = market.product(seller, 30, None);
    let cart = market.storefront.cart();

    cart.add_to_cart(customer.id, discounted.id, 2, None).await.expect("add");
    cart.add_to_cart(customer.id, full_price.id, 3, None).await.expect("add");

    // 2 × 75 + 3 × 30
    assert_eq!(cart.total(), Decimal::from(240));
    assert_eq!(cart.item_count(), 5);
}

#[tokio::test]
async fn test_update_quantity_changes_only_target_line() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let product = market.product(UserId::random(), 10, None);
    let cart = market.storefront.cart();

    let a = cart.add_to_cart(customer.id, product.id, 1, None).await.expect("add");
    let b = cart.add_to_cart(customer.id, product.id, 1, None).await.expect("add");

    cart.update_quantity(a.id, 5).await.expect("update should succeed");

    // Remote and local agree after a refetch.
    cart.fetch_cart(customer.id).await.expect("fetch should succeed");
    let items = cart.items();
    let quantity_of = |id| {
        items
            .iter()
            .find(|line| line.id == id)
            .map(|line| line.quantity)
    };
    assert_eq!(quantity_of(a.id), Some(5));
    assert_eq!(quantity_of(b.id), Some(1));
}

#[tokio::test]
async fn test_snapshot_is_stale_until_refetch() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let product = market.product(UserId::random(), 50, None);
    let cart = market.storefront.cart();

    cart.add_to_cart(customer.id, product.id, 1, None).await.expect("add");
    market
        .backend
        .update_product(product.id, |p| p.discount_price = Some(Decimal::from(40)));

    assert_eq!(cart.total(), Decimal::from(50));
    cart.fetch_cart(customer.id).await.expect("fetch");
    assert_eq!(cart.total(), Decimal::from(40));
}

#[tokio::test]
async fn test_fetch_failure_surfaces_and_keeps_state() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let product = market.product(UserId::random(), 15, None);
    let cart = market.storefront.cart();
    cart.add_to_cart(customer.id, product.id, 1, None).await.expect("add");

    market.backend.set_offline(true);
    let result = cart.fetch_cart(customer.id).await;

    assert!(result.is_err());
    assert_eq!(cart.items().len(), 1);
    assert!(!cart.is_loading());
}

#[tokio::test]
async fn test_sign_out_resets_cart_but_keeps_remote_rows() {
    let market = TestMarket::new();
    let customer = market.signed_in("shopper@example.com", Role::Customer).await;
    let product = market.product(UserId::random(), 15, None);
    market
        .storefront
        .cart()
        .add_to_cart(customer.id, product.id, 1, None)
        .await
        .expect("add");

    market.storefront.sign_out().await;

    assert!(market.storefront.cart().items().is_empty());
    assert_eq!(market.backend.cart_row_count(customer.id), 1);
}
