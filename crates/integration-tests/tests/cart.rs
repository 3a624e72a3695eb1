//! Integration tests for cart operations.
//!
//! A cart line is (customer, product, quantity); repeated adds merge,
//! and the merged quantity is validated against current stock at add
//! time. Removal is scoped to the owning customer.

use paddyhouse_integration_tests::{TestContext, dec};
use paddyhouse_server::db::CartRepository;
use paddyhouse_server::db::cart::CartAdd;
use paddyhouse_server::services::checkout::cart_total;

// ============================================================================
// Add & Merge
// ============================================================================

#[tokio::test]
async fn test_repeated_adds_merge_into_one_line() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 10, "100").await;

    let cart = CartRepository::new(&ctx.pool);

    let first = cart
        .add_or_merge(customer.id, product.id, 3)
        .await
        .expect("first add");
    let CartAdd::Added(first_item) = first else {
        panic!("first add accepted");
    };
    assert_eq!(first_item.quantity_kg, 3);

    let second = cart
        .add_or_merge(customer.id, product.id, 4)
        .await
        .expect("second add");
    let CartAdd::Added(merged) = second else {
        panic!("second add accepted");
    };

    // Same line, summed quantity
    assert_eq!(merged.id, first_item.id);
    assert_eq!(merged.quantity_kg, 7);

    let lines = cart.list(customer.id).await.expect("list cart");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item.quantity_kg, 7);
}

#[tokio::test]
async fn test_merge_exceeding_stock_is_rejected_and_line_untouched() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 7, "100").await;

    let cart = CartRepository::new(&ctx.pool);

    let first = cart
        .add_or_merge(customer.id, product.id, 4)
        .await
        .expect("first add");
    assert!(matches!(first, CartAdd::Added(_)));

    // 4 already in cart + 5 more would exceed stock of 7
    let second = cart
        .add_or_merge(customer.id, product.id, 5)
        .await
        .expect("second add runs");
    assert!(matches!(
        second,
        CartAdd::Insufficient {
            available: 7,
            in_cart: 4
        }
    ));

    // The existing line kept its quantity
    let lines = cart.list(customer.id).await.expect("list cart");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].item.quantity_kg, 4);
}

#[tokio::test]
async fn test_add_for_unknown_product_reports_missing() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("sita").await;

    let outcome = CartRepository::new(&ctx.pool)
        .add_or_merge(customer.id, paddyhouse_core::ProductId::new(404), 1)
        .await
        .expect("add runs");
    assert!(matches!(outcome, CartAdd::ProductMissing));
}

#[tokio::test]
async fn test_non_positive_add_is_rejected() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 7, "100").await;

    let cart = CartRepository::new(&ctx.pool);
    let outcome = cart
        .add_or_merge(customer.id, product.id, 0)
        .await
        .expect("add runs");
    assert!(matches!(outcome, CartAdd::Insufficient { .. }));

    assert!(cart.list(customer.id).await.expect("list cart").is_empty());
}

// ============================================================================
// Totals
// ============================================================================

#[tokio::test]
async fn test_cart_total_sums_line_amounts() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let basmati = ctx.product(farmer.id, "Basmati", 10, "120.50").await;
    let jasmine = ctx.product(farmer.id, "Jasmine", 10, "90").await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add_or_merge(customer.id, basmati.id, 2)
        .await
        .expect("add basmati");
    cart.add_or_merge(customer.id, jasmine.id, 3)
        .await
        .expect("add jasmine");

    let lines = cart.list(customer.id).await.expect("list cart");
    assert_eq!(lines.len(), 2);
    // 2 * 120.50 + 3 * 90 = 511.00
    assert_eq!(cart_total(&lines), dec("511.00"));
}

// ============================================================================
// Removal & Ownership
// ============================================================================

#[tokio::test]
async fn test_remove_is_scoped_to_owner() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let sita = ctx.customer("sita").await;
    let gita = ctx.customer("gita").await;
    let product = ctx.product(farmer.id, "Basmati", 10, "100").await;

    let cart = CartRepository::new(&ctx.pool);
    let CartAdd::Added(item) = cart
        .add_or_merge(sita.id, product.id, 2)
        .await
        .expect("add")
    else {
        panic!("add accepted");
    };

    // Another customer cannot remove sita's line
    let removed = cart.remove(item.id, gita.id).await.expect("remove runs");
    assert!(!removed);
    assert_eq!(cart.list(sita.id).await.expect("list").len(), 1);

    // The owner can
    let removed = cart.remove(item.id, sita.id).await.expect("remove runs");
    assert!(removed);
    assert!(cart.list(sita.id).await.expect("list").is_empty());
}
