//! Integration tests for the cart-checkout protocol.
//!
//! Every cart line becomes its own order+payment pair. In partial mode a
//! stale line fails alone and the cart is cleared afterwards; in atomic
//! mode any failure rolls the whole cart back and keeps it intact.

use paddyhouse_core::{PaymentMethod, ProductStatus};
use paddyhouse_integration_tests::{TestContext, dec};
use paddyhouse_server::db::{CartRepository, OrderRepository};
use paddyhouse_server::services::checkout::{
    CheckoutError, CheckoutMode, CheckoutService, DirectBuyRequest, LineFailureReason,
};

const DESTINATION: &str = "Lakeside, Pokhara";

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_each_cart_line_becomes_one_order() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let basmati = ctx.product(farmer.id, "Basmati", 10, "10").await;
    let jasmine = ctx.product(farmer.id, "Jasmine", 10, "5").await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add_or_merge(customer.id, basmati.id, 2)
        .await
        .expect("add basmati");
    cart.add_or_merge(customer.id, jasmine.id, 1)
        .await
        .expect("add jasmine");

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let summary = service
        .checkout_cart(customer.id, DESTINATION, PaymentMethod::Cash)
        .await
        .expect("checkout succeeds");

    assert_eq!(summary.placed.len(), 2);
    assert!(summary.failures.is_empty());
    // 2 * 10 + 1 * 5
    assert_eq!(summary.total_charged(), dec("25"));

    // One order per line, each with its own payment
    let orders_repo = OrderRepository::new(&ctx.pool);
    let orders = orders_repo
        .list_for_customer(customer.id)
        .await
        .expect("list orders");
    assert_eq!(orders.len(), 2);
    for placed in &summary.placed {
        let payment = orders_repo
            .payment_for_order(placed.order_id)
            .await
            .expect("get payment")
            .expect("payment exists");
        assert_eq!(payment.amount, placed.amount);
    }

    // Stock moved, cart emptied
    assert_eq!(ctx.reload_product(&basmati).await.quantity_kg, 8);
    assert_eq!(ctx.reload_product(&jasmine).await.quantity_kg, 9);
    assert!(cart.list(customer.id).await.expect("list").is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("sita").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let err = service
        .checkout_cart(customer.id, DESTINATION, PaymentMethod::Cash)
        .await
        .expect_err("empty cart");
    assert!(matches!(err, CheckoutError::EmptyCart));
}

// ============================================================================
// Partial Mode
// ============================================================================

#[tokio::test]
async fn test_partial_mode_commits_good_lines_and_reports_stale_ones() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let sita = ctx.customer("sita").await;
    let gita = ctx.customer("gita").await;
    let basmati = ctx.product(farmer.id, "Basmati", 10, "10").await;
    let jasmine = ctx.product(farmer.id, "Jasmine", 5, "5").await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add_or_merge(sita.id, basmati.id, 2)
        .await
        .expect("add basmati");
    cart.add_or_merge(sita.id, jasmine.id, 4)
        .await
        .expect("add jasmine");

    // Another customer drains the jasmine stock between cart-add and
    // checkout.
    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    service
        .direct_buy(
            gita.id,
            &DirectBuyRequest {
                product_id: jasmine.id,
                quantity_kg: 3,
                destination: DESTINATION.to_string(),
                method: PaymentMethod::Cash,
            },
        )
        .await
        .expect("competing buy succeeds");

    let summary = service
        .checkout_cart(sita.id, DESTINATION, PaymentMethod::Cash)
        .await
        .expect("checkout runs");

    // Basmati committed, jasmine failed with the commit-time stock
    assert_eq!(summary.placed.len(), 1);
    assert_eq!(summary.placed[0].product_id, basmati.id);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].product_id, jasmine.id);
    assert!(matches!(
        summary.failures[0].reason,
        LineFailureReason::InsufficientStock { available: 2 }
    ));
    assert_eq!(summary.total_charged(), dec("20"));

    // The failed line produced nothing: jasmine stock untouched by sita
    assert_eq!(ctx.reload_product(&jasmine).await.quantity_kg, 2);
    assert_eq!(ctx.reload_product(&basmati).await.quantity_kg, 8);

    // Cart is cleared regardless of the failure
    assert!(cart.list(sita.id).await.expect("list").is_empty());

    // Only the committed line shows up in sita's history
    let orders = OrderRepository::new(&ctx.pool)
        .list_for_customer(sita.id)
        .await
        .expect("list orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order.product_id, basmati.id);
}

// ============================================================================
// Atomic Mode
// ============================================================================

#[tokio::test]
async fn test_atomic_mode_rolls_back_everything_and_keeps_cart() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let sita = ctx.customer("sita").await;
    let gita = ctx.customer("gita").await;
    let basmati = ctx.product(farmer.id, "Basmati", 10, "10").await;
    let jasmine = ctx.product(farmer.id, "Jasmine", 5, "5").await;

    let cart = CartRepository::new(&ctx.pool);
    cart.add_or_merge(sita.id, basmati.id, 2)
        .await
        .expect("add basmati");
    cart.add_or_merge(sita.id, jasmine.id, 4)
        .await
        .expect("add jasmine");

    // Drain jasmine under sita's cart
    CheckoutService::new(&ctx.pool, CheckoutMode::Partial)
        .direct_buy(
            gita.id,
            &DirectBuyRequest {
                product_id: jasmine.id,
                quantity_kg: 3,
                destination: DESTINATION.to_string(),
                method: PaymentMethod::Cash,
            },
        )
        .await
        .expect("competing buy succeeds");

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Atomic);
    let err = service
        .checkout_cart(sita.id, DESTINATION, PaymentMethod::Cash)
        .await
        .expect_err("atomic checkout fails whole");
    assert!(matches!(
        err,
        CheckoutError::InsufficientStock { available: 2 }
    ));

    // Nothing committed: basmati stock untouched, no orders, cart intact
    assert_eq!(ctx.reload_product(&basmati).await.quantity_kg, 10);
    assert_eq!(ctx.reload_product(&basmati).await.status, ProductStatus::Available);
    assert!(
        OrderRepository::new(&ctx.pool)
            .list_for_customer(sita.id)
            .await
            .expect("list orders")
            .is_empty()
    );
    assert_eq!(cart.list(sita.id).await.expect("list").len(), 2);
}
