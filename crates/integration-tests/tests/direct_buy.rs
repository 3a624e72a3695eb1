//! Integration tests for the direct-buy protocol.
//!
//! Direct buy commits exactly one order, one payment, and one stock
//! decrement in a single transaction, or nothing at all.

use paddyhouse_core::{OrderStatus, PaymentMethod, PaymentStatus, ProductStatus};
use paddyhouse_integration_tests::{TestContext, dec};
use paddyhouse_server::db::OrderRepository;
use paddyhouse_server::services::checkout::{
    CheckoutError, CheckoutMode, CheckoutService, DirectBuyRequest,
};

fn cash_buy(product_id: paddyhouse_core::ProductId, quantity_kg: i64) -> DirectBuyRequest {
    DirectBuyRequest {
        product_id,
        quantity_kg,
        destination: "Ward 4, Pokhara".to_string(),
        method: PaymentMethod::Cash,
    }
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_direct_buy_commits_order_payment_and_decrement() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 10, "120.50").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let placed = service
        .direct_buy(customer.id, &cash_buy(product.id, 3))
        .await
        .expect("direct buy succeeds");

    // Amount is quantity times unit price at purchase time
    assert_eq!(placed.amount, dec("361.50"));
    assert!(!placed.sold_out);

    // Stock decremented, still available
    let after = ctx.reload_product(&product).await;
    assert_eq!(after.quantity_kg, 7);
    assert_eq!(after.status, ProductStatus::Available);

    // Order and payment exist as a pair with matching amounts
    let orders = OrderRepository::new(&ctx.pool);
    let order = orders
        .get(placed.order_id)
        .await
        .expect("get order")
        .expect("order exists");
    assert_eq!(order.customer_id, customer.id);
    assert_eq!(order.product_id, product.id);
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.amount, dec("361.50"));
    assert_eq!(order.destination, "Ward 4, Pokhara");

    let payment = orders
        .payment_for_order(placed.order_id)
        .await
        .expect("get payment")
        .expect("payment exists");
    assert_eq!(payment.amount, order.amount);
    assert_eq!(payment.method, PaymentMethod::Cash);
    assert_eq!(payment.status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_buying_last_units_flips_sold_out() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Jasmine", 5, "90").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let placed = service
        .direct_buy(customer.id, &cash_buy(product.id, 5))
        .await
        .expect("direct buy succeeds");

    assert!(placed.sold_out);

    let after = ctx.reload_product(&product).await;
    assert_eq!(after.quantity_kg, 0);
    assert_eq!(after.status, ProductStatus::SoldOut);

    // A sold-out product refuses further purchases
    let err = service
        .direct_buy(customer.id, &cash_buy(product.id, 1))
        .await
        .expect_err("sold out product cannot be bought");
    assert!(matches!(
        err,
        CheckoutError::InsufficientStock { available: 0 }
    ));
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_insufficient_stock_commits_nothing() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 4, "100").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let err = service
        .direct_buy(customer.id, &cash_buy(product.id, 5))
        .await
        .expect_err("over-stock buy is rejected");
    assert!(matches!(
        err,
        CheckoutError::InsufficientStock { available: 4 }
    ));

    // Nothing changed: no order, no stock movement
    let after = ctx.reload_product(&product).await;
    assert_eq!(after.quantity_kg, 4);
    let orders = OrderRepository::new(&ctx.pool)
        .list_for_customer(customer.id)
        .await
        .expect("list orders");
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_non_positive_quantity_is_rejected() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let customer = ctx.customer("sita").await;
    let product = ctx.product(farmer.id, "Basmati", 4, "100").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);

    for quantity in [0, -3] {
        let err = service
            .direct_buy(customer.id, &cash_buy(product.id, quantity))
            .await
            .expect_err("non-positive quantity is rejected");
        assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
    }

    let after = ctx.reload_product(&product).await;
    assert_eq!(after.quantity_kg, 4);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let ctx = TestContext::new().await;
    let customer = ctx.customer("sita").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    let err = service
        .direct_buy(
            customer.id,
            &cash_buy(paddyhouse_core::ProductId::new(9999), 1),
        )
        .await
        .expect_err("unknown product");
    assert!(matches!(err, CheckoutError::NotFound));
}

// ============================================================================
// Races
// ============================================================================

#[tokio::test]
async fn test_concurrent_buyers_cannot_oversell() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    let alice = ctx.customer("alice").await;
    let bob = ctx.customer("bob").await;
    let product = ctx.product(farmer.id, "Basmati", 5, "100").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);

    // Both want all 5 kg at once. The conditional decrement admits
    // exactly one.
    let alice_buy = cash_buy(product.id, 5);
    let bob_buy = cash_buy(product.id, 5);
    let (a, b) = tokio::join!(
        service.direct_buy(alice.id, &alice_buy),
        service.direct_buy(bob.id, &bob_buy),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one buyer wins");

    let after = ctx.reload_product(&product).await;
    assert_eq!(after.quantity_kg, 0);
    assert_eq!(after.status, ProductStatus::SoldOut);
}
