//! Integration tests for the catalog and the ledger views.

use paddyhouse_core::{PaymentMethod, ProductStatus};
use paddyhouse_integration_tests::TestContext;
use paddyhouse_server::db::{OrderRepository, ProductRepository};
use paddyhouse_server::services::checkout::{CheckoutMode, CheckoutService, DirectBuyRequest};

#[tokio::test]
async fn test_zero_quantity_listing_starts_sold_out() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;

    let product = ctx.product(farmer.id, "Basmati", 0, "100").await;
    assert_eq!(product.status, ProductStatus::SoldOut);

    // Sold-out listings never reach the browse view
    let available = ProductRepository::new(&ctx.pool)
        .list_available()
        .await
        .expect("list available");
    assert!(available.is_empty());
}

#[tokio::test]
async fn test_browse_view_joins_farmer_name() {
    let ctx = TestContext::new().await;
    let farmer = ctx.farmer("ram").await;
    ctx.product(farmer.id, "Basmati", 10, "100").await;

    let available = ProductRepository::new(&ctx.pool)
        .list_available()
        .await
        .expect("list available");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].farmer_name, "Test Farmer");
    assert_eq!(available[0].product.name, "Basmati");
}

#[tokio::test]
async fn test_farmer_delete_is_scoped_to_owner() {
    let ctx = TestContext::new().await;
    let ram = ctx.farmer("ram").await;
    let hari = ctx.farmer("hari").await;
    let product = ctx.product(ram.id, "Basmati", 10, "100").await;

    let products = ProductRepository::new(&ctx.pool);

    // Another farmer cannot withdraw ram's listing
    assert!(!products.delete(product.id, hari.id).await.expect("delete runs"));
    assert!(products.get(product.id).await.expect("get").is_some());

    // The owner can
    assert!(products.delete(product.id, ram.id).await.expect("delete runs"));
    assert!(products.get(product.id).await.expect("get").is_none());
}

#[tokio::test]
async fn test_withdrawal_cascades_carts_but_keeps_order_history() {
    let ctx = TestContext::new().await;
    let ram = ctx.farmer("ram").await;
    let sita = ctx.customer("sita").await;
    let product = ctx.product(ram.id, "Basmati", 10, "100").await;

    // One committed order, one pending cart line
    CheckoutService::new(&ctx.pool, CheckoutMode::Partial)
        .direct_buy(
            sita.id,
            &DirectBuyRequest {
                product_id: product.id,
                quantity_kg: 1,
                destination: "Lakeside".to_string(),
                method: PaymentMethod::Cash,
            },
        )
        .await
        .expect("buy succeeds");
    let cart = paddyhouse_server::db::CartRepository::new(&ctx.pool);
    cart.add_or_merge(sita.id, product.id, 2)
        .await
        .expect("add to cart");

    assert!(
        ProductRepository::new(&ctx.pool)
            .delete(product.id, ram.id)
            .await
            .expect("delete runs")
    );

    // Cart line went with the product; the ledger did not
    assert!(cart.list(sita.id).await.expect("list").is_empty());
    let orders = OrderRepository::new(&ctx.pool)
        .list_for_customer(sita.id)
        .await
        .expect("list orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product_name, "(withdrawn)");
}

#[tokio::test]
async fn test_farmer_and_admin_order_views() {
    let ctx = TestContext::new().await;
    let ram = ctx.farmer("ram").await;
    let hari = ctx.farmer("hari").await;
    let sita = ctx.customer("sita").await;
    let rams_rice = ctx.product(ram.id, "Basmati", 10, "100").await;
    let haris_rice = ctx.product(hari.id, "Jasmine", 10, "50").await;

    let service = CheckoutService::new(&ctx.pool, CheckoutMode::Partial);
    for product_id in [rams_rice.id, haris_rice.id] {
        service
            .direct_buy(
                sita.id,
                &DirectBuyRequest {
                    product_id,
                    quantity_kg: 1,
                    destination: "Lakeside".to_string(),
                    method: PaymentMethod::Cash,
                },
            )
            .await
            .expect("buy succeeds");
    }

    let orders = OrderRepository::new(&ctx.pool);

    // Each farmer sees only orders on their own produce
    let rams_orders = orders.list_for_farmer(ram.id).await.expect("farmer view");
    assert_eq!(rams_orders.len(), 1);
    assert_eq!(rams_orders[0].product_name, "Basmati");
    assert_eq!(rams_orders[0].customer_name, "Test Customer");

    // The admin view joins everything
    let all = orders.list_all().await.expect("admin view");
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|o| o.farmer_name == "Test Farmer"));
    assert!(
        all.iter()
            .all(|o| o.customer_name == "Test Customer")
    );
}
