mod common;

use common::TestApp;
use rust_decimal_macros::dec;

// Concurrent sales on one product must serialize at the store: with stock 10
// and 20 competing single-unit sales, exactly 10 succeed and stock never goes
// negative.
#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let app = TestApp::new().await;

    let product = app
        .state
        .catalog
        .create_product("Contended".to_string(), None, dec!(1.0), 10)
        .await
        .unwrap();

    let mut tasks = vec![];
    for _ in 0..20 {
        let stock = app.state.stock.clone();
        let id = product.id;
        tasks.push(tokio::spawn(
            async move { stock.record_sale(id, 1).await.is_ok() },
        ));
    }

    let mut success = 0;
    for t in tasks {
        if t.await.unwrap_or(false) {
            success += 1;
        }
    }
    assert_eq!(
        success, 10,
        "exactly 10 sales should succeed; got {}",
        success
    );

    let after = app.state.catalog.get_product(product.id).await.unwrap();
    assert_eq!(after.stock, 0);

    let history = app.state.ledger.list_for_product(product.id).await.unwrap();
    // opening BUY plus ten SELLs; failed sales left no entries
    assert_eq!(history.len(), 11);
}

// Two sales that together equal the available stock both succeed when run
// concurrently; the ledger never records more than was on hand.
#[tokio::test]
async fn concurrent_sales_splitting_stock_both_succeed() {
    let app = TestApp::new().await;

    let product = app
        .state
        .catalog
        .create_product("Split".to_string(), None, dec!(1.0), 10)
        .await
        .unwrap();

    let s1 = app.state.stock.clone();
    let s2 = app.state.stock.clone();
    let id = product.id;

    let (r1, r2) = tokio::join!(s1.record_sale(id, 6), s2.record_sale(id, 4));
    assert!(r1.is_ok());
    assert!(r2.is_ok());

    let after = app.state.catalog.get_product(id).await.unwrap();
    assert_eq!(after.stock, 0);
}

// Mixed concurrent restocks and sales leave the stock cache equal to the
// signed ledger sum.
#[tokio::test]
async fn concurrent_mixed_traffic_keeps_ledger_consistent() {
    let app = TestApp::new().await;

    let product = app
        .state
        .catalog
        .create_product("Mixed".to_string(), None, dec!(1.0), 50)
        .await
        .unwrap();

    let mut tasks = vec![];
    for i in 0..30 {
        let stock = app.state.stock.clone();
        let id = product.id;
        tasks.push(tokio::spawn(async move {
            if i % 3 == 0 {
                stock.record_restock(id, 2).await.map(|_| ())
            } else {
                stock.record_sale(id, 1).await.map(|_| ())
            }
        }));
    }
    for t in tasks {
        let _ = t.await.unwrap();
    }

    let history = app.state.ledger.list_for_product(product.id).await.unwrap();
    let signed_sum: i32 = history
        .iter()
        .map(|m| match m.movement_type {
            stockroom_api::entities::MovementType::Buy => m.quantity,
            stockroom_api::entities::MovementType::Sell => -m.quantity,
        })
        .sum();

    let after = app.state.catalog.get_product(product.id).await.unwrap();
    assert_eq!(after.stock, signed_sum);
    assert!(after.stock >= 0);
}
