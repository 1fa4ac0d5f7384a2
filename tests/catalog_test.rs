mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use stockroom_api::errors::ServiceError;

#[tokio::test]
async fn create_and_fetch_product() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let created = catalog
        .create_product(
            "Widget".to_string(),
            Some("A widget".to_string()),
            dec!(5.00),
            10,
        )
        .await
        .expect("create");

    assert_eq!(created.name, "Widget");
    assert_eq!(created.price, dec!(5.00));
    assert_eq!(created.stock, 10);

    let fetched = catalog.get_product(created.id).await.expect("get");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, created.name);
    assert_eq!(fetched.price, created.price);
    assert_eq!(fetched.stock, created.stock);
}

#[tokio::test]
async fn create_seeds_opening_buy_movement() {
    let app = TestApp::new().await;

    let created = app
        .state
        .catalog
        .create_product("Widget".to_string(), None, dec!(5.00), 10)
        .await
        .expect("create");

    let history = app
        .state
        .ledger
        .list_for_product(created.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quantity, 10);
    assert_eq!(history[0].unit_price, dec!(5.00));
    assert_eq!(
        history[0].movement_type,
        stockroom_api::entities::MovementType::Buy
    );
}

#[tokio::test]
async fn create_with_zero_stock_writes_no_movement() {
    let app = TestApp::new().await;

    let created = app
        .state
        .catalog
        .create_product("Empty".to_string(), None, dec!(1.00), 0)
        .await
        .expect("create");

    let history = app
        .state
        .ledger
        .list_for_product(created.id)
        .await
        .expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let err = catalog
        .create_product("".to_string(), None, dec!(1.00), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = catalog
        .create_product("Widget".to_string(), None, dec!(-1.00), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = catalog
        .create_product("Widget".to_string(), None, dec!(1.00), -5)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn list_products_in_insertion_order() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let a = catalog
        .create_product("A".to_string(), None, dec!(1.00), 0)
        .await
        .unwrap();
    let b = catalog
        .create_product("B".to_string(), None, dec!(2.00), 0)
        .await
        .unwrap();
    let c = catalog
        .create_product("C".to_string(), None, dec!(3.00), 0)
        .await
        .unwrap();

    let products = catalog.list_products().await.unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn set_price_rejects_negative_and_keeps_old_price() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let product = catalog
        .create_product("Widget".to_string(), None, dec!(5.00), 0)
        .await
        .unwrap();

    let err = catalog.set_price(product.id, dec!(-1)).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let unchanged = catalog.get_product(product.id).await.unwrap();
    assert_eq!(unchanged.price, dec!(5.00));

    let updated = catalog.set_price(product.id, dec!(7.50)).await.unwrap();
    assert_eq!(updated.price, dec!(7.50));
    // price edits never touch stock
    assert_eq!(updated.stock, 0);
}

#[tokio::test]
async fn set_price_on_missing_product_is_not_found() {
    let app = TestApp::new().await;

    let err = app.state.catalog.set_price(999, dec!(1.00)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn update_product_edits_name_and_description() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let product = catalog
        .create_product("Widget".to_string(), None, dec!(5.00), 0)
        .await
        .unwrap();

    let updated = catalog
        .update_product(
            product.id,
            Some("Gadget".to_string()),
            Some("renamed".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Gadget");
    assert_eq!(updated.description.as_deref(), Some("renamed"));

    let err = catalog
        .update_product(product.id, Some("  ".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn delete_product_without_history_succeeds() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    let product = catalog
        .create_product("Widget".to_string(), None, dec!(5.00), 0)
        .await
        .unwrap();

    catalog.delete_product(product.id).await.expect("delete");

    let err = catalog.get_product(product.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_product_with_history_is_rejected() {
    let app = TestApp::new().await;
    let catalog = &app.state.catalog;

    // initial stock > 0 seeds an opening movement, so history exists
    let product = catalog
        .create_product("Widget".to_string(), None, dec!(5.00), 10)
        .await
        .unwrap();

    let err = catalog.delete_product(product.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // the product survives the rejected delete
    let still_there = catalog.get_product(product.id).await.unwrap();
    assert_eq!(still_there.stock, 10);
}

#[tokio::test]
async fn delete_missing_product_is_not_found() {
    let app = TestApp::new().await;

    let err = app.state.catalog.delete_product(42).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
