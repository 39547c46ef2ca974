mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use yougou_api::{entities::cart_item, errors::ServiceError};

#[tokio::test]
async fn add_creates_then_increments_line() {
    let app = TestApp::new().await;
    let user_id = app.create_user("shopper").await;
    let product_id = app.create_product("gadget", dec!(19.99)).await;
    let cart = &app.state.services.cart;

    cart.add(user_id, product_id, 1).await.unwrap();
    cart.add(user_id, product_id, 2).await.unwrap();

    let lines = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
}

#[tokio::test]
async fn add_unknown_product_fails() {
    let app = TestApp::new().await;
    let user_id = app.create_user("shopper").await;

    let err = app
        .state
        .services
        .cart
        .add(user_id, 9999, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn add_rejects_zero_quantity() {
    let app = TestApp::new().await;
    let user_id = app.create_user("shopper").await;
    let product_id = app.create_product("gadget", dec!(1.0)).await;

    let err = app
        .state
        .services
        .cart
        .add(user_id, product_id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn list_joins_current_product_and_skips_orphans() {
    let app = TestApp::new().await;
    let user_id = app.create_user("shopper").await;
    let kept = app.create_product("kept", dec!(10.0)).await;
    let doomed = app.create_product("doomed", dec!(5.0)).await;
    app.add_cart_line(user_id, kept, 2).await;
    app.add_cart_line(user_id, doomed, 1).await;

    yougou_api::entities::product::Entity::delete_by_id(doomed)
        .exec(&*app.state.db)
        .await
        .unwrap();

    let lines = app.state.services.cart.list(user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product.name, "kept");
    assert_eq!(lines[0].product.price, dec!(10.0));
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
async fn update_quantity_is_ownership_scoped_and_clamped() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner").await;
    let other = app.create_user("other").await;
    let product_id = app.create_product("gadget", dec!(10.0)).await;
    let line = app.add_cart_line(owner, product_id, 2).await;

    // A different user cannot touch the line.
    let err = app
        .state
        .services
        .cart
        .update_quantity(other, line, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Zero clamps to one.
    app.state
        .services
        .cart
        .update_quantity(owner, line, 0)
        .await
        .unwrap();
    let row = cart_item::Entity::find_by_id(line)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.quantity, 1);
}

#[tokio::test]
async fn add_bounds_the_accumulated_quantity() {
    let app = TestApp::new().await;
    let user_id = app.create_user("hoarder").await;
    let product_id = app.create_product("gadget", dec!(1.0)).await;
    let cart = &app.state.services.cart;

    // Single request above the cap is rejected outright.
    let err = cart.add(user_id, product_id, i32::MAX).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Accumulation across requests cannot cross the cap either.
    cart.add(user_id, product_id, 9000).await.unwrap();
    let err = cart.add(user_id, product_id, 9000).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let lines = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(lines[0].quantity, 9000);
}
