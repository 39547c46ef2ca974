mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, ActiveModelTrait};
use yougou_api::{
    entities::{cart_item, order, order::OrderStatus, order_item, product},
    errors::ServiceError,
};

#[tokio::test]
async fn create_order_snapshots_prices_and_consumes_cart() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;
    let product_a = app.create_product("product a", dec!(10.0)).await;
    let product_b = app.create_product("product b", dec!(20.0)).await;
    let line_1 = app.add_cart_line(user_id, product_a, 2).await;
    let line_2 = app.add_cart_line(user_id, product_b, 1).await;

    let order_id = app
        .state
        .services
        .orders
        .create_order(user_id, &[line_1, line_2])
        .await
        .expect("order creation failed");

    let created = order::Entity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("order row missing");
    assert_eq!(created.user_id, user_id);
    assert_eq!(created.status, OrderStatus::Created);
    assert_eq!(created.total_price, dec!(40.0));

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    let total: rust_decimal::Decimal = items
        .iter()
        .map(|i| i.product_price * rust_decimal::Decimal::from(i.quantity))
        .sum();
    assert_eq!(total, created.total_price);

    // Consumed lines are gone.
    let remaining = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn order_total_survives_later_price_changes() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;
    let product_id = app.create_product("volatile", dec!(100.0)).await;
    let line = app.add_cart_line(user_id, product_id, 1).await;

    let order_id = app
        .state
        .services
        .orders
        .create_order(user_id, &[line])
        .await
        .unwrap();

    // Reprice the product after the order exists.
    let model = product::Entity::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: product::ActiveModel = model.into();
    active.price = Set(dec!(999.0));
    active.update(&*app.state.db).await.unwrap();

    let page = app
        .state
        .services
        .orders
        .list_orders(user_id, 1, 10)
        .await
        .unwrap();
    let listed = page.list.iter().find(|o| o.id == order_id).unwrap();
    assert_eq!(listed.total_price, dec!(100.0));
    assert_eq!(listed.items[0].product.price, dec!(100.0));
}

#[tokio::test]
async fn empty_cart_selection_is_rejected() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;

    let err = app
        .state
        .services
        .orders
        .create_order(user_id, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn foreign_cart_lines_are_dropped_not_errored() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner").await;
    let intruder = app.create_user("intruder").await;
    let product_id = app.create_product("gadget", dec!(5.0)).await;
    let owned = app.add_cart_line(owner, product_id, 1).await;
    let foreign = app.add_cart_line(intruder, product_id, 3).await;

    // Mixed request: the foreign line is silently excluded.
    let order_id = app
        .state
        .services
        .orders
        .create_order(owner, &[owned, foreign])
        .await
        .unwrap();

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);

    // The intruder's line is untouched.
    let intruder_lines = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(intruder))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(intruder_lines, 1);
}

#[tokio::test]
async fn all_foreign_selection_fails_not_found() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner").await;
    let intruder = app.create_user("intruder").await;
    let product_id = app.create_product("gadget", dec!(5.0)).await;
    let foreign = app.add_cart_line(intruder, product_id, 1).await;

    let err = app
        .state
        .services
        .orders
        .create_order(owner, &[foreign])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn missing_product_aborts_whole_batch_without_writes() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;
    let kept = app.create_product("kept", dec!(10.0)).await;
    let doomed = app.create_product("doomed", dec!(20.0)).await;
    let line_1 = app.add_cart_line(user_id, kept, 1).await;
    let line_2 = app.add_cart_line(user_id, doomed, 1).await;

    // Remove one product from the catalog before ordering.
    product::Entity::delete_by_id(doomed)
        .exec(&*app.state.db)
        .await
        .unwrap();

    let err = app
        .state
        .services
        .orders
        .create_order(user_id, &[line_1, line_2])
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // No partial consumption: both lines still present, no order rows.
    let lines = cart_item::Entity::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(lines, 2);
    assert_eq!(order::Entity::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(
        order_item::Entity::find().count(&*app.state.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn pay_order_transitions_exactly_once() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;
    let product_id = app.create_product("gadget", dec!(10.0)).await;
    let line = app.add_cart_line(user_id, product_id, 1).await;
    let order_id = app
        .state
        .services
        .orders
        .create_order(user_id, &[line])
        .await
        .unwrap();

    app.state
        .services
        .orders
        .pay_order(user_id, order_id)
        .await
        .expect("first payment should succeed");

    let paid = order::Entity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    // Second call finds no Created row.
    let err = app
        .state
        .services
        .orders
        .pay_order(user_id, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let still_paid = order::Entity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_paid.status, OrderStatus::Paid);
}

#[tokio::test]
async fn pay_order_rejects_non_owner() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner").await;
    let other = app.create_user("other").await;
    let product_id = app.create_product("gadget", dec!(10.0)).await;
    let line = app.add_cart_line(owner, product_id, 1).await;
    let order_id = app
        .state
        .services
        .orders
        .create_order(owner, &[line])
        .await
        .unwrap();

    let err = app
        .state
        .services
        .orders
        .pay_order(other, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let untouched = order::Entity::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, OrderStatus::Created);
}

#[tokio::test]
async fn list_orders_paginates_descending() {
    let app = TestApp::new().await;
    let user_id = app.create_user("buyer").await;
    let product_id = app.create_product("gadget", dec!(10.0)).await;

    let mut created_ids = Vec::new();
    for _ in 0..5 {
        let line = app.add_cart_line(user_id, product_id, 1).await;
        let order_id = app
            .state
            .services
            .orders
            .create_order(user_id, &[line])
            .await
            .unwrap();
        created_ids.push(order_id);
    }

    let page_1 = app
        .state
        .services
        .orders
        .list_orders(user_id, 1, 2)
        .await
        .unwrap();
    assert_eq!(page_1.total, 5);
    assert_eq!(page_1.total_pages, 3);
    let ids_1: Vec<i32> = page_1.list.iter().map(|o| o.id).collect();
    assert_eq!(ids_1, vec![created_ids[4], created_ids[3]]);

    let page_3 = app
        .state
        .services
        .orders
        .list_orders(user_id, 3, 2)
        .await
        .unwrap();
    assert_eq!(page_3.list.len(), 1);
    assert_eq!(page_3.list[0].id, created_ids[0]);

    // Out-of-range page yields an empty list, not an error.
    let page_9 = app
        .state
        .services
        .orders
        .list_orders(user_id, 9, 2)
        .await
        .unwrap();
    assert!(page_9.list.is_empty());
}

#[tokio::test]
async fn list_orders_is_user_scoped() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let product_id = app.create_product("gadget", dec!(10.0)).await;
    let line = app.add_cart_line(alice, product_id, 1).await;
    app.state
        .services
        .orders
        .create_order(alice, &[line])
        .await
        .unwrap();

    let bobs = app
        .state
        .services
        .orders
        .list_orders(bob, 1, 10)
        .await
        .unwrap();
    assert_eq!(bobs.total, 0);
    assert!(bobs.list.is_empty());
}
