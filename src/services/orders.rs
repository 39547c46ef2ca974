use crate::{
    entities::{
        cart_item, order,
        order::OrderStatus,
        order_item, product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    Paginated,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// The cart-to-order engine.
///
/// `create_order` converts a user's selected cart lines into an immutable
/// order inside one transaction: validate ownership, snapshot product
/// name/price, insert the order and its items, and consume the cart lines.
/// Any failure rolls the whole unit back, leaving the cart untouched.
/// `pay_order` is the single status transition in scope.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub total_price: Decimal,
    pub status: i32,
    pub create_time: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product: OrderItemProduct,
    pub quantity: i32,
}

/// Line-item view: name and price come from the immutable snapshot taken at
/// order creation; only the image is read from the live catalog for display.
#[derive(Debug, Serialize)]
pub struct OrderItemProduct {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub main_image: String,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create an order from the given cart line ids.
    ///
    /// Cart ids not owned by `user_id` are silently dropped; if that leaves
    /// nothing, the call fails with not-found. A product missing anywhere in
    /// the batch fails the whole batch before any write. On success the
    /// consumed cart lines are gone and the order total equals the sum of
    /// the snapshotted line prices.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn create_order(
        &self,
        user_id: i32,
        cart_ids: &[i32],
    ) -> Result<i32, ServiceError> {
        if cart_ids.is_empty() {
            return Err(ServiceError::Validation(
                "no cart items selected".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        // Ownership scoping happens in the query itself: ids belonging to
        // other users simply do not come back.
        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::Id.is_in(cart_ids.iter().copied()))
            .filter(cart_item::Column::UserId.eq(user_id))
            .all(&txn)
            .await?;
        if lines.is_empty() {
            return Err(ServiceError::NotFound(
                "no matching cart items".to_string(),
            ));
        }

        let product_ids: Vec<i32> = lines.iter().map(|line| line.product_id).collect();
        let products: HashMap<i32, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // All-or-nothing: one vanished product aborts the entire batch
        // before anything is written.
        let mut total_price = Decimal::ZERO;
        for line in &lines {
            let product = products.get(&line.product_id).ok_or_else(|| {
                ServiceError::NotFound(format!("product {} no longer exists", line.product_id))
            })?;
            total_price += product.price * Decimal::from(line.quantity);
        }

        let new_order = order::ActiveModel {
            user_id: Set(user_id),
            total_price: Set(total_price),
            status: Set(OrderStatus::Created),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let snapshots: Vec<order_item::ActiveModel> = lines
            .iter()
            .map(|line| {
                let product = &products[&line.product_id];
                order_item::ActiveModel {
                    order_id: Set(new_order.id),
                    product_id: Set(product.id),
                    product_name: Set(product.name.clone()),
                    product_price: Set(product.price),
                    quantity: Set(line.quantity),
                    ..Default::default()
                }
            })
            .collect();
        order_item::Entity::insert_many(snapshots).exec(&txn).await?;

        // Consume exactly the lines we read. A concurrent create racing on
        // the same lines loses here: its delete matches fewer rows and the
        // transaction rolls back on drop.
        let owned_ids: Vec<i32> = lines.iter().map(|line| line.id).collect();
        let deleted = cart_item::Entity::delete_many()
            .filter(cart_item::Column::Id.is_in(owned_ids))
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected != lines.len() as u64 {
            return Err(ServiceError::NotFound(
                "cart items were consumed by another request".to_string(),
            ));
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated {
                order_id: new_order.id,
                user_id,
            })
            .await;

        info!(
            order_id = new_order.id,
            total = %total_price,
            lines = lines.len(),
            "order created"
        );
        Ok(new_order.id)
    }

    /// Transition an order from Created to Paid, exactly once.
    ///
    /// The update is scoped to `(id, user_id, status = Created)` so a
    /// missing order, someone else's order, and an already-paid order all
    /// collapse into the same not-found result.
    #[instrument(skip(self))]
    pub async fn pay_order(&self, user_id: i32, order_id: i32) -> Result<(), ServiceError> {
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Paid))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::Status.eq(OrderStatus::Created))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "no payable order found".to_string(),
            ));
        }

        self.event_sender
            .send_or_log(Event::OrderPaid { order_id, user_id })
            .await;

        info!(order_id, "order paid");
        Ok(())
    }

    /// Page through the user's orders, newest first, each joined with its
    /// item snapshots. Item images are enriched from the live catalog at
    /// read time; snapshot name/price are served as stored.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        user_id: i32,
        page: u64,
        size: u64,
    ) -> Result<Paginated<OrderResponse>, ServiceError> {
        let page = page.max(1);
        let size = size.max(1);

        let paginator = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::Id)
            .paginate(&*self.db, size);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
        let items = if order_ids.is_empty() {
            Vec::new()
        } else {
            order_item::Entity::find()
                .filter(order_item::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_item::Column::Id)
                .all(&*self.db)
                .await?
        };

        let product_ids: Vec<i32> = items.iter().map(|item| item.product_id).collect();
        let images: HashMap<i32, String> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            product::Entity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.main_image))
                .collect()
        };

        let mut items_by_order: HashMap<i32, Vec<OrderItemResponse>> = HashMap::new();
        for item in items {
            let response = OrderItemResponse {
                id: item.id,
                product: OrderItemProduct {
                    id: item.product_id,
                    name: item.product_name,
                    price: item.product_price,
                    main_image: images.get(&item.product_id).cloned().unwrap_or_default(),
                },
                quantity: item.quantity,
            };
            items_by_order.entry(item.order_id).or_default().push(response);
        }

        let list = orders
            .into_iter()
            .map(|o| OrderResponse {
                id: o.id,
                total_price: o.total_price,
                status: o.status.to_value(),
                create_time: o.created_at.format("%Y-%m-%d %H:%M").to_string(),
                items: items_by_order.remove(&o.id).unwrap_or_default(),
            })
            .collect();

        Ok(Paginated::new(list, page, size, total))
    }
}
