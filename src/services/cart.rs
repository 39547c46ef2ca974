use crate::{
    entities::{cart_item, product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Upper bound on the quantity of a single cart line.
const MAX_LINE_QUANTITY: i32 = 9999;

/// Shopping cart operations. Every lookup and mutation is scoped to the
/// owning user; cart lines are only ever consumed by the order engine.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: i32,
    pub product: CartLineProduct,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineProduct {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub main_image: String,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// List the user's cart joined with the current product rows. Lines
    /// whose product has been removed from the catalog are skipped.
    pub async fn list(&self, user_id: i32) -> Result<Vec<CartLineResponse>, ServiceError> {
        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::Id)
            .find_also_related(product::Entity)
            .all(&*self.db)
            .await?;

        Ok(lines
            .into_iter()
            .filter_map(|(line, product)| {
                product.map(|p| CartLineResponse {
                    id: line.id,
                    product: CartLineProduct {
                        id: p.id,
                        name: p.name,
                        price: p.price,
                        main_image: p.main_image,
                    },
                    quantity: line.quantity,
                })
            })
            .collect())
    }

    /// Add a product to the cart, incrementing the quantity when the user
    /// already has a line for it.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(ServiceError::Validation(format!(
                "quantity must be between 1 and {}",
                MAX_LINE_QUANTITY
            )));
        }

        let txn = self.db.begin().await?;

        product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("product not found".to_string()))?;

        let existing = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;

        let now = Utc::now();
        match existing {
            Some(line) => {
                let new_quantity = line
                    .quantity
                    .checked_add(quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or_else(|| {
                        ServiceError::Validation(format!(
                            "cart line cannot exceed {} units",
                            MAX_LINE_QUANTITY
                        ))
                    })?;
                let mut line: cart_item::ActiveModel = line.into();
                line.quantity = Set(new_quantity);
                line.updated_at = Set(now);
                line.update(&txn).await?;
            }
            None => {
                cart_item::ActiveModel {
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    quantity: Set(quantity),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id,
                product_id,
            })
            .await;

        info!(user_id, product_id, quantity, "cart line added");
        Ok(())
    }

    /// Set the quantity of an owned cart line, clamped to the valid range.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: i32,
        cart_id: i32,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        let line = cart_item::Entity::find_by_id(cart_id)
            .filter(cart_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("cart line not found".to_string()))?;

        let mut line: cart_item::ActiveModel = line.into();
        line.quantity = Set(quantity.clamp(1, MAX_LINE_QUANTITY));
        line.updated_at = Set(Utc::now());
        line.update(&*self.db).await?;

        Ok(())
    }
}
