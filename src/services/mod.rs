pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

use crate::{auth::AuthService, events::EventSender};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Aggregate of the application services used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<catalog::CatalogService>,
    pub users: Arc<users::UserService>,
    pub cart: Arc<cart::CartService>,
    pub orders: Arc<orders::OrderService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog::CatalogService::new(db.clone())),
            users: Arc::new(users::UserService::new(
                db.clone(),
                auth.clone(),
                event_sender.clone(),
            )),
            cart: Arc::new(cart::CartService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(orders::OrderService::new(db, event_sender)),
            auth,
        }
    }
}
