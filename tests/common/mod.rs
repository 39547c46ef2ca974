#![allow(dead_code)]

use axum::Router;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;
use yougou_api::{
    app_router,
    auth::{self, AuthConfig, AuthService},
    config::AppConfig,
    entities::{cart_item, product, user},
    events::{self, EventSender},
    migrator::Migrator,
    services::AppServices,
    AppState,
};

/// Test harness: application state over a fresh in-memory SQLite database,
/// plus the assembled router for endpoint-level tests.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::new("sqlite::memory:", "x".repeat(48));

        let mut options = ConnectOptions::new(cfg.database_url.clone());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Arc::new(
            Database::connect(options)
                .await
                .expect("failed to open in-memory database"),
        );
        Migrator::up(&*db, None)
            .await
            .expect("failed to run migrations");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_service = Arc::new(AuthService::new(AuthConfig {
            jwt_secret: cfg.jwt_secret.clone(),
            token_lifetime: Duration::hours(cfg.jwt_expiry_hours),
        }));

        let services = AppServices::new(db.clone(), Arc::new(event_sender), auth_service);

        let state = AppState {
            db,
            config: cfg,
            services,
        };
        let router = app_router(state.clone());

        Self {
            state,
            router,
            _event_task: event_task,
        }
    }

    pub async fn create_user(&self, username: &str) -> i32 {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(auth::hash_password("123456").expect("hashing failed")),
            phone: Set(String::new()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to insert user");
        model.id
    }

    pub async fn create_product(&self, name: &str, price: Decimal) -> i32 {
        let model = product::ActiveModel {
            name: Set(name.to_string()),
            price: Set(price),
            main_image: Set(format!("/assets/image/{}.png", name.replace(' ', "_"))),
            category_id: Set(1),
            stock: Set(100),
            is_recommend: Set(0),
            is_sale: Set(1),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to insert product");
        model.id
    }

    pub async fn add_cart_line(&self, user_id: i32, product_id: i32, quantity: i32) -> i32 {
        let now = Utc::now();
        let model = cart_item::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to insert cart line");
        model.id
    }

    pub fn token_for(&self, user_id: i32) -> String {
        self.state
            .services
            .auth
            .generate_token(user_id)
            .expect("token generation failed")
    }
}
