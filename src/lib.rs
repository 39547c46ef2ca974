//! yougou-api
//!
//! Storefront backend: catalog browsing, accounts, a shopping cart, and an
//! atomic cart-to-order engine, served over HTTP and backed by sea-orm.
#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod seed;
pub mod services;

use axum::Router;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
}

/// Standard paginated payload: the requested slice plus enough metadata for
/// clients to render pagination controls.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub list: Vec<T>,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(list: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            list,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

/// Build the full application router: `/api` endpoints plus the static
/// frontend fallback.
pub fn app_router(state: AppState) -> Router {
    let auth_service = state.services.auth.clone();
    let frontend_dir = state.config.frontend_dir.clone();

    Router::new()
        .nest("/api", handlers::api_routes(auth_service))
        .fallback_service(ServeDir::new(frontend_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

#[cfg(test)]
mod pagination_tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn empty_set_has_zero_pages() {
        let page = Paginated::<i32>::new(vec![], 1, 10, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn exact_division_has_no_extra_page() {
        let page = Paginated::new(vec![1, 2], 1, 2, 4);
        assert_eq!(page.total_pages, 2);
    }
}
