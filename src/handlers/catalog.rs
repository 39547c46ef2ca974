use crate::{
    handlers::common::success_response,
    services::catalog::ProductFilter,
    errors::ServiceError,
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

pub fn banner_routes() -> Router<AppState> {
    Router::new().route("/list", get(list_banners))
}

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/list", get(list_categories))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_products))
        .route("/detail", get(product_detail))
}

async fn list_banners(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let banners = state.services.catalog.list_banners().await?;
    Ok(success_response(banners))
}

async fn list_categories(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(success_response(categories))
}

async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Response, ServiceError> {
    let page = state.services.catalog.list_products(filter).await?;
    Ok(success_response(page))
}

#[derive(Debug, Deserialize)]
struct DetailQuery {
    #[serde(default)]
    id: i32,
}

async fn product_detail(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, ServiceError> {
    let product = state.services.catalog.get_product(query.id).await?;
    Ok(success_response(product))
}
