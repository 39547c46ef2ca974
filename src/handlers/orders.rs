use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{success_response, success_with_msg, Json, PaginationParams},
    AppState,
};
use axum::{
    extract::{Query, State},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_order))
        .route("/pay", post(pay_order))
        .route("/list", get(list_orders))
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    #[serde(default)]
    cart_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct PayOrderRequest {
    order_id: i32,
}

async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    let order_id = state
        .services
        .orders
        .create_order(user.user_id, &payload.cart_ids)
        .await?;
    Ok(success_with_msg(
        json!({ "order_id": order_id }),
        "order created",
    ))
}

async fn pay_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PayOrderRequest>,
) -> Result<Response, ServiceError> {
    state
        .services
        .orders
        .pay_order(user.user_id, payload.order_id)
        .await?;
    Ok(success_with_msg(json!({}), "payment accepted"))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PaginationParams>,
) -> Result<Response, ServiceError> {
    let page = state
        .services
        .orders
        .list_orders(user.user_id, params.page, params.size)
        .await?;
    Ok(success_response(page))
}
