use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{success_response, success_with_msg, validate_input, Json},
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_cart))
        .route("/add", post(add_to_cart))
        .route("/update", post(update_cart))
}

#[derive(Debug, Deserialize, Validate)]
struct AddToCartRequest {
    product_id: i32,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
struct UpdateCartRequest {
    id: i32,
    #[serde(default = "default_quantity")]
    quantity: i32,
}

async fn list_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ServiceError> {
    let lines = state.services.cart.list(user.user_id).await?;
    Ok(success_response(lines))
}

async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    state
        .services
        .cart
        .add(user.user_id, payload.product_id, payload.quantity)
        .await?;
    Ok(success_with_msg(json!({}), "added to cart"))
}

async fn update_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<Response, ServiceError> {
    state
        .services
        .cart
        .update_quantity(user.user_id, payload.id, payload.quantity)
        .await?;
    Ok(success_with_msg(json!({}), "cart updated"))
}
