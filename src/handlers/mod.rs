pub mod cart;
pub mod catalog;
pub mod common;
pub mod orders;
pub mod users;

use crate::{auth, AppState};
use axum::{middleware, Router};
use std::sync::Arc;

/// Assemble the `/api` router. Cart and order routes, plus the profile
/// endpoints, sit behind the auth middleware; catalog and login/register
/// are public.
pub fn api_routes(auth_service: Arc<auth::AuthService>) -> Router<AppState> {
    let require_auth =
        middleware::from_fn_with_state(auth_service, auth::auth_middleware);

    Router::new()
        .nest("/banner", catalog::banner_routes())
        .nest("/category", catalog::category_routes())
        .nest("/product", catalog::product_routes())
        .nest(
            "/user",
            users::public_routes().merge(users::protected_routes().route_layer(require_auth.clone())),
        )
        .nest("/cart", cart::routes().route_layer(require_auth.clone()))
        .nest("/order", orders::routes().route_layer(require_auth))
}
