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

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/info", get(user_info))
        .route("/update", post(update_profile))
}

#[derive(Debug, Deserialize, Validate)]
struct CredentialsRequest {
    #[validate(length(min = 1, message = "username is required"))]
    username: String,
    #[validate(length(min = 1, message = "password is required"))]
    password: String,
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    password: Option<String>,
    phone: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let auth = state
        .services
        .users
        .register(&payload.username, &payload.password)
        .await?;
    Ok(success_with_msg(auth, "registered and signed in"))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let auth = state
        .services
        .users
        .login(&payload.username, &payload.password)
        .await?;
    Ok(success_with_msg(auth, "signed in"))
}

async fn user_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ServiceError> {
    let profile = state.services.users.profile(user.user_id).await?;
    Ok(success_response(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Response, ServiceError> {
    let outcome = state
        .services
        .users
        .update_profile(
            user.user_id,
            payload.password.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    if !outcome.changed {
        return Ok(success_with_msg(json!({}), "nothing to update"));
    }
    match outcome.new_token {
        Some(token) => Ok(success_with_msg(
            json!({ "token": token }),
            "profile updated, token re-issued",
        )),
        None => Ok(success_with_msg(json!({}), "profile updated")),
    }
}
