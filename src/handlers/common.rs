use crate::errors::{Envelope, ServiceError};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::Response,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON body extractor that routes rejections through the standard error
/// envelope instead of axum's plain-text 422.
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServiceError::Validation(rejection.body_text()))?;
        Ok(Json(value))
    }
}

/// Wrap payload in the standard success envelope.
pub fn success_response<T: Serialize>(data: T) -> Response {
    use axum::response::IntoResponse;
    Envelope::ok(data).into_response()
}

/// Success envelope with a custom message.
pub fn success_with_msg<T: Serialize>(data: T, msg: &str) -> Response {
    use axum::response::IntoResponse;
    Envelope::ok_with_msg(data, msg).into_response()
}

/// Validate a request DTO, mapping failures to the 400 envelope.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate()?;
    Ok(())
}

/// Page/size query parameters shared by list endpoints.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    5
}
