//! Authentication: password hashing, JWT issuance/validation, and the
//! request middleware that turns a bearer credential into a typed principal.
//!
//! Handlers behind the middleware receive an [`AuthUser`] from request
//! extensions and never see the raw credential.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::ServiceError;

/// JWT claim set carried by access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated principal extracted from a validated token. The surrounding
/// code trusts this identifier without re-checking the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_lifetime: Duration,
}

/// Issues and validates credentials. Stateless: all session data lives in
/// the signed token.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Mint an access token for a user id.
    pub fn generate_token(&self, user_id: i32) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.config.token_lifetime).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("token creation failed: {}", e)))
    }

    /// Validate a token and return the user id it was minted for.
    pub fn validate_token(&self, token: &str) -> Result<i32, ServiceError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Auth("session expired, please sign in again".to_string())
            }
            _ => ServiceError::Auth("invalid credential".to_string()),
        })?
        .claims;

        claims
            .sub
            .parse::<i32>()
            .map_err(|_| ServiceError::Auth("invalid credential".to_string()))
    }
}

/// Hash a plaintext password with Argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored hash. Malformed stored
/// hashes count as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Middleware guarding authenticated routes. Resolves the credential from
/// the `Authorization: Bearer` header, falling back to a `token` query
/// parameter, and injects the resulting [`AuthUser`] into request
/// extensions. Rejects with 401 before any handler runs.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers()).or_else(|| query_token(request.uri()));

    let Some(token) = token else {
        return ServiceError::Auth("please sign in first".to_string()).into_response();
    };

    match auth.validate_token(&token) {
        Ok(user_id) => {
            debug!(user_id, "authenticated request");
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn query_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(lifetime: Duration) -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "unit_test_secret_that_is_long_enough_0000".to_string(),
            token_lifetime: lifetime,
        })
    }

    #[test]
    fn round_trips_user_id() {
        let auth = test_service(Duration::hours(24));
        let token = auth.generate_token(42).unwrap();
        assert_eq!(auth.validate_token(&token).unwrap(), 42);
    }

    #[test]
    fn rejects_expired_token() {
        let auth = test_service(Duration::hours(-1));
        let token = auth.generate_token(42).unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(ServiceError::Auth(_))
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        let auth = test_service(Duration::hours(24));
        assert!(auth.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("123456").unwrap();
        assert!(verify_password("123456", &hash));
        assert!(!verify_password("654321", &hash));
    }

    #[test]
    fn query_token_parses_url_encoding() {
        let uri: Uri = "/api/cart/list?page=1&token=abc%2Edef".parse().unwrap();
        assert_eq!(query_token(&uri).as_deref(), Some("abc.def"));
    }
}
