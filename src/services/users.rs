use crate::{
    auth::{self, AuthService},
    entities::user,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

const MIN_PASSWORD_LEN: usize = 6;

/// Account management: registration, login, profile reads and updates.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Serialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub phone: String,
}

/// Outcome of a profile update; a new token is issued when the password
/// changed so the client can keep its session.
#[derive(Debug)]
pub struct ProfileUpdate {
    pub changed: bool,
    pub new_token: Option<String>,
}

impl UserService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            auth,
            event_sender,
        }
    }

    /// Register a new account and sign it in.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokenResponse, ServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("username already taken".to_string()));
        }

        let new_user = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(auth::hash_password(password)?),
            phone: Set(String::new()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::UserRegistered {
                user_id: new_user.id,
            })
            .await;

        info!(user_id = new_user.id, "user registered");
        Ok(AuthTokenResponse {
            token: self.auth.generate_token(new_user.id)?,
            username: new_user.username,
        })
    }

    /// Verify credentials and mint an access token. Unknown usernames and
    /// wrong passwords are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokenResponse, ServiceError> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let user = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?;

        let Some(user) = user else {
            return Err(ServiceError::Auth(
                "incorrect username or password".to_string(),
            ));
        };
        if !auth::verify_password(password, &user.password_hash) {
            return Err(ServiceError::Auth(
                "incorrect username or password".to_string(),
            ));
        }

        Ok(AuthTokenResponse {
            token: self.auth.generate_token(user.id)?,
            username: user.username,
        })
    }

    pub async fn profile(&self, user_id: i32) -> Result<UserProfile, ServiceError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            phone: user.phone,
        })
    }

    /// Update password and/or phone. A password change re-issues the token.
    #[instrument(skip(self, new_password))]
    pub async fn update_profile(
        &self,
        user_id: i32,
        new_password: Option<&str>,
        new_phone: Option<&str>,
    ) -> Result<ProfileUpdate, ServiceError> {
        let user = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        let mut active: user::ActiveModel = user.into();
        let mut changed = false;
        let mut password_changed = false;

        if let Some(password) = new_password.filter(|p| !p.is_empty()) {
            if password.len() < MIN_PASSWORD_LEN {
                return Err(ServiceError::Validation(format!(
                    "password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )));
            }
            active.password_hash = Set(auth::hash_password(password)?);
            changed = true;
            password_changed = true;
        }

        if let Some(phone) = new_phone {
            if !phone.is_empty()
                && (!phone.chars().all(|c| c.is_ascii_digit())
                    || !(10..=11).contains(&phone.len()))
            {
                return Err(ServiceError::Validation(
                    "phone number must be 10 or 11 digits".to_string(),
                ));
            }
            active.phone = Set(phone.to_string());
            changed = true;
        }

        if changed {
            active.update(&*self.db).await?;
            info!(user_id, password_changed, "profile updated");
        }

        let new_token = if password_changed {
            Some(self.auth.generate_token(user_id)?)
        } else {
            None
        };

        Ok(ProfileUpdate { changed, new_token })
    }
}
