use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{non_blank, optional_text, required};
use crate::auth::{ensure_owner, Caller};
use crate::domain::{RegisterUserRequest, UpdateUserRequest, User};
use crate::error::{AppError, Result};
use crate::store::{decode, decode_all, encode, Collection, Store};

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Records a user profile. Credentials live with the identity provider;
    /// only the profile and the email uniqueness rule are kept here.
    pub async fn register(&self, req: RegisterUserRequest) -> Result<User> {
        let email = required(req.email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation("email is not valid".into()));
        }
        let name = required(req.name, "name")?;
        let role = req
            .role
            .ok_or_else(|| AppError::Validation("role is required".into()))?;

        let existing: Vec<User> = decode_all(
            Collection::Users,
            self.store.get_all(Collection::Users).await?,
        )?;
        if existing.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(
                "a user with this email already exists".into(),
            ));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            role,
            created_at: Utc::now(),
            phone_number: optional_text(req.phone_number),
            photo_url: optional_text(req.photo_url),
        };

        self.store
            .create(Collection::Users, &user.id, encode(&user)?)
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        let record = self
            .store
            .get(Collection::Users, id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        Ok(decode(Collection::Users, id, record)?)
    }

    pub async fn update(&self, id: &str, caller: &Caller, req: UpdateUserRequest) -> Result<User> {
        let user = self.get(id).await?;
        ensure_owner(&user.id, caller, "account")?;

        let patch = UpdateUserRequest {
            name: non_blank(req.name, "name")?,
            phone_number: req.phone_number.map(|p| p.trim().to_string()),
            photo_url: req.photo_url.map(|p| p.trim().to_string()),
        };
        let merged = self
            .store
            .update(Collection::Users, id, encode(&patch)?)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))?;

        Ok(decode(Collection::Users, id, merged)?)
    }
}
