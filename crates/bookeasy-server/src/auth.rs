//! Caller identity and ownership checks.
//!
//! Identity arrives as out-of-band request metadata and is trusted as given.
//! Verifying it belongs to the identity provider in front of this service;
//! swapping [`TrustedHeaders`] for another [`IdentityResolver`] changes that
//! without touching the services.

use axum::http::HeaderMap;
use tracing::warn;

use crate::domain::Role;
use crate::error::{AppError, Result};

pub const USER_ID_HEADER: &str = "user-id";
pub const USER_TYPE_HEADER: &str = "user-type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn business(id: impl Into<String>) -> Self {
        Self::new(id, Role::Business)
    }

    pub fn customer(id: impl Into<String>) -> Self {
        Self::new(id, Role::Customer)
    }
}

pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the request carries no identity at all.
    fn resolve(&self, headers: &HeaderMap) -> Result<Option<Caller>>;
}

/// Reads the caller id from `user-id` and the role from `user-type`
/// (defaulting to customer) without any verification.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustedHeaders;

impl IdentityResolver for TrustedHeaders {
    fn resolve(&self, headers: &HeaderMap) -> Result<Option<Caller>> {
        let Some(id) = header_value(headers, USER_ID_HEADER)? else {
            return Ok(None);
        };

        let role = match header_value(headers, USER_TYPE_HEADER)? {
            Some(raw) => raw.parse::<Role>().map_err(AppError::Validation)?,
            None => Role::Customer,
        };

        Ok(Some(Caller::new(id, role)))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| AppError::Validation(format!("{name} header is not valid text")))?
                .trim();
            Ok(Some(value).filter(|v| !v.is_empty()))
        }
    }
}

pub fn require_caller(caller: Option<&Caller>) -> Result<&Caller> {
    caller.ok_or(AppError::Unauthenticated)
}

pub fn require_role(caller: &Caller, role: Role) -> Result<()> {
    if caller.role != role {
        warn!(caller_id = %caller.id, role = %caller.role, required = %role, "role check failed");
        return Err(AppError::Forbidden(format!("only {role} accounts may do this")));
    }
    Ok(())
}

/// Field equality between a resource's owner and the caller.
pub fn ensure_owner(owner_id: &str, caller: &Caller, resource: &str) -> Result<()> {
    if owner_id != caller.id {
        warn!(caller_id = %caller.id, resource, "ownership check failed");
        return Err(AppError::Forbidden(format!(
            "not authorized to modify this {resource}"
        )));
    }
    Ok(())
}
