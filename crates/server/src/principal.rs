//! Authenticated caller identity.
//!
//! The auth middleware resolves basic-auth credentials into a [`Principal`]
//! and stores it in the request extensions. Handlers then ask for the role
//! they need through [`CurrentVendor`] or [`CurrentAdmin`]; the vendor id a
//! vendor handler operates on always comes from the principal, never from the
//! request body.

use axum::{extract::FromRequestParts, http::request::Parts};
use engine::{Role, User};
use uuid::Uuid;

use crate::ServerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Principal {
    Admin { username: String },
    Vendor { username: String, vendor_id: Uuid },
}

impl Principal {
    pub fn username(&self) -> &str {
        match self {
            Self::Admin { username } | Self::Vendor { username, .. } => username,
        }
    }
}

impl TryFrom<User> for Principal {
    type Error = ServerError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        match (user.role, user.vendor_id) {
            (Role::Admin, _) => Ok(Self::Admin {
                username: user.username,
            }),
            (Role::Vendor, Some(vendor_id)) => Ok(Self::Vendor {
                username: user.username,
                vendor_id,
            }),
            (Role::Vendor, None) => Err(ServerError::Unauthorized),
        }
    }
}

fn principal_from_parts(parts: &Parts) -> Result<&Principal, ServerError> {
    parts
        .extensions
        .get::<Principal>()
        .ok_or(ServerError::Unauthorized)
}

/// A vendor login. Rejects admins with 403.
#[derive(Clone, Debug)]
pub struct CurrentVendor {
    pub username: String,
    pub vendor_id: Uuid,
}

impl<S> FromRequestParts<S> for CurrentVendor
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal_from_parts(parts)? {
            Principal::Vendor {
                username,
                vendor_id,
            } => Ok(Self {
                username: username.clone(),
                vendor_id: *vendor_id,
            }),
            Principal::Admin { .. } => Err(ServerError::Forbidden(
                "vendor login required".to_string(),
            )),
        }
    }
}

/// An admin login. Rejects vendors with 403.
#[derive(Clone, Debug)]
pub struct CurrentAdmin {
    pub username: String,
}

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal_from_parts(parts)? {
            Principal::Admin { username } => Ok(Self {
                username: username.clone(),
            }),
            Principal::Vendor { .. } => Err(ServerError::Forbidden(
                "admin login required".to_string(),
            )),
        }
    }
}
