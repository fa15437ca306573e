//! Caller identity supplied by the authentication layer in front of the
//! gateway.

use super::HttpError;
use crate::registry::domain::UserId;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated tenant identifier.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Operator allowed to manage the global catalog.
    Admin,
    /// Regular tenant.
    User,
}

impl Role {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("ADMIN") => Self::Admin,
            _ => Self::User,
        }
    }
}

/// The authenticated caller of an administrative route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Tenant identifier.
    pub user_id: UserId,
    /// Caller role.
    pub role: Role,
}

impl Principal {
    /// Returns whether the caller is an operator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Rejects callers without the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Forbidden`] for regular tenants.
    pub fn require_admin(&self) -> Result<(), HttpError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(HttpError::Forbidden("admin role required".to_owned()))
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };
        let raw_user = header(USER_ID_HEADER)
            .ok_or_else(|| HttpError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;
        let user_id = UserId::new(raw_user)
            .map_err(|err| HttpError::Unauthorized(err.to_string()))?;
        Ok(Self {
            user_id,
            role: Role::parse(header(USER_ROLE_HEADER)),
        })
    }
}
