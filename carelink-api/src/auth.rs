//! Authentication context extraction.
//!
//! Session issuance lives upstream: by the time a request reaches this
//! service the caller has already been authenticated, and the collaborator
//! forwards the resulting identity as headers. This module only consumes
//! that `(user_id, role)` pair; it never validates credentials.
//!
//! - `X-User-Id`: the caller's user id (UUID)
//! - `X-Role`: one of `user`, `caregiver`, `family_member`, `admin`
//!
//! Missing or malformed headers reject the request with 401.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use carelink_core::{Role, UserId};

use crate::error::ApiError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated role.
pub const ROLE_HEADER: &str = "x-role";

/// Authentication context extracted from request headers.
///
/// Injected into Axum handlers as an extractor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// The authenticated user.
    pub user_id: UserId,

    /// The authenticated role for this request.
    pub role: Role,
}

impl AuthContext {
    /// Create a new authentication context.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing X-User-Id header"))?
            .parse::<UserId>()
            .map_err(|_| ApiError::unauthenticated("X-User-Id is not a valid UUID"))?;

        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing X-Role header"))?
            .parse::<Role>()
            .map_err(|_| ApiError::unauthenticated("X-Role is not a recognized role"))?;

        Ok(AuthContext::new(user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use carelink_core::EntityIdType;

    async fn extract(request: Request<()>) -> Result<AuthContext, ApiError> {
        let (mut parts, _) = request.into_parts();
        AuthContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_headers_extract_context() {
        let user = UserId::now_v7();
        let request = Request::builder()
            .header(USER_ID_HEADER, user.to_string())
            .header(ROLE_HEADER, "family_member")
            .body(())
            .unwrap();

        let auth = extract(request).await.unwrap();
        assert_eq!(auth.user_id, user);
        assert_eq!(auth.role, Role::FamilyMember);
    }

    #[tokio::test]
    async fn test_missing_user_header_is_unauthenticated() {
        let request = Request::builder()
            .header(ROLE_HEADER, "admin")
            .body(())
            .unwrap();

        let err = extract(request).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn test_bad_role_is_unauthenticated() {
        let request = Request::builder()
            .header(USER_ID_HEADER, UserId::now_v7().to_string())
            .header(ROLE_HEADER, "superuser")
            .body(())
            .unwrap();

        let err = extract(request).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn test_bad_uuid_is_unauthenticated() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-uuid")
            .header(ROLE_HEADER, "admin")
            .body(())
            .unwrap();

        let err = extract(request).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Unauthenticated);
    }
}
