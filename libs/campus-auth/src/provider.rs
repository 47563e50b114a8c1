use async_trait::async_trait;
use axum::http::HeaderMap;
use campus_security::Identity;

use crate::errors::AuthError;

/// Boundary to the external credential/session provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Turn request credentials into an identity.
    ///
    /// # Errors
    /// [`AuthError::Unauthenticated`] when no credentials are present,
    /// [`AuthError::InvalidToken`] when they are not recognized.
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError>;
}

/// Extract Bearer token from Authorization header
#[must_use]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|t| !t.is_empty())
}
