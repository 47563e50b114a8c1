use campus_security::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing or invalid token")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Organization ID is required: no organization could be resolved for this user")]
    MissingOrgId,

    #[error("Forbidden: role {actual} is not allowed, requires one of {required:?}")]
    Forbidden { required: Vec<Role>, actual: Role },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    #[must_use]
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::MissingOrgId => StatusCode::BAD_REQUEST,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::response::Json;
        use serde_json::json;

        let status = self.status_code();
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "authorization failed internally");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
