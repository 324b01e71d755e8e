use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::authz::DenyReason;
use crate::routes::ErrorBody;

/// Authentication and authorization failures. Credential problems are 401,
/// authorization denials are 403, a missing organization during role
/// resolution is 404 so it is never mistaken for a permission denial, and
/// repository failures are 500 rather than being disguised as credential
/// errors.
#[derive(Debug)]
pub enum AuthError {
    /// No credential supplied on a route that requires one.
    MissingCredentials,

    /// Key carries the user prefix but matches no user.
    InvalidUserApiKey,

    /// Key carries the organization prefix but matches no organization key.
    InvalidOrgApiKey,

    /// Key starts with neither recognized prefix.
    UnrecognizedKeyFormat,

    /// No permission rule matched the method+path (fail closed).
    DefaultDenied,

    /// Organization key presented on a user-key-only route.
    OrgKeyNotAllowed,

    /// User's platform role is not allowed on this route.
    InsufficientUserRole,

    /// Organization key's scope is not allowed on this route.
    InsufficientOrgScope,

    /// Caller's role within the organization is not in the route allow-list.
    InsufficientOrgRole,

    /// Caller is neither owner, member, nor platform admin.
    NotAMember,

    /// Organization-role resolution against a nonexistent organization.
    OrganizationNotFound,

    /// Unexpected failure (e.g. the persistence collaborator errored).
    Internal(String),
}

impl AuthError {
    fn status_code_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "missing_credentials",
                "Authentication credentials required".to_string(),
            ),
            AuthError::InvalidUserApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                "Invalid user API key".to_string(),
            ),
            AuthError::InvalidOrgApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                "Invalid organization API key".to_string(),
            ),
            AuthError::UnrecognizedKeyFormat => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key_format",
                "API key must start with the recognized user or organization prefix".to_string(),
            ),
            AuthError::DefaultDenied => (
                StatusCode::FORBIDDEN,
                "access_denied",
                "Access denied".to_string(),
            ),
            AuthError::OrgKeyNotAllowed => (
                StatusCode::FORBIDDEN,
                "org_key_not_allowed",
                "Organization API keys cannot access this route".to_string(),
            ),
            AuthError::InsufficientUserRole => (
                StatusCode::FORBIDDEN,
                "insufficient_role",
                "Your role does not allow this operation".to_string(),
            ),
            AuthError::InsufficientOrgScope => (
                StatusCode::FORBIDDEN,
                "insufficient_scope",
                "API key scope does not allow this operation".to_string(),
            ),
            AuthError::InsufficientOrgRole => (
                StatusCode::FORBIDDEN,
                "insufficient_org_role",
                "Your role in this organization does not allow this operation".to_string(),
            ),
            AuthError::NotAMember => (
                StatusCode::FORBIDDEN,
                "not_a_member",
                "You are not a member of this organization".to_string(),
            ),
            AuthError::OrganizationNotFound => (
                StatusCode::NOT_FOUND,
                "organization_not_found",
                "Organization not found".to_string(),
            ),
            AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        }
    }
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NoMatchingRule => AuthError::DefaultDenied,
            DenyReason::AuthenticationRequired => AuthError::MissingCredentials,
            DenyReason::OrgKeyNotAllowedOnUserRoute => AuthError::OrgKeyNotAllowed,
            DenyReason::InsufficientUserRole => AuthError::InsufficientUserRole,
            DenyReason::InsufficientOrgScope => AuthError::InsufficientOrgScope,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal error during authentication");
        }
        let (status, code, message) = self.status_code_message();
        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Internal(detail) => write!(f, "Internal error: {}", detail),
            other => {
                let (_, _, message) = other.status_code_message();
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for AuthError {}
