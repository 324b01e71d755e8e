//! Authorization middleware: the permission-table decision.
//!
//! Must run after `authenticate`. Requests arriving without an attached
//! identity (a route mounted outside the authentication layer) are treated
//! as anonymous, keeping the chain fail-closed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{AuthError, Identity},
    authz::{DenyReason, HttpMethod},
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or(Identity::Anonymous);

    let path = strip_base_path(req.uri().path(), &state.config.server.base_path);
    // Methods outside the table's vocabulary can never match a rule.
    let decision = match HttpMethod::from_method(req.method()) {
        Some(method) => state.authz.authorize(&identity, method, path),
        None => Err(DenyReason::NoMatchingRule),
    };

    match decision {
        Ok(()) => Ok(next.run(req).await),
        Err(reason) => {
            tracing::warn!(
                kind = identity.kind(),
                method = %req.method(),
                path = %path,
                reason = reason.as_str(),
                "Request denied"
            );
            Err(reason.into())
        }
    }
}

/// Strip the configured base prefix before matching. Only a whole-segment
/// prefix counts: `/api/v1/users` strips to `/users`, while `/api/v1x`
/// stays untouched.
fn strip_base_path<'a>(path: &'a str, base: &str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}
