//! Authentication middleware: resolve the API key header into an identity.
//!
//! Runs before authorization. A malformed or unknown key ends the request
//! here with 401; no identity is attached and the permission table is
//! never consulted. A missing key attaches `Identity::Anonymous` and lets
//! the table's `public` flag decide downstream.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{auth::AuthError, state::AppState};

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let raw_key = match req.headers().get(state.config.auth.api_key_header.as_str()) {
        None => None,
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::UnrecognizedKeyFormat)?,
        ),
    };

    let identity = state.resolver.resolve(raw_key).await?;
    tracing::debug!(kind = identity.kind(), "Request authenticated");
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
