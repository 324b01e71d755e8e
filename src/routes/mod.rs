//! Route handlers and router assembly.

pub mod contracts;
mod error;
pub mod evaluation;
pub mod health;
pub mod organizations;
pub mod services;
pub mod users;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

pub use error::{ApiError, ErrorBody};

use crate::{middleware, state::AppState};

/// The full application router: API routes mounted under the configured
/// base path, wrapped in trace → authenticate → authorize layers.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/me", get(users::me))
        .route("/users", post(users::create).get(users::list))
        .route(
            "/users/{username}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/users/{username}/rotate-key", post(users::rotate_key))
        .route(
            "/organizations",
            post(organizations::create).get(organizations::list),
        )
        .route(
            "/organizations/{id}",
            get(organizations::get)
                .patch(organizations::update)
                .delete(organizations::delete),
        )
        .route(
            "/organizations/{id}/members",
            post(organizations::add_member),
        )
        .route(
            "/organizations/{id}/members/{username}",
            axum::routing::patch(organizations::update_member)
                .delete(organizations::remove_member),
        )
        .route(
            "/organizations/{id}/keys",
            get(organizations::list_keys).post(organizations::create_key),
        )
        .route(
            "/organizations/{id}/keys/{key_id}",
            delete(organizations::revoke_key),
        )
        .route("/services", get(services::list).post(services::create))
        .route(
            "/services/{name}",
            get(services::get)
                .put(services::update)
                .delete(services::delete),
        )
        .route("/contracts", get(contracts::list).post(contracts::create))
        .route("/contracts/{id}", get(contracts::get))
        .route("/contracts/{id}/terminate", post(contracts::terminate))
        .route("/evaluation/{service}", get(evaluation::evaluate));

    let base = state.config.server.base_path.as_str();
    let app = if base.is_empty() || base == "/" {
        api
    } else {
        Router::new().nest(base, api)
    };

    app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(from_fn_with_state(state.clone(), middleware::authenticate))
            .layer(from_fn_with_state(state.clone(), middleware::authorize))
            .layer(RequestBodyLimitLayer::new(
                state.config.server.body_limit_bytes,
            )),
    )
    .with_state(state)
}
