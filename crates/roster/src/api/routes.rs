//! API route definitions.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{MethodRouter, delete, get, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;
use crate::auth::{AccessPolicy, Role, RouteGuard, role_authorization};

/// Put `route` behind the role check for `guard`.
fn guarded(route: MethodRouter<AppState>, guard: &RouteGuard) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        guard.clone(),
        role_authorization,
    ))
}

/// Create the application router.
///
/// Fails if a route policy is built from an empty role set.
pub fn create_router(state: AppState) -> anyhow::Result<Router> {
    let cors = build_cors_layer(&state);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let admin = state.auth.guard(AccessPolicy::one_of([Role::Admin])?);
    let member = state
        .auth
        .guard(AccessPolicy::one_of([Role::Admin, Role::User])?);
    let anyone = state.auth.guard(AccessPolicy::any_role());

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/oauth/login", get(handlers::oauth_login))
        .route("/auth/oauth/callback", get(handlers::oauth_callback))
        .route("/posts/{id}", get(handlers::get_post))
        .route("/users/{id}/posts", get(handlers::list_user_posts));

    let protected_routes = Router::new()
        .route("/me", guarded(get(handlers::get_me), &anyone))
        .route(
            "/users",
            guarded(post(handlers::create_user), &admin)
                .merge(guarded(get(handlers::list_users), &admin)),
        )
        .route(
            "/users/paginated",
            guarded(get(handlers::list_users_paginated), &admin),
        )
        .route(
            "/users/{id}",
            guarded(get(handlers::get_user), &member)
                .merge(guarded(put(handlers::update_user), &member))
                .merge(guarded(delete(handlers::delete_user), &admin)),
        )
        .route(
            "/companies",
            guarded(post(handlers::create_company), &admin)
                .merge(get(handlers::list_companies)),
        )
        .route(
            "/companies/{id}",
            guarded(delete(handlers::delete_company), &admin),
        )
        .route("/posts", guarded(post(handlers::create_post), &member));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(cors)
        .layer(trace_layer))
}

/// Build the CORS layer from the configured origins.
///
/// With no configured origins, cross-origin requests are denied.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let headers = [
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::ORIGIN,
    ];

    if state.allowed_origins.is_empty() {
        tracing::warn!("CORS: No origins configured, denying all cross-origin requests");
        return CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")));
    }

    let origins: Vec<HeaderValue> = state
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("CORS: Invalid origin in config: {}", origin);
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::error!("CORS: All configured origins are invalid!");
        CorsLayer::new().allow_origin(AllowOrigin::exact(HeaderValue::from_static("null")))
    } else {
        tracing::info!("CORS: Allowing {} origin(s)", origins.len());
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    }
}
