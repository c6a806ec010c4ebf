use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_expense::create_expense;
use super::handlers::delete_expense::delete_expense;
use super::handlers::get_expense::get_expense;
use super::handlers::get_profile::get_profile;
use super::handlers::health::health;
use super::handlers::list_expenses::list_expenses;
use super::handlers::list_team_expenses::list_team_expenses;
use super::handlers::login::login;
use super::handlers::register::register;
use super::handlers::update_expense::update_expense;
use super::handlers::ApiError;
use super::middleware::authenticate;
use super::rate_limit::rate_limit;
use super::rate_limit::FixedWindowRateLimiter;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub expense_service: Arc<dyn ExpenseServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(get_profile))
        .route("/api/expenses", post(create_expense).get(list_expenses))
        .route(
            "/api/expenses/:expense_id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/api/teams/:team_id/expenses", get(list_team_expenses))
        .route_layer(middleware::from_fn_with_state(
            state.authenticator.clone(),
            authenticate,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
