use axum::http::{HeaderValue, Method, header};
use axum::{Router, routing::get};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::batch::BatchCoordinator;
use crate::fetcher::Fetch;

pub mod handlers;
pub mod models;

/// Everything a request handler needs, built once at startup.
pub struct AppState<F> {
    pub coordinator: BatchCoordinator<F>,
    pub allowed_origin: HeaderValue,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        AppState {
            coordinator: self.coordinator.clone(),
            allowed_origin: self.allowed_origin.clone(),
        }
    }
}

impl<F: Fetch> AppState<F> {
    pub fn new(coordinator: BatchCoordinator<F>, allowed_origin: HeaderValue) -> Self {
        AppState {
            coordinator,
            allowed_origin,
        }
    }
}

pub fn create_router<F: Fetch>(state: AppState<F>) -> Router {
    // one origin, read-only methods
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/search", get(handlers::search_handler::<F>))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(cors)
        .layer(CatchPanicLayer::new())
}
