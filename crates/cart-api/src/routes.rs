//! # Routes
//!
//! Axum router configuration for the cart API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Catalog:
///   - GET  /api/v1/movies/search?query=&page=&sort=
///   - GET  /api/v1/movies/{id}
///   - GET  /api/v1/lists/{listing}?page=&sort=
///
/// - Cart:
///   - GET    /api/v1/cart
///   - DELETE /api/v1/cart
///   - POST   /api/v1/cart/items
///   - DELETE /api/v1/cart/items/{id}
///
/// - Checkout:
///   - GET  /api/v1/checkout
///   - POST /api/v1/checkout
///   - POST /api/v1/checkout/confirm
///   - POST /api/v1/checkout/dismiss
///
/// - Session:
///   - GET/PUT /api/v1/locale
///   - GET     /api/v1/notices
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog_routes = Router::new()
        .route("/movies/search", get(handlers::search_movies))
        .route("/movies/{id}", get(handlers::get_movie))
        .route("/lists/{listing}", get(handlers::list_movies));

    let cart_routes = Router::new()
        .route("/cart", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/cart/items", post(handlers::add_item))
        .route("/cart/items/{id}", delete(handlers::remove_item));

    let checkout_routes = Router::new()
        .route(
            "/checkout",
            get(handlers::get_checkout).post(handlers::begin_checkout),
        )
        .route("/checkout/confirm", post(handlers::confirm_checkout))
        .route("/checkout/dismiss", post(handlers::dismiss_checkout));

    let session_routes = Router::new()
        .route(
            "/locale",
            get(handlers::get_locale).put(handlers::set_locale),
        )
        .route("/notices", get(handlers::drain_notices));

    let api_routes = Router::new()
        .merge(catalog_routes)
        .merge(cart_routes)
        .merge(checkout_routes)
        .merge(session_routes);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", api_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
