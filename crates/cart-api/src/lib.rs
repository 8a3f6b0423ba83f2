//! # cart-api
//!
//! HTTP API layer for movie-cart-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for browsing, the cart and the timed checkout
//! - Locale switching with background re-localization of the cart
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/movies/search` | Search movies |
//! | GET | `/api/v1/movies/{id}` | Movie details |
//! | GET | `/api/v1/lists/{listing}` | Curated listing |
//! | GET / DELETE | `/api/v1/cart` | Cart view / clear |
//! | POST | `/api/v1/cart/items` | Add movie |
//! | DELETE | `/api/v1/cart/items/{id}` | Remove movie |
//! | GET / POST | `/api/v1/checkout` | Checkout state / begin |
//! | POST | `/api/v1/checkout/confirm` | Payment received |
//! | POST | `/api/v1/checkout/dismiss` | Close the dialog |
//! | GET / PUT | `/api/v1/locale` | Display locale |
//! | GET | `/api/v1/notices` | Pending notices |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
