//! # cart-tmdb
//!
//! TMDB catalog provider for movie-cart-rs.
//!
//! Implements `cart_core::Catalog` over the TMDB v3 REST API:
//! - movie details (used to localize cart items)
//! - paged title search
//! - curated listings (popular, now playing, top rated, upcoming, trending)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart_tmdb::{image_url, TmdbCatalog, DEFAULT_POSTER_SIZE};
//! use cart_core::{Catalog, Locale};
//!
//! // Create catalog from environment (TMDB_API_KEY)
//! let catalog = TmdbCatalog::from_env()?;
//!
//! let page = catalog.search("spirited away", 1, Locale::Thai).await?;
//! let poster = image_url(
//!     &catalog.config().image_base_url,
//!     page.results[0].poster_path.as_deref(),
//!     DEFAULT_POSTER_SIZE,
//! );
//! ```

pub mod client;
pub mod config;
pub mod images;

// Re-exports
pub use client::TmdbCatalog;
pub use config::TmdbConfig;
pub use images::{image_url, DEFAULT_POSTER_SIZE, PLACEHOLDER_IMAGE, THUMBNAIL_SIZE};
