//! # cart-core
//!
//! Core types for the movie-cart shopping cart and checkout.
//!
//! This crate provides:
//! - `CartStore` / `CartHandle`: the persisted cart and its discount pricing
//! - `CheckoutSession`: the timed payment confirmation state machine
//! - `Enricher`: locale-driven refresh of cart item titles and posters
//! - `PriceBook`: stable per-movie prices
//! - `Catalog`, `KeyValueStore`, `Notifier`, `Navigator`: collaborator seams
//! - `CartError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use cart_core::{CartHandle, CartItem, CartStore, CheckoutSession, DiscountPolicy, Price};
//!
//! let store = CartStore::load(storage, notifier.clone(), DiscountPolicy::default());
//! let cart = CartHandle::new(store);
//!
//! cart.add(CartItem::new(550, "Fight Club", Price::from_baht(320))).await;
//!
//! let checkout = CheckoutSession::new(cart.clone(), notifier, navigator, Default::default());
//! let snapshot = checkout.begin().await?;
//! // ... user transfers the money within the window
//! checkout.confirm().await?;
//! ```

pub mod catalog;
pub mod checkout;
pub mod enrichment;
pub mod error;
pub mod item;
pub mod locale;
pub mod notify;
pub mod price;
pub mod price_book;
pub mod pricing;
pub mod settings;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use catalog::{sort_by_rating, BoxedCatalog, Catalog, Listing, Movie, MoviePage};
pub use checkout::{CheckoutSession, CheckoutSettings, CheckoutSnapshot, CheckoutStatus};
pub use enrichment::{enrich, Enricher};
pub use error::{CartError, CartResult};
pub use item::{CartItem, MovieId};
pub use locale::{format_countdown, Locale};
pub use notify::{Navigator, Notice, NoticeBoard, Notifier, Route, RouteTracker};
pub use price::Price;
pub use price_book::PriceBook;
pub use pricing::{DiscountPolicy, DiscountTier, Totals};
pub use settings::CartSettings;
pub use storage::{BoxedStore, JsonFileStore, KeyValueStore, MemoryStore};
pub use store::{AddOutcome, CartHandle, CartStore};
