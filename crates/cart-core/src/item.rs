//! # Cart Items
//!
//! The purchasable unit held by the cart.

use crate::catalog::Movie;
use crate::price::Price;
use serde::{Deserialize, Serialize};

/// Catalog identifier of a movie
pub type MovieId = u64;

/// One movie in the cart.
///
/// `id` and `price` are fixed once the item is created; enrichment may only
/// overwrite the display fields (`title`, `poster_path`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog ID, unique within a cart
    pub id: MovieId,

    /// Display title (localized)
    pub title: String,

    /// Poster path fragment, relative to the image CDN
    #[serde(default, alias = "posterPath")]
    pub poster_path: Option<String>,

    /// Price captured when the item was added
    pub price: Price,
}

impl CartItem {
    /// Create a cart item without a poster
    pub fn new(id: MovieId, title: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            price,
        }
    }

    /// Create a cart item from a catalog entry and its price
    pub fn from_movie(movie: &Movie, price: Price) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            price,
        }
    }

    /// Builder: set poster path
    pub fn with_poster(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }

    /// Overlay freshly fetched display fields.
    ///
    /// The title is always replaced; the poster only when the catalog has one.
    pub fn overlay(&mut self, details: &Movie) {
        self.title = details.title.clone();
        if let Some(path) = &details.poster_path {
            self.poster_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_keeps_price_and_id() {
        let mut item = CartItem::new(42, "Old Title", Price::from_baht(300)).with_poster("/old.jpg");
        let details = Movie::new(42, "ชื่อใหม่").with_poster("/new.jpg");

        item.overlay(&details);

        assert_eq!(item.id, 42);
        assert_eq!(item.title, "ชื่อใหม่");
        assert_eq!(item.poster_path.as_deref(), Some("/new.jpg"));
        assert_eq!(item.price, Price::from_baht(300));
    }

    #[test]
    fn test_overlay_without_poster_keeps_previous() {
        let mut item = CartItem::new(1, "A", Price::from_baht(200)).with_poster("/a.jpg");
        item.overlay(&Movie::new(1, "B"));

        assert_eq!(item.title, "B");
        assert_eq!(item.poster_path.as_deref(), Some("/a.jpg"));
    }

    #[test]
    fn test_accepts_camel_case_poster() {
        let item: CartItem =
            serde_json::from_str(r#"{"id":5,"title":"T","posterPath":"/p.jpg","price":20000}"#)
                .unwrap();
        assert_eq!(item.poster_path.as_deref(), Some("/p.jpg"));
        assert_eq!(item.price, Price::from_baht(200));
    }
}
