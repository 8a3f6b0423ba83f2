//! # Catalog Trait
//!
//! Seam to the movie catalog provider. The cart only needs per-item details
//! (for enrichment); search and curated listings feed the browsing views.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Catalog (trait)                │
//! │  ├── details()                              │
//! │  ├── search()                               │
//! │  └── listing()                              │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!              ┌────────┴────────┐
//!              │   TmdbCatalog   │
//!              │   (cart-tmdb)   │
//!              └─────────────────┘
//! ```

use crate::error::CartResult;
use crate::item::MovieId;
use crate::locale::Locale;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// A movie as returned by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,

    #[serde(default)]
    pub release_date: Option<String>,

    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            overview: None,
            release_date: None,
            vote_average: None,
        }
    }

    /// Builder: set poster path
    pub fn with_poster(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }

    /// Builder: set vote average
    pub fn with_rating(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub results: Vec<Movie>,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default)]
    pub total_results: u32,
}

/// Curated listings offered by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
    TrendingDay,
    TrendingWeek,
}

impl Listing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Listing::Popular => "popular",
            Listing::NowPlaying => "now_playing",
            Listing::TopRated => "top_rated",
            Listing::Upcoming => "upcoming",
            Listing::TrendingDay => "trending_day",
            Listing::TrendingWeek => "trending_week",
        }
    }

    /// Trending listings are not paged
    pub fn is_paged(&self) -> bool {
        !matches!(self, Listing::TrendingDay | Listing::TrendingWeek)
    }
}

impl FromStr for Listing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(Listing::Popular),
            "now_playing" => Ok(Listing::NowPlaying),
            "top_rated" => Ok(Listing::TopRated),
            "upcoming" => Ok(Listing::Upcoming),
            "trending_day" => Ok(Listing::TrendingDay),
            "trending_week" => Ok(Listing::TrendingWeek),
            other => Err(format!("unknown listing: {other}")),
        }
    }
}

/// Core trait for catalog providers.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch one movie's details in the given locale.
    async fn details(&self, id: MovieId, locale: Locale) -> CartResult<Movie>;

    /// Search movies by title, one page at a time (pages start at 1).
    async fn search(&self, query: &str, page: u32, locale: Locale) -> CartResult<MoviePage>;

    /// Fetch a curated listing page.
    async fn listing(&self, listing: Listing, page: u32, locale: Locale) -> CartResult<MoviePage>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared catalog (dynamic dispatch)
pub type BoxedCatalog = Arc<dyn Catalog>;

/// Sort movies by vote average, best first. Unrated movies go last.
pub fn sort_by_rating(movies: &[Movie]) -> Vec<Movie> {
    let mut sorted = movies.to_vec();
    sorted.sort_by(|a, b| {
        let a = a.vote_average.unwrap_or(f64::MIN);
        let b = b.vote_average.unwrap_or(f64::MIN);
        b.total_cmp(&a)
    });
    sorted
}
