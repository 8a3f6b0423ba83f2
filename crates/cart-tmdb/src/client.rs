//! # TMDB Catalog
//!
//! `Catalog` implementation over the TMDB v3 REST API.

use crate::config::TmdbConfig;
use async_trait::async_trait;
use cart_core::{CartError, CartResult, Catalog, Listing, Locale, Movie, MovieId, MoviePage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument};

const PROVIDER: &str = "tmdb";

/// TMDB catalog client
pub struct TmdbCatalog {
    config: TmdbConfig,
    client: Client,
}

impl TmdbCatalog {
    /// Create a new TMDB catalog client
    pub fn new(config: TmdbConfig) -> CartResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CartError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CartResult<Self> {
        let config = TmdbConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &TmdbConfig {
        &self.config
    }

    /// API path of a curated listing
    fn listing_path(listing: Listing) -> &'static str {
        match listing {
            Listing::Popular => "/movie/popular",
            Listing::NowPlaying => "/movie/now_playing",
            Listing::TopRated => "/movie/top_rated",
            Listing::Upcoming => "/movie/upcoming",
            Listing::TrendingDay => "/trending/movie/day",
            Listing::TrendingWeek => "/trending/movie/week",
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        locale: Locale,
        params: &[(&str, String)],
    ) -> CartResult<T> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("language", locale.api_language()),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("TMDB API error: path={}, status={}", path, status);

            // Parse TMDB error
            if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                return Err(CartError::Catalog {
                    provider: PROVIDER.to_string(),
                    message: format!("HTTP {}: {}", status.as_u16(), error_response.status_message),
                });
            }

            return Err(CartError::Catalog {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            CartError::Serialization(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait]
impl Catalog for TmdbCatalog {
    #[instrument(skip(self, locale), fields(locale = %locale))]
    async fn details(&self, id: MovieId, locale: Locale) -> CartResult<Movie> {
        let movie: Movie = self
            .get_json(&format!("/movie/{}", id), locale, &[])
            .await?;
        debug!("Fetched details for {}: {}", movie.id, movie.title);
        Ok(movie)
    }

    #[instrument(skip(self, locale), fields(locale = %locale))]
    async fn search(&self, query: &str, page: u32, locale: Locale) -> CartResult<MoviePage> {
        if query.trim().is_empty() {
            return Err(CartError::InvalidRequest("search query is empty".to_string()));
        }

        self.get_json(
            "/search/movie",
            locale,
            &[("query", query.to_string()), ("page", page.max(1).to_string())],
        )
        .await
    }

    #[instrument(skip(self, locale), fields(locale = %locale))]
    async fn listing(&self, listing: Listing, page: u32, locale: Locale) -> CartResult<MoviePage> {
        let params = if listing.is_paged() {
            vec![("page", page.max(1).to_string())]
        } else {
            Vec::new()
        };

        self.get_json(Self::listing_path(listing), locale, &params)
            .await
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// TMDB API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TmdbErrorResponse {
    status_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog(server: &MockServer) -> TmdbCatalog {
        TmdbCatalog::new(TmdbConfig::new("test-key").with_api_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_details_sends_key_and_language() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/550"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("language", "th-TH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 550,
                "title": "ไฟท์ คลับ",
                "poster_path": "/fc.jpg",
                "overview": "...",
                "release_date": "1999-10-15",
                "vote_average": 8.4,
                "runtime": 139
            })))
            .expect(1)
            .mount(&server)
            .await;

        let movie = catalog(&server).await.details(550, Locale::Thai).await.unwrap();

        assert_eq!(movie.id, 550);
        assert_eq!(movie.title, "ไฟท์ คลับ");
        assert_eq!(movie.poster_path.as_deref(), Some("/fc.jpg"));
        assert_eq!(movie.vote_average, Some(8.4));
    }

    #[tokio::test]
    async fn test_details_not_found_maps_to_catalog_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status_code": 34,
                "status_message": "The resource you requested could not be found."
            })))
            .mount(&server)
            .await;

        let err = catalog(&server).await.details(1, Locale::English).await.unwrap_err();

        match err {
            CartError::Catalog { provider, message } => {
                assert_eq!(provider, "tmdb");
                assert!(message.contains("could not be found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "matrix"))
            .and(query_param("page", "2"))
            .and(query_param("language", "en-US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 2,
                "results": [{"id": 603, "title": "The Matrix", "poster_path": null}],
                "total_pages": 3,
                "total_results": 41
            })))
            .mount(&server)
            .await;

        let page = catalog(&server)
            .await
            .search("matrix", 2, Locale::English)
            .await
            .unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].title, "The Matrix");
        assert!(page.results[0].poster_path.is_none());
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected_locally() {
        let server = MockServer::start().await;
        let err = catalog(&server)
            .await
            .search("  ", 1, Locale::English)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_trending_listing_is_not_paged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending/movie/week"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}],
                "total_pages": 1,
                "total_results": 2
            })))
            .mount(&server)
            .await;

        let page = catalog(&server)
            .await
            .listing(Listing::TrendingWeek, 4, Locale::English)
            .await
            .unwrap();
        assert_eq!(page.results.len(), 2);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.query().unwrap_or_default().contains("page="));
    }

    #[tokio::test]
    async fn test_network_error() {
        // Nothing listens on this port
        let config = TmdbConfig::new("k").with_api_base_url("http://127.0.0.1:1");
        let err = TmdbCatalog::new(config)
            .unwrap()
            .details(1, Locale::English)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_listing_paths() {
        assert_eq!(TmdbCatalog::listing_path(Listing::Popular), "/movie/popular");
        assert_eq!(TmdbCatalog::listing_path(Listing::TrendingDay), "/trending/movie/day");
    }

    #[test]
    fn test_timeout_is_taken_from_config() {
        let config = TmdbConfig::new("k").with_timeout(Duration::from_secs(2));
        let catalog = TmdbCatalog::new(config).unwrap();
        assert_eq!(catalog.config().timeout, Duration::from_secs(2));
    }
}
