//! # Request Handlers
//!
//! Axum request handlers for the cart API.
//! Amounts are returned both in satang and formatted for the active locale.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cart_core::{
    format_countdown, sort_by_rating, AddOutcome, CartError, CartItem, CartStore, CheckoutSnapshot,
    Listing, Locale, Movie, MovieId, MoviePage, Notice, Price, Totals,
};
use cart_tmdb::{image_url, DEFAULT_POSTER_SIZE, THUMBNAIL_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Paging and ordering for catalog pages
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    /// `rating` orders results by vote average, highest first
    #[serde(default)]
    pub sort: Option<String>,
}

/// Search request
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Add-to-cart request
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: MovieId,
    pub title: String,
    #[serde(default, alias = "posterPath")]
    pub poster_path: Option<String>,
}

/// Locale switch request
#[derive(Debug, Deserialize)]
pub struct LocaleRequest {
    pub locale: String,
}

/// An amount in satang with its localized rendering
#[derive(Debug, Serialize)]
pub struct Amount {
    pub satang: Price,
    pub display: String,
}

impl Amount {
    fn new(price: Price, locale: Locale) -> Self {
        Self {
            satang: price,
            display: locale.format_amount(price),
        }
    }
}

/// Catalog movie with its price
#[derive(Debug, Serialize)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: Movie,
    pub poster_url: String,
    pub price: Amount,
    pub in_cart: bool,
}

/// A page of priced movies
#[derive(Debug, Serialize)]
pub struct MoviePageView {
    pub page: u32,
    pub results: Vec<MovieView>,
    pub total_pages: u32,
    pub total_results: u32,
}

/// Cart line as displayed
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub poster_url: String,
    pub price: Amount,
}

#[derive(Debug, Serialize)]
pub struct TotalsView {
    pub item_count: usize,
    pub subtotal: Amount,
    pub discount_percent: u32,
    pub discount: Amount,
    pub final_price: Amount,
}

impl TotalsView {
    fn new(totals: Totals, locale: Locale) -> Self {
        Self {
            item_count: totals.item_count,
            subtotal: Amount::new(totals.subtotal, locale),
            discount_percent: totals.discount_percent,
            discount: Amount::new(totals.discount, locale),
            final_price: Amount::new(totals.final_price, locale),
        }
    }
}

/// Cart contents and totals
#[derive(Debug, Serialize)]
pub struct CartView {
    pub locale: Locale,
    pub items: Vec<CartItemView>,
    pub totals: TotalsView,
}

/// Add-to-cart response
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    /// False when the movie was already in the cart
    pub added: bool,
    pub cart: CartView,
}

/// Checkout state with the countdown rendered
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    #[serde(flatten)]
    pub snapshot: CheckoutSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<String>,
    pub amount_due: Amount,
}

#[derive(Debug, Serialize)]
pub struct LocaleView {
    pub locale: Locale,
    pub language: &'static str,
}

/// Notice with its localized text
#[derive(Debug, Serialize)]
pub struct NoticeView {
    #[serde(flatten)]
    pub notice: Notice,
    pub message: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn cart_error_to_response(err: CartError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if err.is_retryable() {
        response = response.with_details("retryable");
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "movie-cart",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Search the catalog by title
#[instrument(skip(state, query), fields(query = %query.query))]
pub async fn search_movies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<MoviePageView>, ApiError> {
    let locale = state.locale().await;
    let page = state
        .catalog
        .search(&query.query, query.page.unwrap_or(1), locale)
        .await
        .map_err(cart_error_to_response)?;

    Ok(Json(price_page(&state, page, query.sort.as_deref(), locale).await))
}

/// Curated listing (popular, now_playing, top_rated, upcoming, trending_day, trending_week)
#[instrument(skip(state, paging))]
pub async fn list_movies(
    State(state): State<AppState>,
    Path(listing): Path<String>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<MoviePageView>, ApiError> {
    let listing: Listing = listing
        .parse()
        .map_err(|e: String| cart_error_to_response(CartError::InvalidRequest(e)))?;

    let locale = state.locale().await;
    let page = state
        .catalog
        .listing(listing, paging.page.unwrap_or(1), locale)
        .await
        .map_err(cart_error_to_response)?;

    Ok(Json(price_page(&state, page, paging.sort.as_deref(), locale).await))
}

/// Movie details with price
#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<MovieView>, ApiError> {
    let locale = state.locale().await;
    let movie = state
        .catalog
        .details(id, locale)
        .await
        .map_err(cart_error_to_response)?;
    let in_cart = state.cart.lock().await.contains(id);

    Ok(Json(movie_view(&state, movie, in_cart, locale).await))
}

/// Current cart view
pub async fn get_cart(State(state): State<AppState>) -> Json<CartView> {
    Json(cart_view(&state).await)
}

/// Add a movie to the cart at its price-book price.
///
/// The first movie in an empty cart starts a background re-localization.
#[instrument(skip(state, request), fields(id = request.id))]
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<AddItemResponse>), ApiError> {
    if request.title.trim().is_empty() {
        return Err(cart_error_to_response(CartError::InvalidRequest(
            "title must not be empty".to_string(),
        )));
    }

    let price = state.prices.price_for(request.id).await;
    let mut item = CartItem::new(request.id, request.title, price);
    item.poster_path = request.poster_path;

    let outcome = state
        .checkout
        .edit_cart(|cart| cart.add(item))
        .await
        .map_err(cart_error_to_response)?;
    if let AddOutcome::Added { was_empty: true } = outcome {
        state.spawn_refresh();
    }

    let status = if outcome.is_added() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(AddItemResponse {
            added: outcome.is_added(),
            cart: cart_view(&state).await,
        }),
    ))
}

/// Remove a movie from the cart
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> Result<Json<CartView>, ApiError> {
    let removed = state
        .checkout
        .edit_cart(|cart| cart.remove(id))
        .await
        .map_err(cart_error_to_response)?;
    if removed.is_none() {
        return Err(cart_error_to_response(CartError::ItemNotFound { item_id: id }));
    }
    Ok(Json(cart_view(&state).await))
}

/// Remove every movie from the cart
pub async fn clear_cart(State(state): State<AppState>) -> Result<Json<CartView>, ApiError> {
    state
        .checkout
        .edit_cart(CartStore::clear_all)
        .await
        .map_err(cart_error_to_response)?;
    Ok(Json(cart_view(&state).await))
}

/// Current checkout state
pub async fn get_checkout(State(state): State<AppState>) -> Json<CheckoutView> {
    let snapshot = state.checkout.snapshot().await;
    Json(checkout_view(snapshot, state.locale().await))
}

/// Start the payment countdown
#[instrument(skip(state))]
pub async fn begin_checkout(
    State(state): State<AppState>,
) -> Result<Json<CheckoutView>, ApiError> {
    let snapshot = state
        .checkout
        .begin()
        .await
        .map_err(cart_error_to_response)?;

    if let Some(session_id) = snapshot.session_id {
        info!(%session_id, total = %snapshot.totals.final_price, "Checkout started");
    }
    Ok(Json(checkout_view(snapshot, state.locale().await)))
}

/// Payment received
#[instrument(skip(state))]
pub async fn confirm_checkout(
    State(state): State<AppState>,
) -> Result<Json<CheckoutView>, ApiError> {
    let snapshot = state
        .checkout
        .confirm()
        .await
        .map_err(cart_error_to_response)?;
    Ok(Json(checkout_view(snapshot, state.locale().await)))
}

/// Close the payment dialog
#[instrument(skip(state))]
pub async fn dismiss_checkout(
    State(state): State<AppState>,
) -> Result<Json<CheckoutView>, ApiError> {
    let snapshot = state
        .checkout
        .dismiss()
        .await
        .map_err(cart_error_to_response)?;
    Ok(Json(checkout_view(snapshot, state.locale().await)))
}

/// Active locale
pub async fn get_locale(State(state): State<AppState>) -> Json<LocaleView> {
    Json(locale_view(state.locale().await))
}

/// Switch locale; cart titles are re-fetched in the background
#[instrument(skip(state, request), fields(locale = %request.locale))]
pub async fn set_locale(
    State(state): State<AppState>,
    Json(request): Json<LocaleRequest>,
) -> Result<Json<LocaleView>, ApiError> {
    let locale: Locale = request
        .locale
        .parse()
        .map_err(|e: String| cart_error_to_response(CartError::InvalidRequest(e)))?;

    state.set_locale(locale).await;
    Ok(Json(locale_view(locale)))
}

/// Take the pending notices, localized
pub async fn drain_notices(State(state): State<AppState>) -> Json<Vec<NoticeView>> {
    let locale = state.locale().await;
    let notices = state
        .notices
        .drain()
        .into_iter()
        .map(|notice| NoticeView {
            message: notice.message(locale),
            notice,
        })
        .collect();
    Json(notices)
}

// =============================================================================
// View builders
// =============================================================================

async fn cart_view(state: &AppState) -> CartView {
    let locale = state.locale().await;

    // Items and totals from one lock so they always agree
    let (items, totals) = {
        let cart = state.cart.lock().await;
        (cart.items().to_vec(), cart.totals())
    };

    let items = state
        .enricher
        .view(&items)
        .await
        .into_iter()
        .map(|item| CartItemView {
            poster_url: image_url(&state.image_base_url, item.poster_path.as_deref(), THUMBNAIL_SIZE),
            price: Amount::new(item.price, locale),
            id: item.id,
            title: item.title,
            poster_path: item.poster_path,
        })
        .collect();

    CartView {
        locale,
        items,
        totals: TotalsView::new(totals, locale),
    }
}

async fn movie_view(state: &AppState, movie: Movie, in_cart: bool, locale: Locale) -> MovieView {
    let price = state.prices.price_for(movie.id).await;
    MovieView {
        poster_url: image_url(&state.image_base_url, movie.poster_path.as_deref(), DEFAULT_POSTER_SIZE),
        price: Amount::new(price, locale),
        in_cart,
        movie,
    }
}

async fn price_page(
    state: &AppState,
    page: MoviePage,
    sort: Option<&str>,
    locale: Locale,
) -> MoviePageView {
    let in_cart: HashSet<MovieId> = state.cart.items().await.iter().map(|item| item.id).collect();

    let movies = match sort {
        Some("rating") => sort_by_rating(&page.results),
        _ => page.results,
    };

    let mut results = Vec::with_capacity(movies.len());
    for movie in movies {
        let listed = in_cart.contains(&movie.id);
        results.push(movie_view(state, movie, listed, locale).await);
    }

    MoviePageView {
        page: page.page,
        results,
        total_pages: page.total_pages,
        total_results: page.total_results,
    }
}

fn checkout_view(snapshot: CheckoutSnapshot, locale: Locale) -> CheckoutView {
    CheckoutView {
        countdown: snapshot.remaining_seconds.map(format_countdown),
        amount_due: Amount::new(snapshot.totals.final_price, locale),
        snapshot,
    }
}

fn locale_view(locale: Locale) -> LocaleView {
    LocaleView {
        locale,
        language: locale.api_language(),
    }
}
