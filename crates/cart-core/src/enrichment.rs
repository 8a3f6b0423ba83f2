//! # Item Enrichment
//!
//! Keeps the titles and posters shown for cart items in the active locale.
//! Enrichment only overlays display fields; ids, prices and membership come
//! from the [`CartStore`](crate::store::CartStore), which stays the source of
//! truth for persistence and totals.

use crate::catalog::BoxedCatalog;
use crate::item::{CartItem, MovieId};
use crate::locale::Locale;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

/// Fetch current details for every item and overlay them.
///
/// Lookups run concurrently. An item whose lookup fails keeps the fields it
/// came in with; one failure never fails the batch.
pub async fn enrich(catalog: &BoxedCatalog, items: Vec<CartItem>, locale: Locale) -> Vec<CartItem> {
    let mut lookups = JoinSet::new();
    for (index, item) in items.iter().enumerate() {
        let catalog = Arc::clone(catalog);
        let id = item.id;
        lookups.spawn(async move { (index, id, catalog.details(id, locale).await) });
    }

    let mut enriched = items;
    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((index, _, Ok(details))) => {
                if let Some(item) = enriched.get_mut(index) {
                    item.overlay(&details);
                }
            }
            Ok((_, id, Err(e))) => warn!("Failed to fetch details for movie {}: {}", id, e),
            Err(e) => warn!("Detail lookup task failed: {}", e),
        }
    }
    enriched
}

/// Display overlay for the cart, refreshed in batches
pub struct Enricher {
    catalog: BoxedCatalog,
    latest: AtomicU64,
    overlay: RwLock<HashMap<MovieId, CartItem>>,
}

impl Enricher {
    pub fn new(catalog: BoxedCatalog) -> Self {
        Self {
            catalog,
            latest: AtomicU64::new(0),
            overlay: RwLock::new(HashMap::new()),
        }
    }

    /// Re-fetch display fields for `items` in `locale`.
    ///
    /// Each call takes a new batch token. When the fetches finish, the result
    /// is stored only if no newer batch has started meanwhile. Returns whether
    /// this batch was applied.
    #[instrument(skip(self, items, locale), fields(items = items.len(), locale = %locale))]
    pub async fn refresh(&self, items: Vec<CartItem>, locale: Locale) -> bool {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        // Start from what is displayed now, so failed lookups keep it
        let base = self.view(&items).await;
        let enriched = enrich(&self.catalog, base, locale).await;

        let mut overlay = self.overlay.write().await;
        if self.latest.load(Ordering::SeqCst) != token {
            debug!(token, "Discarding superseded enrichment batch");
            return false;
        }

        *overlay = enriched.into_iter().map(|item| (item.id, item)).collect();
        debug!(token, "Applied enrichment batch");
        true
    }

    /// Items as they should be displayed: store order, ids and prices, with
    /// the latest fetched title and poster laid over them.
    pub async fn view(&self, items: &[CartItem]) -> Vec<CartItem> {
        let overlay = self.overlay.read().await;
        items
            .iter()
            .map(|item| match overlay.get(&item.id) {
                Some(shown) => CartItem {
                    title: shown.title.clone(),
                    poster_path: shown.poster_path.clone().or_else(|| item.poster_path.clone()),
                    ..item.clone()
                },
                None => item.clone(),
            })
            .collect()
    }

    /// Token of the most recently started batch
    pub fn latest_token(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
