//! # Price Book
//!
//! Movies have no list price, so each one gets a random whole-baht price the
//! first time it is seen. The price is recorded so the same movie costs the
//! same on every visit.

use crate::error::CartResult;
use crate::item::MovieId;
use crate::price::Price;
use crate::storage::{BoxedStore, PRICES_KEY};
use rand::Rng;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Range generated prices are drawn from, in whole baht
pub const PRICE_RANGE_BAHT: RangeInclusive<i64> = 200..=499;

/// Persisted id → price mapping
pub struct PriceBook {
    storage: BoxedStore,
    // Serializes read-modify-write of the record
    lock: Mutex<()>,
}

impl PriceBook {
    pub fn new(storage: BoxedStore) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// Price for a movie, generating and recording one if it is new
    pub async fn price_for(&self, id: MovieId) -> Price {
        let _guard = self.lock.lock().await;
        let mut prices = self.load();

        if let Some(baht) = prices.get(&id) {
            let recorded = Price::from_baht(*baht);
            if recorded.is_valid_item_price() {
                return recorded;
            }
            warn!(id, baht, "Replacing out-of-range recorded price");
        }

        let baht = rand::thread_rng().gen_range(PRICE_RANGE_BAHT);
        prices.insert(id, baht);
        debug!(id, baht, "Generated price");

        if let Err(e) = self.save(&prices) {
            warn!("Failed to record price for {}: {}", id, e);
        }

        Price::from_baht(baht)
    }

    fn load(&self) -> BTreeMap<MovieId, i64> {
        match self.storage.get(PRICES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed price record: {}", e);
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read price record: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn save(&self, prices: &BTreeMap<MovieId, i64>) -> CartResult<()> {
        let json = serde_json::to_string(prices)?;
        self.storage.set(PRICES_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_price_is_stable() {
        let storage = Arc::new(MemoryStore::new());
        let book = PriceBook::new(storage.clone());

        let first = book.price_for(550).await;
        let again = book.price_for(550).await;
        assert_eq!(first, again);

        let baht = first.satang() / 100;
        assert!(PRICE_RANGE_BAHT.contains(&baht));

        // A fresh book over the same storage sees the same price
        let reopened = PriceBook::new(storage);
        assert_eq!(reopened.price_for(550).await, first);
    }

    #[tokio::test]
    async fn test_uses_recorded_price() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(PRICES_KEY, r#"{"27205": 321}"#).unwrap();
        let book = PriceBook::new(storage.clone());

        assert_eq!(book.price_for(27205).await, Price::from_baht(321));
    }

    #[tokio::test]
    async fn test_out_of_range_record_is_regenerated() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(PRICES_KEY, r#"{"1": -5, "2": 9223372036854775807}"#).unwrap();
        let book = PriceBook::new(storage.clone());

        for id in [1, 2] {
            let price = book.price_for(id).await;
            assert!(PRICE_RANGE_BAHT.contains(&(price.satang() / 100)));
            assert_eq!(book.price_for(id).await, price);
        }
    }

    #[tokio::test]
    async fn test_records_new_prices() {
        let storage = Arc::new(MemoryStore::new());
        let book = PriceBook::new(storage.clone());

        book.price_for(1).await;
        book.price_for(2).await;

        let raw = storage.get(PRICES_KEY).unwrap().unwrap();
        let recorded: BTreeMap<MovieId, i64> = serde_json::from_str(&raw).unwrap();
        assert_eq!(recorded.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_record_starts_over() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(PRICES_KEY, "oops").unwrap();
        let book = PriceBook::new(storage);

        let price = book.price_for(9).await;
        assert!(PRICE_RANGE_BAHT.contains(&(price.satang() / 100)));
    }
}
