//! # Cart Store
//!
//! Exclusive owner of the cart contents. Every mutation rewrites the `cart`
//! record before returning, so the next mutation always starts from a
//! persisted state. Totals are derived on read from the items.

use crate::item::{CartItem, MovieId};
use crate::notify::{Notice, Notifier};
use crate::pricing::{DiscountPolicy, Totals};
use crate::storage::{BoxedStore, CART_KEY};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result of [`CartStore::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended; `was_empty` is set when this was the first item
    Added { was_empty: bool },
    /// An item with the same id is already in the cart
    AlreadyInCart,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

/// The cart: ordered items plus the rules to price them
pub struct CartStore {
    items: Vec<CartItem>,
    policy: DiscountPolicy,
    storage: BoxedStore,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Load the cart from storage.
    ///
    /// A missing record yields an empty cart. An unreadable or malformed
    /// record is discarded (and erased) instead of failing startup.
    pub fn load(storage: BoxedStore, notifier: Arc<dyn Notifier>, policy: DiscountPolicy) -> Self {
        let items = match storage.get(CART_KEY) {
            Ok(Some(raw)) => match parse_record(&raw) {
                Ok(items) => dedup_by_id(items),
                Err(reason) => {
                    warn!("Discarding malformed cart record: {}", reason);
                    if let Err(e) = storage.remove(CART_KEY) {
                        warn!("Failed to erase malformed cart record: {}", e);
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read cart record, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded cart with {} items", items.len());

        Self {
            items,
            policy,
            storage,
            notifier,
        }
    }

    /// Add an item. Adding an id that is already present changes nothing.
    pub fn add(&mut self, item: CartItem) -> AddOutcome {
        if self.contains(item.id) {
            debug!(id = item.id, "Item already in cart");
            return AddOutcome::AlreadyInCart;
        }

        let was_empty = self.items.is_empty();
        let notice = Notice::ItemAdded {
            id: item.id,
            title: item.title.clone(),
        };
        self.items.push(item);
        self.persist();
        self.notifier.notify(notice);

        AddOutcome::Added { was_empty }
    }

    /// Remove the item with `id`, if present
    pub fn remove(&mut self, id: MovieId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(index);
        self.persist();
        self.notifier.notify(Notice::ItemRemoved { id });
        Some(removed)
    }

    /// Empty the cart and erase the persisted record
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.storage.remove(CART_KEY) {
            warn!("Failed to erase cart record: {}", e);
        }
        debug!("Cart cleared");
    }

    /// User-initiated clear: same as [`clear`](Self::clear), plus a notice
    pub fn clear_all(&mut self) {
        self.clear();
        self.notifier.notify(Notice::CartCleared);
    }

    /// Current totals
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.items, &self.policy)
    }

    /// Items in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: MovieId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.items)
            .map_err(Into::into)
            .and_then(|json| self.storage.set(CART_KEY, &json));

        if let Err(e) = result {
            warn!("Failed to persist cart: {}", e);
        }
    }
}

/// Decode a cart record; every item must carry a usable price
fn parse_record(raw: &str) -> Result<Vec<CartItem>, String> {
    let items: Vec<CartItem> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    match items.iter().find(|item| !item.price.is_valid_item_price()) {
        Some(item) => Err(format!("item {} has price {}", item.id, item.price)),
        None => Ok(items),
    }
}

fn dedup_by_id(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut unique: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|kept| kept.id == item.id) {
            unique.push(item);
        }
    }
    unique
}

/// Shared handle to the single cart instance
#[derive(Clone)]
pub struct CartHandle {
    inner: Arc<Mutex<CartStore>>,
}

impl CartHandle {
    pub fn new(store: CartStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a read or a sequence of operations
    pub async fn lock(&self) -> MutexGuard<'_, CartStore> {
        self.inner.lock().await
    }

    pub async fn add(&self, item: CartItem) -> AddOutcome {
        self.inner.lock().await.add(item)
    }

    pub async fn remove(&self, id: MovieId) -> Option<CartItem> {
        self.inner.lock().await.remove(id)
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear()
    }

    pub async fn clear_all(&self) {
        self.inner.lock().await.clear_all()
    }

    pub async fn totals(&self) -> Totals {
        self.inner.lock().await.totals()
    }

    /// Snapshot of the items
    pub async fn items(&self) -> Vec<CartItem> {
        self.inner.lock().await.items().to_vec()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeBoard;
    use crate::price::Price;
    use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

    fn movie(id: MovieId, baht: i64) -> CartItem {
        CartItem::new(id, format!("Movie {id}"), Price::from_baht(baht))
    }

    fn new_store() -> (CartStore, Arc<MemoryStore>, Arc<NoticeBoard>) {
        let storage = Arc::new(MemoryStore::new());
        let board = NoticeBoard::new();
        let store = CartStore::load(storage.clone(), board.clone(), DiscountPolicy::default());
        (store, storage, board)
    }

    #[test]
    fn test_add_appends_in_order() {
        let (mut store, _, _) = new_store();

        assert_eq!(store.add(movie(3, 100)), AddOutcome::Added { was_empty: true });
        assert_eq!(store.add(movie(1, 150)), AddOutcome::Added { was_empty: false });

        let ids: Vec<_> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let (mut store, _, board) = new_store();
        store.add(movie(1, 100));
        let before = (store.items().to_vec(), store.totals());
        board.drain();

        let outcome = store.add(CartItem::new(1, "Different", Price::from_baht(999)));

        assert_eq!(outcome, AddOutcome::AlreadyInCart);
        assert_eq!((store.items().to_vec(), store.totals()), before);
        assert!(board.is_empty());
    }

    #[test]
    fn test_no_duplicates_over_mixed_sequence() {
        let (mut store, _, _) = new_store();
        let ops: [(bool, MovieId); 10] = [
            (true, 1),
            (true, 2),
            (true, 1),
            (false, 2),
            (true, 2),
            (true, 2),
            (false, 9),
            (true, 3),
            (true, 1),
            (false, 1),
        ];

        for (add, id) in ops {
            if add {
                store.add(movie(id, 200));
            } else {
                store.remove(id);
            }
            let mut ids: Vec<_> = store.items().iter().map(|i| i.id).collect();
            let len = ids.len();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), len);

            let totals = store.totals();
            assert_eq!(totals.final_price, totals.subtotal - totals.discount);
        }

        let ids: Vec<_> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_tier_scenario() {
        let (mut store, _, _) = new_store();
        store.add(movie(1, 100));
        store.add(movie(2, 150));
        store.add(movie(3, 200));

        let totals = store.totals();
        assert_eq!(totals.subtotal, Price::from_baht(450));
        assert_eq!(totals.discount, Price::from_baht(45));
        assert_eq!(totals.final_price, Price::from_baht(405));

        store.add(movie(4, 50));
        let totals = store.totals();
        assert_eq!(totals.subtotal, Price::from_baht(500));
        assert_eq!(totals.discount, Price::from_baht(50));
        assert_eq!(totals.final_price, Price::from_baht(450));

        store.add(movie(5, 100));
        let totals = store.totals();
        assert_eq!(totals.subtotal, Price::from_baht(600));
        assert_eq!(totals.discount, Price::from_baht(120));
        assert_eq!(totals.final_price, Price::from_baht(480));

        store.remove(5);
        let totals = store.totals();
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.subtotal, Price::from_baht(500));
        assert_eq!(totals.discount_percent, 10);
        assert_eq!(totals.discount, Price::from_baht(50));
    }

    #[test]
    fn test_remove_notifies_and_persists() {
        let (mut store, storage, board) = new_store();
        store.add(movie(1, 100));
        store.add(movie(2, 100));
        board.drain();

        assert_eq!(store.remove(1).map(|i| i.id), Some(1));
        assert!(store.remove(1).is_none());

        assert_eq!(board.drain(), vec![Notice::ItemRemoved { id: 1 }]);
        let raw = storage.get(CART_KEY).unwrap().unwrap();
        let persisted: Vec<CartItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.items());
    }

    #[test]
    fn test_clear_resets_everything() {
        let (mut store, storage, board) = new_store();
        store.add(movie(1, 100));
        store.add(movie(2, 100));
        store.add(movie(3, 100));
        board.drain();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.totals(), Totals::zero());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_all_notifies() {
        let (mut store, _, board) = new_store();
        store.add(movie(1, 100));
        board.drain();

        store.clear_all();

        assert!(store.is_empty());
        assert_eq!(board.drain(), vec![Notice::CartCleared]);
    }

    #[test]
    fn test_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage: BoxedStore = Arc::new(JsonFileStore::new(dir.path()));
        let board = NoticeBoard::new();

        let mut store = CartStore::load(storage.clone(), board.clone(), DiscountPolicy::default());
        store.add(movie(10, 250).with_poster("/x.jpg"));
        store.add(movie(20, 300));
        drop(store);

        let reloaded = CartStore::load(storage, board, DiscountPolicy::default());
        let ids: Vec<_> = reloaded.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(reloaded.items()[0].poster_path.as_deref(), Some("/x.jpg"));
        assert_eq!(reloaded.totals().subtotal, Price::from_baht(550));
    }

    #[test]
    fn test_malformed_record_is_discarded() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(CART_KEY, "{not json").unwrap();

        let store = CartStore::load(storage.clone(), NoticeBoard::new(), DiscountPolicy::default());

        assert!(store.is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_record_with_negative_price_is_discarded() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","price":-50000},{"id":2,"title":"B","price":10000}]"#,
            )
            .unwrap();

        let store = CartStore::load(storage.clone(), NoticeBoard::new(), DiscountPolicy::default());

        assert!(store.is_empty());
        assert_eq!(store.totals().final_price, Price::ZERO);
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_record_with_oversized_price_is_discarded() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                &format!(r#"[{{"id":1,"title":"A","price":{}}}]"#, i64::MAX),
            )
            .unwrap();

        let store = CartStore::load(storage.clone(), NoticeBoard::new(), DiscountPolicy::default());

        assert!(store.is_empty());
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_duplicate_ids_in_record_are_collapsed() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":1,"title":"A","price":100},{"id":1,"title":"B","price":200}]"#,
            )
            .unwrap();

        let store = CartStore::load(storage, NoticeBoard::new(), DiscountPolicy::default());

        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].title, "A");
    }

    #[tokio::test]
    async fn test_handle_shares_one_store() {
        let (store, _, _) = new_store();
        let handle = CartHandle::new(store);
        let other = handle.clone();

        handle.add(movie(1, 100)).await;
        other.add(movie(2, 100)).await;

        assert_eq!(handle.items().await.len(), 2);
        assert_eq!(other.totals().await.subtotal, Price::from_baht(200));

        other.clear().await;
        assert!(handle.is_empty().await);
    }
}
