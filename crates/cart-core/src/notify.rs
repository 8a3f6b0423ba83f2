//! # User-Facing Events
//!
//! Notices (toasts) and navigation requests raised by the cart and checkout.
//! Both are fire-and-forget sinks: the core never waits on them.

use crate::item::MovieId;
use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Maximum notices kept by [`NoticeBoard`] before the oldest are dropped
const NOTICE_CAPACITY: usize = 32;

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    ItemAdded { id: MovieId, title: String },
    ItemRemoved { id: MovieId },
    CartCleared,
    OrderConfirmed,
    PaymentExpired,
    CheckoutCompleted,
}

impl Notice {
    /// Localized toast text
    pub fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Notice::ItemAdded { .. }, Locale::English) => "Movie added to cart",
            (Notice::ItemAdded { .. }, Locale::Thai) => "เพิ่มภาพยนตร์ลงตะกร้าแล้ว",
            (Notice::ItemRemoved { .. }, Locale::English) => "Removed from Cart",
            (Notice::ItemRemoved { .. }, Locale::Thai) => "นำออกจากตะกร้าแล้ว",
            (Notice::CartCleared, Locale::English) => "All Items Removed from Cart",
            (Notice::CartCleared, Locale::Thai) => "นำสินค้าทั้งหมดออกจากตะกร้าแล้ว",
            (Notice::OrderConfirmed, Locale::English) => "Thank you for your order",
            (Notice::OrderConfirmed, Locale::Thai) => "ขอบคุณสำหรับคำสั่งซื้อ",
            (Notice::PaymentExpired, Locale::English) => {
                "Payment time has expired. Your order has been canceled. Please make a new order"
            }
            (Notice::PaymentExpired, Locale::Thai) => {
                "หมดเวลาชำระเงิน คำสั่งซื้อของคุณถูกยกเลิก กรุณาสั่งซื้อใหม่"
            }
            (Notice::CheckoutCompleted, Locale::English) => "Order Completed",
            (Notice::CheckoutCompleted, Locale::Thai) => "สั่งซื้อสำเร็จ",
        }
    }
}

/// Toast/notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Views the user can be sent to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Landing,
    Cart,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Cart => "/cart",
        }
    }
}

/// Route transition sink
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Bounded queue of notices waiting to be shown
#[derive(Debug, Default)]
pub struct NoticeBoard {
    pending: Mutex<VecDeque<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        info!(?notice, "notice");
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.len() == NOTICE_CAPACITY {
            pending.pop_front();
        }
        pending.push_back(notice);
    }
}

/// Remembers the last requested route
#[derive(Debug, Default)]
pub struct RouteTracker {
    current: Mutex<Route>,
}

impl RouteTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current(&self) -> Route {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RouteTracker {
    fn navigate(&self, route: Route) {
        info!(path = route.path(), "navigate");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = route;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_board_drains_in_order() {
        let board = NoticeBoard::new();
        board.notify(Notice::ItemRemoved { id: 1 });
        board.notify(Notice::CartCleared);

        assert_eq!(board.len(), 2);
        assert_eq!(
            board.drain(),
            vec![Notice::ItemRemoved { id: 1 }, Notice::CartCleared]
        );
        assert!(board.is_empty());
    }

    #[test]
    fn test_notice_board_is_bounded() {
        let board = NoticeBoard::new();
        for id in 0..(NOTICE_CAPACITY as u64 + 5) {
            board.notify(Notice::ItemRemoved { id });
        }

        let drained = board.drain();
        assert_eq!(drained.len(), NOTICE_CAPACITY);
        assert_eq!(drained[0], Notice::ItemRemoved { id: 5 });
    }

    #[test]
    fn test_notice_serialization() {
        let json = serde_json::to_value(Notice::ItemAdded {
            id: 7,
            title: "Up".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "item_added");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_route_tracker() {
        let tracker = RouteTracker::new();
        tracker.navigate(Route::Cart);
        assert_eq!(tracker.current(), Route::Cart);
        tracker.navigate(Route::Landing);
        assert_eq!(tracker.current().path(), "/");
    }
}
