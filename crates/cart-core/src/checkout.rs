//! # Checkout Session
//!
//! Timed payment confirmation for the cart.
//!
//! ```text
//!            begin (cart not empty)
//!   Idle ───────────────────────────▶ AwaitingPayment ◀─┐ tick (remaining -= 1)
//!    ▲  ▲                              │   │   │        │
//!    │  │ dismiss                      │   │   └────────┘
//!    │  └──────────────────────────────┘   │
//!    │                          confirm    │   remaining == 0
//!    │ cleanup (clears cart)  ┌────────────┘───────────────┐
//!    │                        ▼                            ▼
//!    └──────────────────── Confirmed                    Expired ── dismiss / begin
//! ```
//!
//! Each phase owns the timer it needs (the countdown ticker or the deferred
//! cleanup). Leaving a phase always aborts its timer, and timer tasks only hold
//! a weak reference to the session state, so a dropped session is never
//! touched by a late tick.

use crate::error::{CartError, CartResult};
use crate::notify::{Navigator, Notice, Notifier, Route};
use crate::pricing::Totals;
use crate::store::{CartHandle, CartStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Observable checkout status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Idle,
    AwaitingPayment,
    Confirmed,
    Expired,
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckoutStatus::Idle => "idle",
            CheckoutStatus::AwaitingPayment => "awaiting payment",
            CheckoutStatus::Confirmed => "confirmed",
            CheckoutStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// Timing of the confirmation flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Seconds the user has to confirm payment
    #[serde(default = "default_window_secs")]
    pub window_secs: u32,

    /// Countdown tick period
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// Delay between confirmation and clearing the cart
    #[serde(default = "default_cleanup_delay_millis")]
    pub cleanup_delay_millis: u64,
}

fn default_window_secs() -> u32 {
    60
}

fn default_tick_millis() -> u64 {
    1_000
}

fn default_cleanup_delay_millis() -> u64 {
    2_000
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            tick_millis: default_tick_millis(),
            cleanup_delay_millis: default_cleanup_delay_millis(),
        }
    }
}

impl CheckoutSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_delay_millis)
    }

    pub fn validate(&self) -> CartResult<()> {
        if self.window_secs == 0 {
            return Err(CartError::Configuration(
                "checkout window_secs must be positive".to_string(),
            ));
        }
        if self.tick_millis == 0 {
            return Err(CartError::Configuration(
                "checkout tick_millis must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of the checkout, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSnapshot {
    pub status: CheckoutStatus,

    /// Current (or last finished) attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,

    /// Only set while awaiting payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    pub totals: Totals,
}

/// One confirmation attempt
#[derive(Debug, Clone)]
struct Attempt {
    id: Uuid,
    started_at: DateTime<Utc>,
    remaining: u32,
}

impl Attempt {
    fn new(window_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            remaining: window_secs,
        }
    }
}

/// Session state; each variant owns the timer it depends on
#[derive(Debug)]
enum Phase {
    Idle,
    AwaitingPayment { attempt: Attempt, ticker: AbortHandle },
    Confirmed { attempt: Attempt, cleanup: AbortHandle },
    Expired { attempt: Attempt },
}

impl Phase {
    fn status(&self) -> CheckoutStatus {
        match self {
            Phase::Idle => CheckoutStatus::Idle,
            Phase::AwaitingPayment { .. } => CheckoutStatus::AwaitingPayment,
            Phase::Confirmed { .. } => CheckoutStatus::Confirmed,
            Phase::Expired { .. } => CheckoutStatus::Expired,
        }
    }

    fn attempt(&self) -> Option<&Attempt> {
        match self {
            Phase::Idle => None,
            Phase::AwaitingPayment { attempt, .. }
            | Phase::Confirmed { attempt, .. }
            | Phase::Expired { attempt } => Some(attempt),
        }
    }

    fn cancel_timer(&self) {
        match self {
            Phase::AwaitingPayment { ticker, .. } => ticker.abort(),
            Phase::Confirmed { cleanup, .. } => cleanup.abort(),
            Phase::Idle | Phase::Expired { .. } => {}
        }
    }

    fn snapshot(&self, totals: Totals) -> CheckoutSnapshot {
        let attempt = self.attempt();
        CheckoutSnapshot {
            status: self.status(),
            session_id: attempt.map(|a| a.id),
            remaining_seconds: match self {
                Phase::AwaitingPayment { attempt, .. } => Some(attempt.remaining),
                _ => None,
            },
            started_at: attempt.map(|a| a.started_at),
            totals,
        }
    }
}

/// The single checkout flow of the application
pub struct CheckoutSession {
    state: Arc<Mutex<Phase>>,
    cart: CartHandle,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    settings: CheckoutSettings,
}

impl CheckoutSession {
    pub fn new(
        cart: CartHandle,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(Phase::Idle)),
            cart,
            notifier,
            navigator,
            settings,
        }
    }

    /// Start a new attempt and its countdown.
    ///
    /// Allowed from `Idle` and from a finished `Expired` attempt, and only
    /// when the cart has items.
    pub async fn begin(&self) -> CartResult<CheckoutSnapshot> {
        let mut phase = self.state.lock().await;
        if let Phase::AwaitingPayment { .. } | Phase::Confirmed { .. } = &*phase {
            return Err(CartError::InvalidTransition {
                from: phase.status(),
                action: "begin checkout",
            });
        }

        let totals = self.cart.totals().await;
        if totals.item_count == 0 {
            return Err(CartError::EmptyCart);
        }

        let attempt = Attempt::new(self.settings.window_secs);
        let ticker = self.spawn_ticker(attempt.id);
        info!(
            session_id = %attempt.id,
            items = totals.item_count,
            final_price = %totals.final_price,
            "Checkout started"
        );

        *phase = Phase::AwaitingPayment { attempt, ticker };
        Ok(phase.snapshot(totals))
    }

    /// Confirm payment. The cart is cleared after the cleanup delay.
    pub async fn confirm(&self) -> CartResult<CheckoutSnapshot> {
        let mut phase = self.state.lock().await;
        match std::mem::replace(&mut *phase, Phase::Idle) {
            Phase::AwaitingPayment { attempt, ticker } => {
                if self.cart.is_empty().await {
                    *phase = Phase::AwaitingPayment { attempt, ticker };
                    return Err(CartError::EmptyCart);
                }
                ticker.abort();
                let cleanup = self.spawn_cleanup(attempt.id);
                info!(
                    session_id = %attempt.id,
                    remaining = attempt.remaining,
                    "Checkout confirmed"
                );
                *phase = Phase::Confirmed { attempt, cleanup };
            }
            other => {
                let from = other.status();
                *phase = other;
                return Err(CartError::InvalidTransition {
                    from,
                    action: "confirm",
                });
            }
        }

        self.notifier.notify(Notice::OrderConfirmed);
        let totals = self.cart.totals().await;
        Ok(phase.snapshot(totals))
    }

    /// Close the payment dialog.
    ///
    /// While awaiting payment this cancels the attempt and keeps the cart.
    /// An expired attempt is cleared away. A confirmed attempt keeps its
    /// pending cleanup.
    pub async fn dismiss(&self) -> CartResult<CheckoutSnapshot> {
        let mut phase = self.state.lock().await;
        match std::mem::replace(&mut *phase, Phase::Idle) {
            Phase::AwaitingPayment { attempt, ticker } => {
                ticker.abort();
                info!(
                    session_id = %attempt.id,
                    remaining = attempt.remaining,
                    "Checkout dismissed"
                );
            }
            Phase::Expired { attempt } => {
                debug!(session_id = %attempt.id, "Expired checkout dismissed");
            }
            Phase::Idle => {}
            confirmed @ Phase::Confirmed { .. } => {
                *phase = confirmed;
            }
        }

        let totals = self.cart.totals().await;
        Ok(phase.snapshot(totals))
    }

    /// Apply a cart mutation unless a payment is pending or confirmed.
    ///
    /// The checkout state stays locked for the whole edit.
    pub async fn edit_cart<R>(&self, edit: impl FnOnce(&mut CartStore) -> R) -> CartResult<R> {
        let phase = self.state.lock().await;
        if let Phase::AwaitingPayment { .. } | Phase::Confirmed { .. } = &*phase {
            return Err(CartError::InvalidTransition {
                from: phase.status(),
                action: "change the cart",
            });
        }

        let mut cart = self.cart.lock().await;
        Ok(edit(&mut cart))
    }

    /// Current state plus cart totals
    pub async fn snapshot(&self) -> CheckoutSnapshot {
        let phase = self.state.lock().await;
        let totals = self.cart.totals().await;
        phase.snapshot(totals)
    }

    pub async fn status(&self) -> CheckoutStatus {
        self.state.lock().await.status()
    }

    /// Abort any pending timer and return to `Idle`
    pub async fn teardown(&self) {
        let mut phase = self.state.lock().await;
        phase.cancel_timer();
        *phase = Phase::Idle;
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    fn spawn_ticker(&self, id: Uuid) -> AbortHandle {
        let state = Arc::downgrade(&self.state);
        let notifier = Arc::clone(&self.notifier);
        let period = self.settings.tick();

        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                if !on_tick(&state, id, notifier.as_ref()).await {
                    break;
                }
            }
        })
        .abort_handle()
    }

    fn spawn_cleanup(&self, id: Uuid) -> AbortHandle {
        let state = Arc::downgrade(&self.state);
        let cart = self.cart.clone();
        let notifier = Arc::clone(&self.notifier);
        let navigator = Arc::clone(&self.navigator);
        let delay = self.settings.cleanup_delay();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(state) = state.upgrade() else {
                return;
            };

            let mut phase = state.lock().await;
            match &*phase {
                Phase::Confirmed { attempt, .. } if attempt.id == id => {}
                _ => return,
            }

            cart.clear().await;
            *phase = Phase::Idle;
            info!(session_id = %id, "Checkout completed");
            notifier.notify(Notice::CheckoutCompleted);
            navigator.navigate(Route::Landing);
        })
        .abort_handle()
    }
}

impl Drop for CheckoutSession {
    fn drop(&mut self) {
        match self.state.try_lock() {
            Ok(phase) => phase.cancel_timer(),
            // A timer task holds the lock; it finds the session gone on its next wake
            Err(_) => warn!("Checkout state busy during teardown"),
        }
    }
}

/// Count down one second. Returns whether the ticker should keep running.
async fn on_tick(state: &Weak<Mutex<Phase>>, id: Uuid, notifier: &dyn Notifier) -> bool {
    let Some(state) = state.upgrade() else {
        return false;
    };
    let mut phase = state.lock().await;

    match &mut *phase {
        Phase::AwaitingPayment { attempt, .. } if attempt.id == id => {
            attempt.remaining = attempt.remaining.saturating_sub(1);
            if attempt.remaining > 0 {
                return true;
            }
        }
        _ => return false,
    }

    if let Phase::AwaitingPayment { attempt, .. } = std::mem::replace(&mut *phase, Phase::Idle) {
        info!(session_id = %attempt.id, "Checkout expired");
        *phase = Phase::Expired { attempt };
        notifier.notify(Notice::PaymentExpired);
    }
    false
}
