//! # Pricing
//!
//! Cart totals and the count-based discount tiers.
//!
//! Totals are a pure function of the item list, so they can never drift from
//! the cart contents.

use crate::error::{CartError, CartResult};
use crate::item::CartItem;
use crate::price::Price;
use serde::{Deserialize, Serialize};

/// A percentage discount unlocked by holding at least `min_items` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub min_items: usize,
    pub percent: u32,
}

impl DiscountTier {
    pub fn new(min_items: usize, percent: u32) -> Self {
        Self { min_items, percent }
    }
}

/// Discount tiers, evaluated on the number of distinct items in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<DiscountTier>,
}

fn default_tiers() -> Vec<DiscountTier> {
    vec![DiscountTier::new(3, 10), DiscountTier::new(5, 20)]
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

impl DiscountPolicy {
    /// Policy that never discounts
    pub fn none() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Percentage for a cart holding `count` items.
    ///
    /// The tier with the highest satisfied threshold wins.
    pub fn percent_for(&self, count: usize) -> u32 {
        self.tiers
            .iter()
            .filter(|tier| count >= tier.min_items)
            .max_by_key(|tier| tier.min_items)
            .map(|tier| tier.percent)
            .unwrap_or(0)
    }

    /// Reject tiers that could push the final price below zero
    pub fn validate(&self) -> CartResult<()> {
        match self.tiers.iter().find(|tier| tier.percent > 100) {
            Some(tier) => Err(CartError::Configuration(format!(
                "discount tier for {} items is {}%, above 100%",
                tier.min_items, tier.percent
            ))),
            None => Ok(()),
        }
    }
}

/// Derived cart totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub item_count: usize,
    pub subtotal: Price,
    pub discount_percent: u32,
    pub discount: Price,
    pub final_price: Price,
}

impl Totals {
    /// Compute totals for the given items
    pub fn compute(items: &[CartItem], policy: &DiscountPolicy) -> Self {
        let item_count = items.len();
        let subtotal: Price = items.iter().map(|item| item.price).sum();
        let discount_percent = policy.percent_for(item_count);
        let discount = subtotal.percent(discount_percent);

        Self {
            item_count,
            subtotal,
            discount_percent,
            discount,
            final_price: subtotal - discount,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn has_discount(&self) -> bool {
        !self.discount.is_zero()
    }
}
