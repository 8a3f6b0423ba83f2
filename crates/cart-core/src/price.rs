//! # Price Types
//!
//! Money amounts for movie-cart. Everything is held in minor units
//! (satang, 1/100 baht) so percentage discounts on whole-baht prices stay exact.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Minor units per baht
pub const SATANG_PER_BAHT: i64 = 100;

/// Amount in the smallest currency unit (satang)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Largest price a single cart item may carry (1,000,000 baht)
    pub const MAX_ITEM: Price = Price(1_000_000 * SATANG_PER_BAHT);

    /// Create a price from whole baht
    pub fn from_baht(baht: i64) -> Self {
        Self(baht.saturating_mul(SATANG_PER_BAHT))
    }

    /// Create a price from minor units
    pub fn from_satang(satang: i64) -> Self {
        Self(satang)
    }

    /// Amount in minor units
    pub fn satang(&self) -> i64 {
        self.0
    }

    /// Get the decimal amount in baht
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / SATANG_PER_BAHT as f64
    }

    /// `percent`% of this amount, rounded down to the satang
    pub fn percent(&self, percent: u32) -> Price {
        let scaled = i128::from(self.0) * i128::from(percent) / 100;
        Price(i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX }))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether this is a usable item price: not negative and not above [`MAX_ITEM`](Self::MAX_ITEM)
    pub fn is_valid_item_price(&self) -> bool {
        (Price::ZERO..=Price::MAX_ITEM).contains(self)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.as_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baht_conversion() {
        let price = Price::from_baht(250);
        assert_eq!(price.satang(), 25_000);
        assert_eq!(price.as_decimal(), 250.0);
        assert_eq!(price.to_string(), "250.00");
    }

    #[test]
    fn test_percent_is_exact_for_whole_baht() {
        assert_eq!(Price::from_baht(455).percent(10), Price::from_satang(4_550));
        assert_eq!(Price::from_baht(600).percent(20), Price::from_baht(120));
    }

    #[test]
    fn test_item_price_bounds() {
        assert!(Price::ZERO.is_valid_item_price());
        assert!(Price::from_baht(499).is_valid_item_price());
        assert!(Price::MAX_ITEM.is_valid_item_price());
        assert!(!Price::from_satang(-1).is_valid_item_price());
        assert!(!(Price::MAX_ITEM + Price::from_satang(1)).is_valid_item_price());
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        assert_eq!(Price::from_baht(i64::MAX).satang(), i64::MAX);
        assert_eq!(Price::from_satang(i64::MAX).percent(20).satang(), i64::MAX / 5);
        assert_eq!((Price::from_satang(i64::MAX) + Price::from_baht(1)).satang(), i64::MAX);
        assert_eq!((Price::from_satang(i64::MIN) - Price::from_baht(1)).satang(), i64::MIN);
    }

    #[test]
    fn test_sum() {
        let prices = [Price::from_baht(100), Price::from_baht(150)];
        let total: Price = prices.iter().sum();
        assert_eq!(total, Price::from_baht(250));
    }

    #[test]
    fn test_serializes_as_minor_units() {
        let json = serde_json::to_string(&Price::from_baht(2)).unwrap();
        assert_eq!(json, "200");
    }
}
