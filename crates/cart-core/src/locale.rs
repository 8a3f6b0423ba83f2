//! # Locale
//!
//! Active display language and the locale-dependent formatting used by the
//! cart: notice texts, amounts and the payment countdown.

use crate::price::Price;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported display languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    /// Short tag used in settings and storage ("th", "en")
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Thai => "th",
            Locale::English => "en",
        }
    }

    /// Language parameter understood by the catalog provider
    pub fn api_language(&self) -> &'static str {
        match self {
            Locale::Thai => "th-TH",
            Locale::English => "en-US",
        }
    }

    /// Format an amount with two decimals and thousands separators
    pub fn format_amount(&self, price: Price) -> String {
        let satang = price.satang();
        let sign = if satang < 0 { "-" } else { "" };
        let abs = satang.unsigned_abs();
        let whole = group_thousands(abs / 100);
        let cents = abs % 100;
        format!("{sign}{whole}.{cents:02} {}", self.currency_label())
    }

    fn currency_label(&self) -> &'static str {
        match self {
            Locale::Thai => "บาท",
            Locale::English => "THB",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "th" | "th-th" => Ok(Locale::Thai),
            "en" | "en-us" => Ok(Locale::English),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

/// Render seconds as `m:ss`
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        if value < 1000 {
            groups.push(value.to_string());
            break;
        }
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    groups.reverse();
    groups.join(",")
}
