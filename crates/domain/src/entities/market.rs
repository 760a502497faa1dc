//! Stock and fund quotes for the in-game market screen

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub code: String,
    pub name: String,
    pub price: f64,
    /// Percent change.
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    pub code: String,
    pub name: String,
    pub nav: f64,
    /// Percent change.
    pub change: f64,
}

/// What `/api/market` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub stocks: Vec<Stock>,
    pub funds: Vec<Fund>,
    /// ISO-8601 local time.
    pub timestamp: String,
}
