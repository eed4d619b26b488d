//! Configuration types for the market engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration applied to each market at creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// LMSR liquidity parameter `b`: controls price sensitivity and bounds
    /// the maker's maximum loss at `b * ln(num_outcomes)`.
    pub liquidity: Decimal,
    /// Decimal places of the collateral unit; refunds and payouts are
    /// rounded down to this scale (e.g., 6 for micro-units).
    pub collateral_scale: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            liquidity: Decimal::new(100, 0),
            collateral_scale: 6,
        }
    }
}
