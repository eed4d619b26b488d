//! Trade and settlement records emitted by the engine.
//!
//! Each mutating operation returns its record; the market also keeps them in
//! an in-order log for downstream indexing (price charts, attribution).

use crate::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::{Display, Formatter};

/// Trade direction.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Record of an executed buy or sell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TradeExecuted {
    /// Trading account.
    pub account: AccountId,
    /// Outcome traded.
    pub outcome_id: usize,
    /// Buy or sell.
    pub side: Side,
    /// Shares credited (buy) or debited (sell).
    pub share_delta: Decimal,
    /// Collateral paid in (buy) or refunded out (sell).
    pub collateral_delta: Decimal,
    /// Price of the traded outcome after the trade.
    pub resulting_price: Decimal,
    /// Opaque attribution tag forwarded to external accounting; no effect
    /// on pricing or settlement.
    pub referral: Option<SmolStr>,
    /// Execution time.
    pub time: DateTime<Utc>,
}

/// Record of a winning-share redemption.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayoutClaimed {
    /// Claiming account.
    pub account: AccountId,
    /// Winning shares burned.
    pub shares_redeemed: Decimal,
    /// Collateral paid out (1:1 with shares, minus rounding dust).
    pub amount: Decimal,
    /// Claim time.
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_record_serializes_for_indexing() {
        let record = TradeExecuted {
            account: AccountId::from("alice"),
            outcome_id: 0,
            side: Side::Buy,
            share_delta: dec!(3),
            collateral_delta: dec!(1.5),
            resulting_price: dec!(0.52),
            referral: Some(SmolStr::new("ref-123")),
            time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["side"], "buy");
        assert_eq!(json["account"], "alice");
        assert_eq!(json["referral"], "ref-123");
    }
}
