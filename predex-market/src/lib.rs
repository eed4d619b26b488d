//! Predex Market Engine
//!
//! Per-market trading and settlement engine for outcome-share prediction
//! markets. Pricing is algorithmic: an LMSR cost-function market maker quotes
//! every trade against the outstanding share vector, so no counterparty
//! matching is needed and the implied probability of every outcome stays
//! coherent.
//!
//! # Key Components
//!
//! - [`Market`]: the engine — buy/sell execution, lifecycle state machine,
//!   oracle resolution, and payout settlement
//! - [`LmsrPricer`]: logarithmic-scoring-rule pricing with fail-closed
//!   fixed-point arithmetic
//! - [`OutcomeLedger`]: per-outcome supply and per-account share balances
//! - [`CollateralSink`]: the seam for outbound collateral payments
//! - [`MarketConfig`]: liquidity parameter and collateral scale
//!
//! # Example
//!
//! ```rust
//! use predex_market::{AccountId, InMemoryTreasury, Market, MarketConfig};
//! use chrono::{Duration, Utc};
//! use rust_decimal_macros::dec;
//! use smol_str::SmolStr;
//!
//! let now = Utc::now();
//! let mut market = Market::open(
//!     "Will Bitcoin reach $100k?",
//!     "crypto",
//!     vec![SmolStr::new("Yes"), SmolStr::new("No")],
//!     now + Duration::days(30),
//!     AccountId::from("oracle"),
//!     &MarketConfig::default(),
//! )
//! .unwrap();
//!
//! let alice = AccountId::from("alice");
//! let trade = market.buy(&alice, 0, dec!(10), None, now).unwrap();
//! assert!(trade.share_delta > dec!(0));
//!
//! // After expiry: anyone closes, the oracle resolves, winners claim.
//! let mut treasury = InMemoryTreasury::new();
//! market.trigger_expiry(now + Duration::days(31)).unwrap();
//! market.resolve(&AccountId::from("oracle"), 0).unwrap();
//! market.claim_payout(&alice, now + Duration::days(31), &mut treasury).unwrap();
//! ```

pub mod account;
pub mod collateral;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod market;
pub mod pricing;

// Re-exports for convenience
pub use account::AccountId;
pub use collateral::{CollateralSink, InMemoryTreasury};
pub use config::MarketConfig;
pub use error::{MarketError, PricingError, TransferError};
pub use event::{PayoutClaimed, Side, TradeExecuted};
pub use ledger::{OutcomeLedger, OutcomePool};
pub use market::{Market, MarketInfo, MarketState, OutcomeInfo};
pub use pricing::LmsrPricer;
