//! Error types for the market engine.
//!
//! Every failure is a synchronous, atomic rejection: the call that produced
//! it leaves no partial mutation behind.

use crate::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by [`Market`](crate::market::Market) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    /// Outcome id outside `[0, num_outcomes)`.
    #[error("invalid outcome id {outcome_id} (market has {num_outcomes} outcomes)")]
    InvalidOutcome {
        outcome_id: usize,
        num_outcomes: usize,
    },

    /// Buy/sell attempted while the market is not open or past expiry.
    #[error("market is not open for trading")]
    MarketNotOpen,

    /// `trigger_expiry` called before the expiry time.
    #[error("market has not reached its expiry time")]
    NotExpired,

    /// `resolve` called while the market is still open.
    #[error("market must be closed before it can be resolved")]
    NotClosed,

    /// `claim_payout` called before the market is resolved.
    #[error("market is not resolved")]
    NotResolved,

    /// Caller lacks the capability the operation requires.
    #[error("caller {caller} is not authorized")]
    Unauthorized { caller: AccountId },

    /// `resolve` called on an already-resolved market.
    #[error("market is already resolved")]
    AlreadyResolved,

    /// Sell amount exceeds the caller's share balance.
    #[error("insufficient shares: requested {requested}, held {held}")]
    InsufficientShares { requested: Decimal, held: Decimal },

    /// Claim with a zero balance in the winning outcome.
    #[error("caller holds no winning shares")]
    NoWinningShares,

    /// Non-positive trade amount, or collateral too small for one whole share.
    #[error("invalid trade amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// Fewer than two outcomes supplied at market creation.
    #[error("market requires at least 2 outcomes, got {got}")]
    TooFewOutcomes { got: usize },

    /// Outbound collateral payment was rejected by the recipient.
    #[error(transparent)]
    TransferFailed(#[from] TransferError),

    /// Fail-closed pricing arithmetic.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Errors from the LMSR fixed-point arithmetic.
///
/// Every `exp`/`ln`/`mul`/`div` in the pricer goes through checked
/// `rust_decimal` operations; a failed step rejects the trade rather than
/// saturating silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A checked decimal operation overflowed or left its domain.
    #[error("pricing arithmetic overflow")]
    Overflow,

    /// Liquidity parameter `b` must be strictly positive.
    #[error("liquidity parameter must be positive, got {b}")]
    NonPositiveLiquidity { b: Decimal },
}

/// An outbound collateral payment rejected by its recipient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("collateral transfer of {amount} to {account} rejected: {reason}")]
pub struct TransferError {
    /// Intended recipient.
    pub account: AccountId,
    /// Amount that failed to transfer.
    pub amount: Decimal,
    /// Recipient-supplied rejection reason.
    pub reason: String,
}
