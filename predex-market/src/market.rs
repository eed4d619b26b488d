//! The per-market trading and settlement engine.
//!
//! A [`Market`] owns its outcome ledger, its LMSR pricer, and the collateral
//! pool backing every outstanding share. Its lifecycle is a strict one-way
//! state machine:
//!
//! ```text
//! Open --(trigger_expiry, now >= expiry)--> Closed --(oracle resolve)--> Resolved
//! ```
//!
//! Trading is only possible while `Open` and before expiry. After
//! resolution, winning shares redeem 1:1 for collateral via
//! [`claim_payout`](Market::claim_payout).
//!
//! Every operation runs to completion against `&mut self` and either fully
//! applies or fully rejects; outbound payments happen strictly after the
//! ledger and pool have been debited, and a rejected payment rolls the debit
//! back.

use crate::{
    account::AccountId,
    collateral::CollateralSink,
    config::MarketConfig,
    error::MarketError,
    event::{PayoutClaimed, Side, TradeExecuted},
    ledger::OutcomeLedger,
    pricing::LmsrPricer,
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::{Display, Formatter};
use tracing::{info, warn};

/// Market lifecycle state. Transitions are monotonic; no state is
/// re-enterable.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketState {
    /// Trading live (until expiry).
    Open,
    /// Expiry reached and triggered; awaiting oracle resolution.
    Closed,
    /// Oracle has reported the winning outcome; payouts claimable.
    Resolved,
}

impl Display for MarketState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketState::Open => write!(f, "open"),
            MarketState::Closed => write!(f, "closed"),
            MarketState::Resolved => write!(f, "resolved"),
        }
    }
}

/// Read-only market summary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketInfo {
    pub question: String,
    pub category: SmolStr,
    pub expiry: DateTime<Utc>,
    pub state: MarketState,
    pub num_outcomes: usize,
    pub winning_outcome: Option<usize>,
    pub collateral_balance: Decimal,
}

/// Read-only view of one outcome.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutcomeInfo {
    pub label: SmolStr,
    pub shares_outstanding: Decimal,
    pub price: Decimal,
}

/// A single prediction market.
#[derive(Debug, Clone)]
pub struct Market {
    question: String,
    category: SmolStr,
    expiry: DateTime<Utc>,
    oracle: AccountId,
    state: MarketState,
    winning_outcome: Option<usize>,
    /// Collateral held by the pool: creation subsidy plus every buy, minus
    /// every refund and payout. Always covers the worst-case winner
    /// liability.
    collateral_balance: Decimal,
    collateral_scale: u32,
    ledger: OutcomeLedger,
    pricer: LmsrPricer,
    trades: Vec<TradeExecuted>,
}

impl Market {
    /// Open a new market.
    ///
    /// Seeds the collateral pool with the maker subsidy `b * ln(n)`, funded
    /// by the creator; from then on `collateral_balance >= cost(q)` holds
    /// inductively, which bounds every possible winner liability.
    pub fn open(
        question: impl Into<String>,
        category: impl Into<SmolStr>,
        outcome_labels: Vec<SmolStr>,
        expiry: DateTime<Utc>,
        oracle: AccountId,
        config: &MarketConfig,
    ) -> Result<Self, MarketError> {
        if outcome_labels.len() < 2 {
            return Err(MarketError::TooFewOutcomes {
                got: outcome_labels.len(),
            });
        }
        let pricer = LmsrPricer::new(config.liquidity)?;
        let subsidy = pricer.subsidy(outcome_labels.len())?;

        Ok(Self {
            question: question.into(),
            category: category.into(),
            expiry,
            oracle,
            state: MarketState::Open,
            winning_outcome: None,
            collateral_balance: subsidy,
            collateral_scale: config.collateral_scale,
            ledger: OutcomeLedger::new(outcome_labels),
            pricer,
            trades: Vec::new(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MarketState {
        self.state
    }

    /// The market question.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Expiry time; trading stops at or after this instant.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// The sole identity permitted to resolve this market.
    pub fn oracle(&self) -> &AccountId {
        &self.oracle
    }

    /// Winning outcome id, set exactly once at resolution.
    pub fn winning_outcome(&self) -> Option<usize> {
        self.winning_outcome
    }

    /// Collateral currently held by the pool.
    pub fn collateral_balance(&self) -> Decimal {
        self.collateral_balance
    }

    /// Whether the pool covers the worst-case winner liability.
    pub fn is_solvent(&self) -> bool {
        let liability = match (self.state, self.winning_outcome) {
            (MarketState::Resolved, Some(winner)) => self
                .ledger
                .outcome(winner)
                .map(|pool| pool.shares_outstanding)
                .unwrap_or(Decimal::ZERO),
            _ => self.ledger.max_outstanding(),
        };
        self.collateral_balance >= liability
    }

    /// In-order log of every executed trade.
    pub fn trade_history(&self) -> &[TradeExecuted] {
        &self.trades
    }

    fn ensure_open(&self, now: DateTime<Utc>) -> Result<(), MarketError> {
        if self.state != MarketState::Open || now >= self.expiry {
            return Err(MarketError::MarketNotOpen);
        }
        Ok(())
    }

    fn round_out(&self, amount: Decimal) -> Decimal {
        // Amounts leaving the pool round toward zero: dust stays with the
        // pool, so cumulative outflow never exceeds cumulative inflow.
        amount.round_dp_with_strategy(self.collateral_scale, RoundingStrategy::ToZero)
    }

    /// Buy shares of `outcome_id` with `collateral_in`, amount-in
    /// denominated: the engine computes the maximum whole share quantity
    /// purchasable for the collateral and keeps the full amount in the pool.
    pub fn buy(
        &mut self,
        caller: &AccountId,
        outcome_id: usize,
        collateral_in: Decimal,
        referral: Option<SmolStr>,
        now: DateTime<Utc>,
    ) -> Result<TradeExecuted, MarketError> {
        self.ensure_open(now)?;
        self.ledger.check_outcome(outcome_id)?;
        if collateral_in <= Decimal::ZERO {
            return Err(MarketError::InvalidAmount {
                amount: collateral_in,
            });
        }

        let q = self.ledger.quantities();
        let shares = self
            .pricer
            .shares_for_collateral(&q, outcome_id, collateral_in)?
            .floor();
        if shares <= Decimal::ZERO {
            // Not enough collateral for a single whole share; reject rather
            // than consume the payment for nothing.
            return Err(MarketError::InvalidAmount {
                amount: collateral_in,
            });
        }

        // Quote the post-trade price before mutating so a pricing failure
        // cannot leave a partially-applied trade behind.
        let mut moved = q;
        moved[outcome_id] += shares;
        let resulting_price = self.pricer.price(&moved, outcome_id)?;

        self.ledger.credit(outcome_id, caller, shares)?;
        self.collateral_balance += collateral_in;

        let record = TradeExecuted {
            account: caller.clone(),
            outcome_id,
            side: Side::Buy,
            share_delta: shares,
            collateral_delta: collateral_in,
            resulting_price,
            referral,
            time: now,
        };
        info!(
            account = %record.account,
            outcome_id,
            shares = %shares,
            collateral_in = %collateral_in,
            price = %resulting_price,
            "buy executed"
        );
        self.trades.push(record.clone());
        Ok(record)
    }

    /// Sell `shares` of `outcome_id` back to the market maker. The refund is
    /// debited from the pool and paid out through `sink` after the ledger
    /// has been updated; a rejected payment rolls the trade back.
    pub fn sell<S: CollateralSink>(
        &mut self,
        caller: &AccountId,
        outcome_id: usize,
        shares: Decimal,
        referral: Option<SmolStr>,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<TradeExecuted, MarketError> {
        self.ensure_open(now)?;
        self.ledger.check_outcome(outcome_id)?;
        if shares <= Decimal::ZERO {
            return Err(MarketError::InvalidAmount { amount: shares });
        }
        let held = self.ledger.balance(caller, outcome_id);
        if shares > held {
            return Err(MarketError::InsufficientShares {
                requested: shares,
                held,
            });
        }

        let q = self.ledger.quantities();
        let refund = self.round_out(self.pricer.sell_refund(&q, outcome_id, shares)?);
        let mut moved = q;
        moved[outcome_id] -= shares;
        let resulting_price = self.pricer.price(&moved, outcome_id)?;

        // Effects before the outbound interaction
        self.ledger.debit(outcome_id, caller, shares)?;
        self.collateral_balance -= refund;

        if let Err(transfer) = sink.pay(caller, refund) {
            // Roll the debit back; the caller may retry the sell.
            self.ledger.credit(outcome_id, caller, shares)?;
            self.collateral_balance += refund;
            warn!(
                account = %caller,
                outcome_id,
                refund = %refund,
                reason = %transfer.reason,
                "sell refund rejected, trade rolled back"
            );
            return Err(MarketError::TransferFailed(transfer));
        }

        let record = TradeExecuted {
            account: caller.clone(),
            outcome_id,
            side: Side::Sell,
            share_delta: shares,
            collateral_delta: refund,
            resulting_price,
            referral,
            time: now,
        };
        info!(
            account = %record.account,
            outcome_id,
            shares = %shares,
            refund = %refund,
            price = %resulting_price,
            "sell executed"
        );
        self.trades.push(record.clone());
        Ok(record)
    }

    /// Flip `Open -> Closed` once the expiry time has passed. Callable by
    /// anyone; idempotent once closed or resolved.
    pub fn trigger_expiry(&mut self, now: DateTime<Utc>) -> Result<MarketState, MarketError> {
        match self.state {
            MarketState::Open if now >= self.expiry => {
                self.state = MarketState::Closed;
                info!(expiry = %self.expiry, "market closed");
                Ok(MarketState::Closed)
            }
            MarketState::Open => Err(MarketError::NotExpired),
            state => Ok(state),
        }
    }

    /// Report the winning outcome. Oracle-only; requires the market to be
    /// closed, and succeeds exactly once.
    pub fn resolve(
        &mut self,
        caller: &AccountId,
        winning_outcome_id: usize,
    ) -> Result<(), MarketError> {
        if caller != &self.oracle {
            return Err(MarketError::Unauthorized {
                caller: caller.clone(),
            });
        }
        match self.state {
            MarketState::Resolved => Err(MarketError::AlreadyResolved),
            MarketState::Open => Err(MarketError::NotClosed),
            MarketState::Closed => {
                self.ledger.check_outcome(winning_outcome_id)?;
                self.winning_outcome = Some(winning_outcome_id);
                self.state = MarketState::Resolved;
                info!(winning_outcome_id, "market resolved");
                Ok(())
            }
        }
    }

    /// Redeem the caller's winning shares at 1:1, burning the balance before
    /// paying out through `sink`. Single-shot per account: a second call
    /// fails with `NoWinningShares` because the balance is already zero.
    pub fn claim_payout<S: CollateralSink>(
        &mut self,
        caller: &AccountId,
        now: DateTime<Utc>,
        sink: &mut S,
    ) -> Result<PayoutClaimed, MarketError> {
        if self.state != MarketState::Resolved {
            return Err(MarketError::NotResolved);
        }
        let winner = self.winning_outcome.ok_or(MarketError::NotResolved)?;
        let held = self.ledger.balance(caller, winner);
        if held <= Decimal::ZERO {
            return Err(MarketError::NoWinningShares);
        }
        let payout = self.round_out(held);

        // Burn before paying out
        self.ledger.debit(winner, caller, held)?;
        self.collateral_balance -= payout;

        if let Err(transfer) = sink.pay(caller, payout) {
            self.ledger.credit(winner, caller, held)?;
            self.collateral_balance += payout;
            warn!(
                account = %caller,
                payout = %payout,
                reason = %transfer.reason,
                "payout rejected, claim rolled back"
            );
            return Err(MarketError::TransferFailed(transfer));
        }

        info!(account = %caller, shares = %held, payout = %payout, "payout claimed");
        Ok(PayoutClaimed {
            account: caller.clone(),
            shares_redeemed: held,
            amount: payout,
            time: now,
        })
    }

    /// Instantaneous price of `outcome_id`.
    pub fn outcome_price(&self, outcome_id: usize) -> Result<Decimal, MarketError> {
        self.ledger.check_outcome(outcome_id)?;
        Ok(self.pricer.price(&self.ledger.quantities(), outcome_id)?)
    }

    /// Instantaneous prices of every outcome, in creation order.
    pub fn prices(&self) -> Result<Vec<Decimal>, MarketError> {
        Ok(self.pricer.prices(&self.ledger.quantities())?)
    }

    /// `account`'s share balance in `outcome_id`.
    pub fn user_position(
        &self,
        account: &AccountId,
        outcome_id: usize,
    ) -> Result<Decimal, MarketError> {
        self.ledger.check_outcome(outcome_id)?;
        Ok(self.ledger.balance(account, outcome_id))
    }

    /// Summary view of the market.
    pub fn market_info(&self) -> MarketInfo {
        MarketInfo {
            question: self.question.clone(),
            category: self.category.clone(),
            expiry: self.expiry,
            state: self.state,
            num_outcomes: self.ledger.num_outcomes(),
            winning_outcome: self.winning_outcome,
            collateral_balance: self.collateral_balance,
        }
    }

    /// Label, outstanding supply, and price of one outcome.
    pub fn outcome(&self, outcome_id: usize) -> Result<OutcomeInfo, MarketError> {
        let pool = self.ledger.outcome(outcome_id)?;
        Ok(OutcomeInfo {
            label: pool.label.clone(),
            shares_outstanding: pool.shares_outstanding,
            price: self.outcome_price(outcome_id)?,
        })
    }
}
