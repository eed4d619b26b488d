//! Outcome share accounting.
//!
//! Authoritative mapping from `(outcome, account)` to share balances, plus
//! the per-outcome outstanding supply vector the pricer consumes. The
//! outcome set is fixed at creation; account balance rows are created lazily
//! on first credit and zeroed (never removed) on full debit.

use crate::{account::AccountId, error::MarketError};
use fnv::FnvHashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One outcome's pool: label and outstanding supply (the `q_i` the pricer
/// sees).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutcomePool {
    /// Human-readable outcome label (e.g., "Yes").
    pub label: SmolStr,
    /// Total shares outstanding across all accounts.
    pub shares_outstanding: Decimal,
}

/// Per-market share ledger.
#[derive(Debug, Clone, Default)]
pub struct OutcomeLedger {
    outcomes: Vec<OutcomePool>,
    positions: FnvHashMap<AccountId, Vec<Decimal>>,
}

impl OutcomeLedger {
    /// Create a ledger with zero supply in every outcome.
    pub fn new(labels: impl IntoIterator<Item = SmolStr>) -> Self {
        Self {
            outcomes: labels
                .into_iter()
                .map(|label| OutcomePool {
                    label,
                    shares_outstanding: Decimal::ZERO,
                })
                .collect(),
            positions: FnvHashMap::default(),
        }
    }

    /// Number of outcomes in this market.
    pub fn num_outcomes(&self) -> usize {
        self.outcomes.len()
    }

    /// All outcome pools, in creation order.
    pub fn outcomes(&self) -> &[OutcomePool] {
        &self.outcomes
    }

    /// Validate an outcome id against `[0, num_outcomes)`.
    pub fn check_outcome(&self, outcome_id: usize) -> Result<(), MarketError> {
        if outcome_id >= self.outcomes.len() {
            return Err(MarketError::InvalidOutcome {
                outcome_id,
                num_outcomes: self.outcomes.len(),
            });
        }
        Ok(())
    }

    /// The pool for `outcome_id`.
    pub fn outcome(&self, outcome_id: usize) -> Result<&OutcomePool, MarketError> {
        self.check_outcome(outcome_id)?;
        Ok(&self.outcomes[outcome_id])
    }

    /// The outstanding supply vector `q`, in outcome order.
    pub fn quantities(&self) -> Vec<Decimal> {
        self.outcomes
            .iter()
            .map(|pool| pool.shares_outstanding)
            .collect()
    }

    /// Largest outstanding supply across outcomes: the worst-case winner
    /// liability before resolution.
    pub fn max_outstanding(&self) -> Decimal {
        self.outcomes
            .iter()
            .map(|pool| pool.shares_outstanding)
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    /// `account`'s share balance in `outcome_id` (zero for unknown accounts).
    pub fn balance(&self, account: &AccountId, outcome_id: usize) -> Decimal {
        self.positions
            .get(account)
            .and_then(|row| row.get(outcome_id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Credit `amount` shares of `outcome_id` to `account`, increasing both
    /// the position and the outstanding supply. Never fails for a valid
    /// outcome id.
    pub fn credit(
        &mut self,
        outcome_id: usize,
        account: &AccountId,
        amount: Decimal,
    ) -> Result<(), MarketError> {
        self.check_outcome(outcome_id)?;
        let num_outcomes = self.outcomes.len();
        let row = self
            .positions
            .entry(account.clone())
            .or_insert_with(|| vec![Decimal::ZERO; num_outcomes]);
        row[outcome_id] += amount;
        self.outcomes[outcome_id].shares_outstanding += amount;
        Ok(())
    }

    /// Debit `amount` shares of `outcome_id` from `account`, decreasing both
    /// the position and the outstanding supply.
    pub fn debit(
        &mut self,
        outcome_id: usize,
        account: &AccountId,
        amount: Decimal,
    ) -> Result<(), MarketError> {
        self.check_outcome(outcome_id)?;
        let held = self.balance(account, outcome_id);
        if amount > held {
            return Err(MarketError::InsufficientShares {
                requested: amount,
                held,
            });
        }
        // Row must exist: a zero balance on a missing row already failed above
        // unless amount is zero, in which case this is a no-op.
        if let Some(row) = self.positions.get_mut(account) {
            row[outcome_id] -= amount;
        }
        self.outcomes[outcome_id].shares_outstanding -= amount;
        Ok(())
    }
}
