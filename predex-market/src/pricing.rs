//! LMSR cost-function market maker.
//!
//! Prices are derived from a logarithmic scoring rule over the outstanding
//! share vector `q`:
//!
//! ```text
//! cost(q)    = b * ln(Σ_i exp(q_i / b))
//! price_i(q) = exp(q_i / b) / Σ_j exp(q_j / b)
//! ```
//!
//! A trade moving `q` to `q'` costs `cost(q') - cost(q)` collateral. The
//! cost function is strictly increasing and convex in each `q_i`, so buying
//! more always costs more per share and selling always returns less than the
//! last unit cost (no-arbitrage). The maker's maximum loss is bounded by the
//! creation subsidy `cost(0) = b * ln(n)`.
//!
//! All arithmetic is checked `rust_decimal` fixed-point (28-29 significant
//! digits); any step that overflows or leaves its domain rejects the trade
//! with [`PricingError::Overflow`] instead of saturating.

use crate::error::PricingError;
use rust_decimal::{Decimal, MathematicalOps};

/// LMSR pricer for a single market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmsrPricer {
    /// Liquidity parameter `b`, strictly positive.
    b: Decimal,
}

impl LmsrPricer {
    /// Create a pricer with liquidity parameter `b`.
    pub fn new(b: Decimal) -> Result<Self, PricingError> {
        if b <= Decimal::ZERO {
            return Err(PricingError::NonPositiveLiquidity { b });
        }
        Ok(Self { b })
    }

    /// The liquidity parameter `b`.
    pub fn liquidity(&self) -> Decimal {
        self.b
    }

    /// Per-outcome weights `exp(q_i / b)`.
    fn weights(&self, q: &[Decimal]) -> Result<Vec<Decimal>, PricingError> {
        q.iter()
            .map(|qi| {
                qi.checked_div(self.b)
                    .and_then(|x| x.checked_exp())
                    .ok_or(PricingError::Overflow)
            })
            .collect()
    }

    /// Sum of weights, `Σ_i exp(q_i / b)`.
    fn weight_sum(weights: &[Decimal]) -> Result<Decimal, PricingError> {
        weights
            .iter()
            .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))
            .ok_or(PricingError::Overflow)
    }

    /// Cost potential `cost(q) = b * ln(Σ_i exp(q_i / b))`.
    pub fn cost(&self, q: &[Decimal]) -> Result<Decimal, PricingError> {
        let weights = self.weights(q)?;
        let sum = Self::weight_sum(&weights)?;
        let ln = sum.checked_ln().ok_or(PricingError::Overflow)?;
        self.b.checked_mul(ln).ok_or(PricingError::Overflow)
    }

    /// Instantaneous price of every outcome. Each price is strictly inside
    /// `(0, 1)` and the vector sums to 1 within fixed-point tolerance.
    pub fn prices(&self, q: &[Decimal]) -> Result<Vec<Decimal>, PricingError> {
        let weights = self.weights(q)?;
        let sum = Self::weight_sum(&weights)?;
        weights
            .iter()
            .map(|w| w.checked_div(sum).ok_or(PricingError::Overflow))
            .collect()
    }

    /// Instantaneous price of outcome `k`. Caller guarantees `k` is in range.
    pub fn price(&self, q: &[Decimal], k: usize) -> Result<Decimal, PricingError> {
        let weights = self.weights(q)?;
        let sum = Self::weight_sum(&weights)?;
        weights[k].checked_div(sum).ok_or(PricingError::Overflow)
    }

    /// Collateral cost of buying `delta` shares of outcome `k`:
    /// `cost(q + delta*e_k) - cost(q)`.
    pub fn buy_cost(
        &self,
        q: &[Decimal],
        k: usize,
        delta: Decimal,
    ) -> Result<Decimal, PricingError> {
        let mut moved = q.to_vec();
        moved[k] = moved[k].checked_add(delta).ok_or(PricingError::Overflow)?;
        self.cost(&moved)?
            .checked_sub(self.cost(q)?)
            .ok_or(PricingError::Overflow)
    }

    /// Collateral refunded for selling `delta` shares of outcome `k`:
    /// `cost(q) - cost(q - delta*e_k)`. Caller guarantees `delta <= q_k`.
    pub fn sell_refund(
        &self,
        q: &[Decimal],
        k: usize,
        delta: Decimal,
    ) -> Result<Decimal, PricingError> {
        let mut moved = q.to_vec();
        moved[k] = moved[k].checked_sub(delta).ok_or(PricingError::Overflow)?;
        self.cost(q)?
            .checked_sub(self.cost(&moved)?)
            .ok_or(PricingError::Overflow)
    }

    /// Share quantity of outcome `k` purchasable for exactly `collateral`.
    ///
    /// Closed-form inverse of [`buy_cost`](Self::buy_cost) in `delta`, with
    /// `S = Σ_j exp(q_j / b)`:
    ///
    /// ```text
    /// delta = b * ln(exp(C / b) * S - S + exp(q_k / b)) - q_k
    /// ```
    ///
    /// The result is exact (un-floored); the trading engine rounds it down
    /// to whole shares.
    pub fn shares_for_collateral(
        &self,
        q: &[Decimal],
        k: usize,
        collateral: Decimal,
    ) -> Result<Decimal, PricingError> {
        let weights = self.weights(q)?;
        let sum = Self::weight_sum(&weights)?;
        let growth = collateral
            .checked_div(self.b)
            .and_then(|x| x.checked_exp())
            .ok_or(PricingError::Overflow)?;
        // exp(C/b) * S - S + exp(q_k/b); always >= exp(q_k/b) > 0 for C >= 0
        let arg = growth
            .checked_mul(sum)
            .and_then(|x| x.checked_sub(sum))
            .and_then(|x| x.checked_add(weights[k]))
            .ok_or(PricingError::Overflow)?;
        let ln = arg.checked_ln().ok_or(PricingError::Overflow)?;
        self.b
            .checked_mul(ln)
            .and_then(|x| x.checked_sub(q[k]))
            .ok_or(PricingError::Overflow)
    }

    /// Creation subsidy `cost(0) = b * ln(n)`: the collateral the maker must
    /// seed so the pool always covers the worst-case winner liability.
    pub fn subsidy(&self, num_outcomes: usize) -> Result<Decimal, PricingError> {
        let zeros = vec![Decimal::ZERO; num_outcomes];
        self.cost(&zeros)
    }
}
