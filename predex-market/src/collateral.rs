//! Outbound collateral payments.
//!
//! The engine never pushes funds directly: sells and claims hand the amount
//! owed to a [`CollateralSink`], after the ledger has already been debited.
//! A sink may reject the payment (the equivalent of a reverting recipient);
//! the engine rolls its own mutation back and surfaces
//! [`TransferError`](crate::error::TransferError) so the caller can retry.

use crate::{account::AccountId, error::TransferError};
use fnv::FnvHashMap;
use rust_decimal::Decimal;

/// Destination for collateral leaving the market pool.
pub trait CollateralSink {
    /// Pay `amount` collateral units to `to`.
    ///
    /// Implementations must either accept the full amount or reject it
    /// outright; partial delivery is not a representable outcome.
    fn pay(&mut self, to: &AccountId, amount: Decimal) -> Result<(), TransferError>;
}

/// In-memory treasury crediting payouts to per-account cash balances.
///
/// The reference sink for tests and single-process deployments.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTreasury {
    balances: FnvHashMap<AccountId, Decimal>,
}

impl InMemoryTreasury {
    /// Create an empty treasury.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cash balance accumulated by `account`.
    pub fn balance(&self, account: &AccountId) -> Decimal {
        self.balances
            .get(account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl CollateralSink for InMemoryTreasury {
    fn pay(&mut self, to: &AccountId, amount: Decimal) -> Result<(), TransferError> {
        *self.balances.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}
