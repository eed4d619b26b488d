//! Predex Market Registry
//!
//! Factory and registry for [`predex_market::Market`] instances. Markets
//! live in an arena owned by the registry and are addressed by
//! [`MarketId`] index; creation is restricted to accounts holding the
//! builder capability, granted by the registry admin.
//!
//! The registry is the management layer around the engine: it validates
//! creation parameters, records per-market metadata for indexing, and hands
//! out `&Market`/`&mut Market` for the engine's own trading surface.

use chrono::{DateTime, Utc};
use fnv::FnvHashSet;
use predex_market::{AccountId, Market, MarketConfig, MarketError, MarketState};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::info;

/// Index of a market in the registry arena.
#[derive(
    Copy,
    Clone,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Deserialize,
    Serialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Constructor,
)]
#[display("market-{_0}")]
pub struct MarketId(pub u64);

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller lacks the capability the operation requires.
    #[error("caller {caller} is not authorized")]
    Unauthorized { caller: AccountId },

    /// No market at the given id.
    #[error("{0} not found")]
    MarketNotFound(MarketId),

    /// Expiry must be strictly in the future at creation time.
    #[error("expiry {expiry} is not in the future")]
    InvalidExpiry { expiry: DateTime<Utc> },

    /// Engine-side failure during creation.
    #[error(transparent)]
    Market(#[from] MarketError),
}

/// Static metadata recorded at market creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketMetadata {
    pub question: String,
    pub category: SmolStr,
    pub outcome_labels: Vec<SmolStr>,
    pub expiry: DateTime<Utc>,
    pub oracle: AccountId,
    /// The builder that created the market.
    pub creator: AccountId,
    pub created_at: DateTime<Utc>,
}

struct MarketEntry {
    metadata: MarketMetadata,
    market: Market,
}

/// Registry owning every market and the builder capability set.
pub struct MarketRegistry {
    admin: AccountId,
    builders: FnvHashSet<AccountId>,
    markets: Vec<MarketEntry>,
    config: MarketConfig,
}

impl MarketRegistry {
    /// Create a registry. The admin is implicitly a builder.
    pub fn new(admin: AccountId, config: MarketConfig) -> Self {
        let mut builders = FnvHashSet::default();
        builders.insert(admin.clone());
        Self {
            admin,
            builders,
            markets: Vec::new(),
            config,
        }
    }

    /// The registry administrator.
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    /// Grant the builder capability. Admin only.
    pub fn add_builder(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<(), RegistryError> {
        if caller != &self.admin {
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
            });
        }
        info!(builder = %account, "builder capability granted");
        self.builders.insert(account);
        Ok(())
    }

    /// Whether `account` may create markets.
    pub fn is_builder(&self, account: &AccountId) -> bool {
        self.builders.contains(account)
    }

    /// Create a new market. Builder capability required; the creator funds
    /// the maker subsidy seeded into the market's collateral pool.
    #[allow(clippy::too_many_arguments)]
    pub fn create_market(
        &mut self,
        caller: &AccountId,
        question: impl Into<String>,
        category: impl Into<SmolStr>,
        outcome_labels: Vec<SmolStr>,
        expiry: DateTime<Utc>,
        oracle: AccountId,
        now: DateTime<Utc>,
    ) -> Result<MarketId, RegistryError> {
        if !self.is_builder(caller) {
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
            });
        }
        if expiry <= now {
            return Err(RegistryError::InvalidExpiry { expiry });
        }

        let question = question.into();
        let category = category.into();
        let market = Market::open(
            question.clone(),
            category.clone(),
            outcome_labels.clone(),
            expiry,
            oracle.clone(),
            &self.config,
        )?;

        let id = MarketId(self.markets.len() as u64);
        self.markets.push(MarketEntry {
            metadata: MarketMetadata {
                question,
                category,
                outcome_labels,
                expiry,
                oracle,
                creator: caller.clone(),
                created_at: now,
            },
            market,
        });
        info!(%id, creator = %caller, "market created");
        Ok(id)
    }

    /// Number of markets ever created.
    pub fn total_markets(&self) -> usize {
        self.markets.len()
    }

    fn entry(&self, id: MarketId) -> Result<&MarketEntry, RegistryError> {
        self.markets
            .get(id.0 as usize)
            .ok_or(RegistryError::MarketNotFound(id))
    }

    /// Read access to a market's engine surface.
    pub fn market(&self, id: MarketId) -> Result<&Market, RegistryError> {
        Ok(&self.entry(id)?.market)
    }

    /// Write access to a market's engine surface (buy/sell/lifecycle).
    pub fn market_mut(&mut self, id: MarketId) -> Result<&mut Market, RegistryError> {
        self.markets
            .get_mut(id.0 as usize)
            .map(|entry| &mut entry.market)
            .ok_or(RegistryError::MarketNotFound(id))
    }

    /// Creation metadata for a market.
    pub fn market_metadata(&self, id: MarketId) -> Result<&MarketMetadata, RegistryError> {
        Ok(&self.entry(id)?.metadata)
    }

    /// Whether a market is still open for trading.
    pub fn is_active(&self, id: MarketId) -> Result<bool, RegistryError> {
        Ok(self.entry(id)?.market.state() == MarketState::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn genesis() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn registry() -> MarketRegistry {
        MarketRegistry::new(AccountId::from("admin"), MarketConfig::default())
    }

    fn create(registry: &mut MarketRegistry, caller: &AccountId) -> Result<MarketId, RegistryError> {
        registry.create_market(
            caller,
            "Will Bitcoin reach $100k?",
            "crypto",
            vec![SmolStr::new("Yes"), SmolStr::new("No")],
            genesis() + Duration::days(30),
            AccountId::from("oracle"),
            genesis(),
        )
    }

    #[test]
    fn test_admin_creates_market_with_metadata() {
        let mut registry = registry();
        let admin = AccountId::from("admin");

        let id = create(&mut registry, &admin).unwrap();
        assert_eq!(registry.total_markets(), 1);
        assert!(registry.is_active(id).unwrap());

        let metadata = registry.market_metadata(id).unwrap();
        assert_eq!(metadata.question, "Will Bitcoin reach $100k?");
        assert_eq!(metadata.category, "crypto");
        assert_eq!(metadata.creator, admin);
        assert_eq!(metadata.outcome_labels.len(), 2);
    }

    #[test]
    fn test_only_builders_create_markets() {
        let mut registry = registry();
        let stranger = AccountId::from("stranger");

        assert!(matches!(
            create(&mut registry, &stranger).unwrap_err(),
            RegistryError::Unauthorized { .. }
        ));
        assert_eq!(registry.total_markets(), 0);

        // Granting the capability fixes it
        registry
            .add_builder(&AccountId::from("admin"), stranger.clone())
            .unwrap();
        assert!(registry.is_builder(&stranger));
        create(&mut registry, &stranger).unwrap();
        assert_eq!(registry.total_markets(), 1);
    }

    #[test]
    fn test_only_admin_grants_builder() {
        let mut registry = registry();
        let stranger = AccountId::from("stranger");

        let err = registry
            .add_builder(&stranger, AccountId::from("friend"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert!(!registry.is_builder(&AccountId::from("friend")));
    }

    #[test]
    fn test_expiry_must_be_in_future() {
        let mut registry = registry();
        let err = registry
            .create_market(
                &AccountId::from("admin"),
                "Already over?",
                "sports",
                vec![SmolStr::new("Yes"), SmolStr::new("No")],
                genesis() - Duration::days(1),
                AccountId::from("oracle"),
                genesis(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidExpiry { .. }));
    }

    #[test]
    fn test_unknown_market_id() {
        let registry = registry();
        assert_eq!(
            registry.market(MarketId(3)).unwrap_err(),
            RegistryError::MarketNotFound(MarketId(3))
        );
    }

    #[test]
    fn test_trading_through_registry_handle() {
        let mut registry = registry();
        let admin = AccountId::from("admin");
        let trader = AccountId::from("trader1");

        let id = create(&mut registry, &admin).unwrap();
        let market = registry.market_mut(id).unwrap();
        let record = market.buy(&trader, 0, dec!(5), None, genesis()).unwrap();
        assert!(record.share_delta > dec!(0));

        // The engine's read surface is reachable through the shared handle
        let market = registry.market(id).unwrap();
        assert!(market.outcome_price(0).unwrap() > dec!(0.5));
        assert_eq!(market.trade_history().len(), 1);
    }
}
