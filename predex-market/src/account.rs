//! Caller identity.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identity of an account interacting with the engine.
///
/// Every mutating operation receives the caller's `AccountId` explicitly and
/// checks it against stored capabilities (oracle, builder); there is no
/// ambient authority.
#[derive(
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
)]
#[display("{_0}")]
pub struct AccountId(pub SmolStr);

impl AccountId {
    /// Create a new account id.
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(SmolStr::new(value))
    }
}
