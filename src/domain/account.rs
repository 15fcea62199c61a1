use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Single-currency deployment; every wallet is created with this code.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Opaque account identifier, unique across the accounts collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Account record as the auth subsystem persists it. The ledger only reads
/// id + name, for existence checks and name resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
}

/// Per-account balance record. Exactly one wallet exists per account;
/// `balance >= 0` at all times and only the ledger engine mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub currency: String,
}

impl Wallet {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            balance: Decimal::ZERO,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}
