//! Single-currency wallet ledger: wallet balances, deposits, withdrawals and
//! transfers, with every mutating operation screened against fraud rules
//! before its balance and log changes are committed together.

pub mod config;
pub mod domain;
pub mod engine;
pub mod fraud;
pub mod locks;
pub mod store;

pub use config::LedgerConfig;
pub use domain::{
    Account, AccountId, Error, FraudOutcome, FraudRule, RecordStore, Transaction,
    TransactionKind, TransactionStatus, Wallet,
};
pub use engine::{LedgerEngine, Receipt};
pub use fraud::FraudRuleEngine;
pub use store::{JsonFileStore, MemoryStore};
