pub mod account;
pub mod error;
pub mod money;
pub mod traits;
pub mod transaction;

pub use account::{Account, AccountId, Wallet, DEFAULT_CURRENCY};
pub use error::Error;
pub use traits::{FraudRule, RecordStore};
pub use transaction::{FraudOutcome, Transaction, TransactionKind, TransactionStatus};
