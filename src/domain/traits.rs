use async_trait::async_trait;

use crate::domain::{Account, Error, Transaction, Wallet};

/// Durable key-to-collection storage: whole-collection read and
/// whole-collection atomic replace, per collection. Reading a collection
/// that has never been written yields an empty vector, not an error. Each
/// write is the unit of durability; partial writes are never observable.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read_accounts(&self) -> Result<Vec<Account>, Error>;
    async fn write_accounts(&self, records: &[Account]) -> Result<(), Error>;

    async fn read_wallets(&self) -> Result<Vec<Wallet>, Error>;
    async fn write_wallets(&self, records: &[Wallet]) -> Result<(), Error>;

    async fn read_transactions(&self) -> Result<Vec<Transaction>, Error>;
    async fn write_transactions(&self, records: &[Transaction]) -> Result<(), Error>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    async fn read_accounts(&self) -> Result<Vec<Account>, Error> {
        (**self).read_accounts().await
    }

    async fn write_accounts(&self, records: &[Account]) -> Result<(), Error> {
        (**self).write_accounts(records).await
    }

    async fn read_wallets(&self) -> Result<Vec<Wallet>, Error> {
        (**self).read_wallets().await
    }

    async fn write_wallets(&self, records: &[Wallet]) -> Result<(), Error> {
        (**self).write_wallets(records).await
    }

    async fn read_transactions(&self) -> Result<Vec<Transaction>, Error> {
        (**self).read_transactions().await
    }

    async fn write_transactions(&self, records: &[Transaction]) -> Result<(), Error> {
        (**self).write_transactions(records).await
    }
}

/// One independent fraud predicate over a candidate transaction and the full
/// transaction history. Rules never mutate anything and never fail; a rule
/// that fires returns its human-readable, stable reason string.
pub trait FraudRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, candidate: &Transaction, history: &[Transaction]) -> Option<String>;
}
