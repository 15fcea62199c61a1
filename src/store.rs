use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{Account, Error, RecordStore, Transaction, Wallet};

const ACCOUNTS: &str = "accounts";
const WALLETS: &str = "wallets";
const TRANSACTIONS: &str = "transactions";

/// Record store backed by one JSON array file per collection in a data
/// directory. A collection that has never been written reads as empty.
/// Writes replace the whole collection atomically: the new content goes to a
/// temp file which is then renamed over the collection file.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    async fn read_collection<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, Error> {
        let path = self.collection_path(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        // Rows are decoded one by one: a malformed row is a data-quality
        // signal, not a reason to fail the whole read. Fraud evaluation
        // never sees skipped rows, so it cannot trip over them.
        let rows: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(collection = name, index, error = %e, "skipping malformed row");
                }
            }
        }
        Ok(records)
    }

    async fn write_collection<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(records)?;
        let path = self.collection_path(name);
        let tmp = self.dir.join(format!("{name}.json.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn read_accounts(&self) -> Result<Vec<Account>, Error> {
        self.read_collection(ACCOUNTS).await
    }

    async fn write_accounts(&self, records: &[Account]) -> Result<(), Error> {
        self.write_collection(ACCOUNTS, records).await
    }

    async fn read_wallets(&self) -> Result<Vec<Wallet>, Error> {
        self.read_collection(WALLETS).await
    }

    async fn write_wallets(&self, records: &[Wallet]) -> Result<(), Error> {
        self.write_collection(WALLETS, records).await
    }

    async fn read_transactions(&self) -> Result<Vec<Transaction>, Error> {
        self.read_collection(TRANSACTIONS).await
    }

    async fn write_transactions(&self, records: &[Transaction]) -> Result<(), Error> {
        self.write_collection(TRANSACTIONS, records).await
    }
}

/// In-memory store used by engine tests. `fail_writes` simulates a durable
/// store that goes away mid-commit.
#[derive(Default)]
pub struct MemoryStore {
    accounts: parking_lot::Mutex<Vec<Account>>,
    wallets: parking_lot::Mutex<Vec<Wallet>>,
    transactions: parking_lot::Mutex<Vec<Transaction>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("store unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_accounts(&self) -> Result<Vec<Account>, Error> {
        Ok(self.accounts.lock().clone())
    }

    async fn write_accounts(&self, records: &[Account]) -> Result<(), Error> {
        self.check_writable()?;
        *self.accounts.lock() = records.to_vec();
        Ok(())
    }

    async fn read_wallets(&self) -> Result<Vec<Wallet>, Error> {
        Ok(self.wallets.lock().clone())
    }

    async fn write_wallets(&self, records: &[Wallet]) -> Result<(), Error> {
        self.check_writable()?;
        *self.wallets.lock() = records.to_vec();
        Ok(())
    }

    async fn read_transactions(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.transactions.lock().clone())
    }

    async fn write_transactions(&self, records: &[Transaction]) -> Result<(), Error> {
        self.check_writable()?;
        *self.transactions.lock() = records.to_vec();
        Ok(())
    }
}
