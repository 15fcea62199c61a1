use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::domain::{
    Account, AccountId, Error, FraudOutcome, FraudRule, RecordStore, Transaction,
    TransactionKind, TransactionStatus, Wallet, money,
};
use crate::fraud::FraudRuleEngine;
use crate::locks::AccountLocks;

/// What a mutating operation hands back to the caller: the transaction it
/// appended, the post-operation balance of the caller's wallet, and the
/// fraud screening outcome. `held` is set when `block_on_flag` kept a
/// flagged transaction PENDING instead of completing it.
#[derive(Debug)]
pub struct Receipt {
    pub transaction_id: Uuid,
    pub new_balance: Decimal,
    pub fraud: FraudOutcome,
    pub held: bool,
}

/// The transactional ledger engine. Owns the store, the fraud rule set, and
/// the per-account locks; every mutation runs its whole
/// read -> validate -> evaluate -> mutate -> persist cycle under the lock(s)
/// of the wallet(s) it touches.
pub struct LedgerEngine<S>
where
    S: RecordStore,
{
    store: S,
    rules: FraudRuleEngine,
    locks: AccountLocks,
    config: LedgerConfig,
}

impl<S> LedgerEngine<S>
where
    S: RecordStore,
{
    pub fn new(store: S, config: LedgerConfig) -> Self {
        let rules = FraudRuleEngine::with_defaults(&config);
        Self {
            store,
            rules,
            locks: AccountLocks::new(),
            config,
        }
    }

    /// Append a fraud rule after the default set. Existing rules keep their
    /// evaluation order.
    pub fn with_rule(mut self, rule: Box<dyn FraudRule>) -> Self {
        self.rules.push_rule(rule);
        self
    }

    /// Credit a wallet. Deposits are never fraud-screened; the record is
    /// appended COMPLETED in the same commit that persists the new balance.
    pub async fn deposit(&self, account: &AccountId, amount: Decimal) -> Result<Decimal, Error> {
        let amount = money::checked_amount(amount)?;
        let _guard = self.locks.lock(account).await;

        let mut wallets = self.store.read_wallets().await?;
        let index = wallet_index(&wallets, account).ok_or_else(|| {
            warn!(account = %account, "wallet missing for account");
            Error::WalletNotFound(account.clone())
        })?;
        wallets[index].balance += amount;
        let new_balance = wallets[index].balance;

        let mut tx = Transaction::pending(
            TransactionKind::Deposit {
                account: account.clone(),
            },
            amount,
        );
        tx.status = TransactionStatus::Completed;

        let mut log = self.store.read_transactions().await?;
        log.push(tx.clone());
        self.commit(Some(&wallets), &log).await?;

        info!(tx = %tx.id, account = %account, %amount, "deposit committed");
        Ok(new_balance)
    }

    /// Debit a wallet. The candidate is screened against the full history
    /// before anything is persisted; a flagged withdrawal still completes
    /// and debits unless `block_on_flag` holds it.
    pub async fn withdraw(&self, account: &AccountId, amount: Decimal) -> Result<Receipt, Error> {
        let amount = money::checked_amount(amount)?;
        let _guard = self.locks.lock(account).await;

        let mut wallets = self.store.read_wallets().await?;
        let index = wallet_index(&wallets, account).ok_or_else(|| {
            warn!(account = %account, "wallet missing for account");
            Error::WalletNotFound(account.clone())
        })?;
        if wallets[index].balance < amount {
            return Err(Error::InsufficientFunds(account.clone()));
        }

        let mut tx = Transaction::pending(
            TransactionKind::Withdraw {
                account: account.clone(),
            },
            amount,
        );
        let mut log = self.store.read_transactions().await?;
        let fraud = self.screen(&mut tx, &log);

        if tx.flagged && self.config.block_on_flag {
            log.push(tx.clone());
            self.commit(None, &log).await?;
            return Ok(Receipt {
                transaction_id: tx.id,
                new_balance: wallets[index].balance,
                fraud,
                held: true,
            });
        }

        wallets[index].balance -= amount;
        let new_balance = wallets[index].balance;
        tx.status = TransactionStatus::Completed;
        log.push(tx.clone());
        self.commit(Some(&wallets), &log).await?;

        info!(tx = %tx.id, account = %account, %amount, "withdrawal committed");
        Ok(Receipt {
            transaction_id: tx.id,
            new_balance,
            fraud,
            held: false,
        })
    }

    /// Move funds between two distinct wallets. Both account locks are held
    /// in identifier order for the whole cycle, and both wallets land in a
    /// single wallets write so a commit failure can never leave the source
    /// debited without the destination credited in durable storage.
    pub async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<Receipt, Error> {
        let amount = money::checked_amount(amount)?;
        if from == to {
            return Err(Error::SelfTransfer);
        }
        let _guards = self.locks.lock_pair(from, to).await;

        let accounts = self.store.read_accounts().await?;
        if !accounts.iter().any(|a| &a.id == to) {
            return Err(Error::RecipientNotFound(to.clone()));
        }

        let mut wallets = self.store.read_wallets().await?;
        let to_index = wallet_index(&wallets, to).ok_or_else(|| {
            warn!(account = %to, "wallet missing for account");
            Error::RecipientWalletNotFound(to.clone())
        })?;
        let from_index = wallet_index(&wallets, from).ok_or_else(|| {
            warn!(account = %from, "wallet missing for account");
            Error::SenderWalletNotFound(from.clone())
        })?;

        let source_balance = wallets[from_index].balance;
        if source_balance < amount {
            return Err(Error::InsufficientFunds(from.clone()));
        }
        // Hard business rule, independent of fraud screening: at most 90%
        // of the pre-debit balance may move in one transfer.
        if amount > source_balance * Decimal::new(9, 1) {
            return Err(Error::ExceedsTransferLimit);
        }

        let mut tx = Transaction::pending(
            TransactionKind::Transfer {
                from: from.clone(),
                to: to.clone(),
            },
            amount,
        );
        let mut log = self.store.read_transactions().await?;
        let fraud = self.screen(&mut tx, &log);

        if tx.flagged && self.config.block_on_flag {
            log.push(tx.clone());
            self.commit(None, &log).await?;
            return Ok(Receipt {
                transaction_id: tx.id,
                new_balance: source_balance,
                fraud,
                held: true,
            });
        }

        wallets[from_index].balance -= amount;
        wallets[to_index].balance += amount;
        let new_balance = wallets[from_index].balance;
        tx.status = TransactionStatus::Completed;
        log.push(tx.clone());
        self.commit(Some(&wallets), &log).await?;

        info!(tx = %tx.id, from = %from, to = %to, %amount, "transfer committed");
        Ok(Receipt {
            transaction_id: tx.id,
            new_balance,
            fraud,
            held: false,
        })
    }

    /// Read-only balance snapshot. No lock: an eventually-consistent view
    /// is fine for display.
    pub async fn balance(&self, account: &AccountId) -> Result<(Decimal, String), Error> {
        let wallets = self.store.read_wallets().await?;
        let wallet = wallets
            .into_iter()
            .find(|w| &w.account_id == account)
            .ok_or_else(|| Error::WalletNotFound(account.clone()))?;
        Ok((wallet.balance, wallet.currency))
    }

    /// Every transaction the account participates in, newest first.
    pub async fn history(&self, account: &AccountId) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.store.read_transactions().await?;
        transactions.retain(|t| t.involves(account));
        // Stable sort keeps append order for equal timestamps, so repeated
        // reads return identical sequences.
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(transactions)
    }

    /// Every flagged transaction, in log order. Administrative review feed.
    pub async fn flagged(&self) -> Result<Vec<Transaction>, Error> {
        let mut transactions = self.store.read_transactions().await?;
        transactions.retain(|t| t.flagged);
        Ok(transactions)
    }

    /// Read-only id+name listing, for display and name resolution.
    pub async fn accounts(&self) -> Result<Vec<Account>, Error> {
        self.store.read_accounts().await
    }

    fn screen(&self, tx: &mut Transaction, history: &[Transaction]) -> FraudOutcome {
        let fraud = self.rules.evaluate(tx, history);
        if let FraudOutcome::Flagged { reason } = &fraud {
            tx.flagged = true;
            tx.flag_reason = Some(reason.clone());
            warn!(tx = %tx.id, amount = %tx.amount, reason = %reason, "fraud detected");
        }
        fraud
    }

    /// Commit phase. Balances were already computed; any durable-write
    /// failure from here on is surfaced as CommitFailure, never as success.
    async fn commit(
        &self,
        wallets: Option<&[Wallet]>,
        transactions: &[Transaction],
    ) -> Result<(), Error> {
        if let Some(wallets) = wallets {
            self.store
                .write_wallets(wallets)
                .await
                .map_err(|e| Error::CommitFailure(e.to_string()))?;
        }
        self.store
            .write_transactions(transactions)
            .await
            .map_err(|e| Error::CommitFailure(e.to_string()))?;
        Ok(())
    }
}

fn wallet_index(wallets: &[Wallet], account: &AccountId) -> Option<usize> {
    wallets.iter().position(|w| &w.account_id == account)
}
