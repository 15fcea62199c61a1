use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::AccountId;

/// Participants of a transaction, carried in its kind. Deposits and
/// withdrawals reference the owning account; transfers reference both
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit { account: AccountId },
    Withdraw { account: AccountId },
    Transfer { from: AccountId, to: AccountId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
}

/// Immutable, append-only record of one balance-affecting operation. Flag
/// fields are set before the record is first persisted, never patched after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub flagged: bool,
    pub flag_reason: Option<String>,
}

impl Transaction {
    /// Construct a fresh `PENDING`, unflagged record with a generated id and
    /// the current instant as its timestamp.
    pub fn pending(kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
            flagged: false,
            flag_reason: None,
        }
    }

    /// The source account of a transfer, if this is one.
    pub fn transfer_source(&self) -> Option<&AccountId> {
        match &self.kind {
            TransactionKind::Transfer { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Whether the account participates in this transaction, either as the
    /// sole owner (deposit/withdraw) or as either transfer endpoint.
    pub fn involves(&self, account: &AccountId) -> bool {
        match &self.kind {
            TransactionKind::Deposit { account: owner }
            | TransactionKind::Withdraw { account: owner } => owner == account,
            TransactionKind::Transfer { from, to } => from == account || to == account,
        }
    }
}

impl core::fmt::Display for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.kind {
            TransactionKind::Deposit { account } => {
                write!(f, "{} DEPOSIT account={} amount={}", self.id, account, self.amount)?
            }
            TransactionKind::Withdraw { account } => {
                write!(f, "{} WITHDRAW account={} amount={}", self.id, account, self.amount)?
            }
            TransactionKind::Transfer { from, to } => write!(
                f,
                "{} TRANSFER from={} to={} amount={}",
                self.id, from, to, self.amount
            )?,
        }
        write!(f, " at={} status={:?}", self.timestamp.to_rfc3339(), self.status)?;
        if self.flagged {
            write!(f, " flagged={}", self.flag_reason.as_deref().unwrap_or("?"))?;
        }
        Ok(())
    }
}

/// Result of screening one candidate transaction against history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudOutcome {
    Clear,
    Flagged { reason: String },
}

impl FraudOutcome {
    pub fn is_flagged(&self) -> bool {
        matches!(self, FraudOutcome::Flagged { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FraudOutcome::Clear => None,
            FraudOutcome::Flagged { reason } => Some(reason),
        }
    }
}

impl core::fmt::Display for FraudOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FraudOutcome::Clear => write!(f, "No fraud detected"),
            FraudOutcome::Flagged { reason } => write!(f, "{}", reason),
        }
    }
}
