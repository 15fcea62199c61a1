use crate::domain::AccountId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Wallet not found for account {0}")]
    WalletNotFound(AccountId),

    #[error("Insufficient funds in account {0}")]
    InsufficientFunds(AccountId),

    #[error("Recipient account {0} not found")]
    RecipientNotFound(AccountId),

    #[error("Sender wallet not found for account {0}")]
    SenderWalletNotFound(AccountId),

    #[error("Recipient wallet not found for account {0}")]
    RecipientWalletNotFound(AccountId),

    #[error("Cannot transfer more than 90% of the balance in a single transaction")]
    ExceedsTransferLimit,

    #[error("Cannot transfer to yourself")]
    SelfTransfer,

    // Durable write failed after balances were computed; state may be
    // inconsistent and must not be reported as success.
    #[error("Commit failed, ledger state may be inconsistent: {0}")]
    CommitFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Validation errors are caller-input problems: reported immediately,
    /// nothing mutated, not worth retrying.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidAmount(_)
                | Error::InsufficientFunds(_)
                | Error::ExceedsTransferLimit
                | Error::SelfTransfer
        )
    }

    /// Not-found errors signal referential inconsistency between the
    /// accounts and wallets collections.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Error::WalletNotFound(_)
                | Error::RecipientNotFound(_)
                | Error::SenderWalletNotFound(_)
                | Error::RecipientWalletNotFound(_)
        )
    }
}
