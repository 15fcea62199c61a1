use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Runtime knobs for fraud screening. Defaults match the production rule
/// set; a `config.json` in the data directory overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Withdrawals strictly above this amount are flagged.
    pub withdrawal_flag_threshold: Decimal,
    /// Trailing window for the burst-transfer rule, in milliseconds.
    pub burst_window_ms: i64,
    /// Prior completed in-window transfers at or above which the rule fires.
    pub burst_max_transfers: usize,
    /// When set, flagged withdrawals/transfers are held as PENDING for
    /// review instead of completing. Off by default: flagging is
    /// observational and the transaction still completes.
    pub block_on_flag: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            withdrawal_flag_threshold: Decimal::new(5000, 0),
            burst_window_ms: 5 * 60 * 1000,
            burst_max_transfers: 3,
            block_on_flag: false,
        }
    }
}

impl LedgerConfig {
    /// Read the config file if present, falling back to defaults on a
    /// missing or unparsable file.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unparsable config");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
