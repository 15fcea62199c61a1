use rust_decimal::Decimal;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::domain::{FraudOutcome, FraudRule, Transaction, TransactionKind, TransactionStatus};

/// Ordered set of independent fraud predicates. Every rule sees the same
/// candidate and history; triggered reasons are joined in rule order, so
/// appending a new rule never changes what existing rules report.
pub struct FraudRuleEngine {
    rules: Vec<Box<dyn FraudRule>>,
}

impl FraudRuleEngine {
    pub fn new(rules: Vec<Box<dyn FraudRule>>) -> Self {
        Self { rules }
    }

    /// The production rule set, thresholds taken from config.
    pub fn with_defaults(config: &LedgerConfig) -> Self {
        Self::new(vec![
            Box::new(BurstTransfers {
                window_ms: config.burst_window_ms,
                max_prior: config.burst_max_transfers,
            }),
            Box::new(LargeWithdrawal {
                threshold: config.withdrawal_flag_threshold,
            }),
        ])
    }

    pub fn push_rule(&mut self, rule: Box<dyn FraudRule>) {
        self.rules.push(rule);
    }

    /// Pure evaluation: reads history, mutates nothing, never fails.
    /// Persisting the resulting flag is the caller's job.
    pub fn evaluate(&self, candidate: &Transaction, history: &[Transaction]) -> FraudOutcome {
        let mut reasons = Vec::new();
        for rule in &self.rules {
            if let Some(reason) = rule.evaluate(candidate, history) {
                debug!(rule = rule.name(), tx = %candidate.id, "fraud rule fired");
                reasons.push(reason);
            }
        }
        if reasons.is_empty() {
            FraudOutcome::Clear
        } else {
            FraudOutcome::Flagged {
                reason: reasons.join("; "),
            }
        }
    }
}

/// Flags a transfer preceded by too many completed transfers from the same
/// source within a trailing window.
pub struct BurstTransfers {
    pub window_ms: i64,
    pub max_prior: usize,
}

impl FraudRule for BurstTransfers {
    fn name(&self) -> &'static str {
        "burst-transfers"
    }

    fn evaluate(&self, candidate: &Transaction, history: &[Transaction]) -> Option<String> {
        let source = candidate.transfer_source()?;
        let prior = history
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .filter(|t| t.transfer_source() == Some(source))
            .filter(|t| {
                // Trailing window, strict on the boundary: a transfer
                // exactly window_ms old is excluded, future-dated rows too.
                let elapsed_ms = (candidate.timestamp - t.timestamp).num_milliseconds();
                elapsed_ms >= 0 && elapsed_ms < self.window_ms
            })
            .count();
        (prior >= self.max_prior).then(|| "multiple transfers in a short period".to_owned())
    }
}

/// Flags a withdrawal strictly above a fixed threshold.
pub struct LargeWithdrawal {
    pub threshold: Decimal,
}

impl FraudRule for LargeWithdrawal {
    fn name(&self) -> &'static str {
        "large-withdrawal"
    }

    fn evaluate(&self, candidate: &Transaction, _history: &[Transaction]) -> Option<String> {
        match candidate.kind {
            TransactionKind::Withdraw { .. } if candidate.amount > self.threshold => {
                Some("sudden large withdrawal".to_owned())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;
    use chrono::Duration;

    fn transfer(from: &str, to: &str, amount: i64) -> Transaction {
        Transaction::pending(
            TransactionKind::Transfer {
                from: AccountId::from(from),
                to: AccountId::from(to),
            },
            Decimal::new(amount, 0),
        )
    }

    fn completed_ago(mut tx: Transaction, reference: &Transaction, ms: i64) -> Transaction {
        tx.status = TransactionStatus::Completed;
        tx.timestamp = reference.timestamp - Duration::milliseconds(ms);
        tx
    }

    fn engine() -> FraudRuleEngine {
        FraudRuleEngine::with_defaults(&LedgerConfig::default())
    }

    #[test]
    fn burst_fires_at_three_prior_in_window() {
        let candidate = transfer("u1", "u2", 10);
        let history: Vec<_> = (1..=3)
            .map(|i| completed_ago(transfer("u1", "u2", 10), &candidate, i * 1000))
            .collect();
        let outcome = engine().evaluate(&candidate, &history);
        assert_eq!(
            outcome.reason(),
            Some("multiple transfers in a short period")
        );
    }

    #[test]
    fn burst_needs_three_priors() {
        let candidate = transfer("u1", "u2", 10);
        let history = vec![
            completed_ago(transfer("u1", "u2", 10), &candidate, 1000),
            completed_ago(transfer("u1", "u2", 10), &candidate, 2000),
        ];
        assert_eq!(engine().evaluate(&candidate, &history), FraudOutcome::Clear);
    }

    #[test]
    fn burst_window_boundary_is_exclusive() {
        let candidate = transfer("u1", "u2", 10);
        let history = vec![
            completed_ago(transfer("u1", "u2", 10), &candidate, 1000),
            completed_ago(transfer("u1", "u2", 10), &candidate, 2000),
            // Exactly five minutes old: outside the strict window.
            completed_ago(transfer("u1", "u2", 10), &candidate, 300_000),
        ];
        assert_eq!(engine().evaluate(&candidate, &history), FraudOutcome::Clear);
    }

    #[test]
    fn burst_ignores_pending_other_sources_and_future_rows() {
        let candidate = transfer("u1", "u2", 10);
        let pending = {
            let mut tx = transfer("u1", "u2", 10);
            tx.timestamp = candidate.timestamp - Duration::milliseconds(1000);
            tx // still PENDING
        };
        let history = vec![
            pending,
            completed_ago(transfer("u9", "u2", 10), &candidate, 1000),
            completed_ago(transfer("u1", "u2", 10), &candidate, -1000), // future-dated
            completed_ago(transfer("u1", "u2", 10), &candidate, 2000),
            completed_ago(transfer("u1", "u2", 10), &candidate, 3000),
        ];
        assert_eq!(engine().evaluate(&candidate, &history), FraudOutcome::Clear);
    }

    #[test]
    fn large_withdrawal_threshold_is_exclusive() {
        let at = Transaction::pending(
            TransactionKind::Withdraw {
                account: AccountId::from("u1"),
            },
            Decimal::new(5000, 0),
        );
        assert_eq!(engine().evaluate(&at, &[]), FraudOutcome::Clear);

        let above = Transaction::pending(
            TransactionKind::Withdraw {
                account: AccountId::from("u1"),
            },
            Decimal::new(5001, 0),
        );
        assert_eq!(
            engine().evaluate(&above, &[]).reason(),
            Some("sudden large withdrawal")
        );
    }

    #[test]
    fn deposits_are_never_screened_by_either_rule() {
        let deposit = Transaction::pending(
            TransactionKind::Deposit {
                account: AccountId::from("u1"),
            },
            Decimal::new(1_000_000, 0),
        );
        assert_eq!(engine().evaluate(&deposit, &[]), FraudOutcome::Clear);
    }

    struct AlwaysFires(&'static str);

    impl FraudRule for AlwaysFires {
        fn name(&self) -> &'static str {
            "always-fires"
        }
        fn evaluate(&self, _: &Transaction, _: &[Transaction]) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    #[test]
    fn reasons_join_in_rule_order() {
        let engine = FraudRuleEngine::new(vec![
            Box::new(AlwaysFires("first reason")),
            Box::new(AlwaysFires("second reason")),
        ]);
        let candidate = transfer("u1", "u2", 10);
        assert_eq!(
            engine.evaluate(&candidate, &[]).reason(),
            Some("first reason; second reason")
        );
    }

    #[test]
    fn appending_a_rule_keeps_existing_reasons_first() {
        let mut engine = engine();
        engine.push_rule(Box::new(AlwaysFires("extra reason")));
        let candidate = Transaction::pending(
            TransactionKind::Withdraw {
                account: AccountId::from("u1"),
            },
            Decimal::new(9000, 0),
        );
        assert_eq!(
            engine.evaluate(&candidate, &[]).reason(),
            Some("sudden large withdrawal; extra reason")
        );
    }
}
