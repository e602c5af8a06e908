//! Receivables & deposits engine. Same bucket mechanics as the liquid
//! engine, with one twist: lending money is an upsert keyed by counterparty
//! name, and tags are fixed at creation time.

use tracing::debug;

use super::error::{LedgerError, LedgerResult};
use super::model::{dedupe_name, Entry, Ledger, ReceivableKind};

impl Ledger {
    /// Lends money out. If `name` already exists the amount is added to its
    /// balance and the supplied tags are discarded; otherwise a new entry is
    /// created (name deduplicated) carrying the tags. Returns the final name.
    pub fn rd_loan_out(
        &mut self,
        kind: ReceivableKind,
        name: &str,
        amount: i64,
        tags: Vec<String>,
    ) -> String {
        let bucket = kind.bucket_mut(&mut self.receivables_and_deposits);
        let final_name = match bucket.entry_mut(name) {
            Some(entry) => {
                entry.amount_krw += amount;
                name.to_string()
            }
            None => {
                let final_name = dedupe_name(|candidate| bucket.contains(candidate), name);
                bucket.details.push(Entry {
                    name: final_name.clone(),
                    amount_krw: amount,
                    tags,
                });
                final_name
            }
        };
        bucket.total_krw += amount;
        self.rd_propagate(amount);
        debug!(%kind, name = %final_name, amount, "loan out");
        final_name
    }

    /// Books a repayment against an existing entry.
    pub fn rd_repay(&mut self, kind: ReceivableKind, name: &str, amount: i64) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.receivables_and_deposits);
        let entry = bucket
            .entry_mut(name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        if entry.amount_krw < amount {
            return Err(LedgerError::Insufficient {
                requested: amount as f64,
                available: entry.amount_krw as f64,
            });
        }
        entry.amount_krw -= amount;
        bucket.total_krw -= amount;
        self.rd_propagate(-amount);
        debug!(%kind, name, amount, "repayment");
        Ok(())
    }

    /// Settles an entry completely, removing it and backing its balance out.
    pub fn rd_settle(&mut self, kind: ReceivableKind, name: &str) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.receivables_and_deposits);
        let index = bucket
            .details
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        let balance = bucket.details[index].amount_krw;
        bucket.details.remove(index);
        bucket.total_krw -= balance;
        self.rd_propagate(-balance);
        debug!(%kind, name, balance, "settlement");
        Ok(())
    }

    /// Sets an entry to an exact balance, propagating the difference.
    pub fn rd_adjust(
        &mut self,
        kind: ReceivableKind,
        name: &str,
        new_balance: i64,
    ) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.receivables_and_deposits);
        let entry = bucket
            .entry_mut(name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        let diff = new_balance - entry.amount_krw;
        entry.amount_krw = new_balance;
        bucket.total_krw += diff;
        self.rd_propagate(diff);
        debug!(%kind, name, new_balance, diff, "balance adjusted");
        Ok(())
    }

    fn rd_propagate(&mut self, diff: i64) {
        self.receivables_and_deposits.total_krw += diff;
        self.summary.receivables_and_deposits_krw += diff;
        self.summary.converted_total_krw += diff;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::assert_totals_consistent;

    #[test]
    fn loan_out_creates_entry_with_tags() {
        let mut ledger = Ledger::default();

        let name = ledger.rd_loan_out(
            ReceivableKind::Receivables,
            "Alice",
            300,
            vec!["#Receivables and Deposits".to_string()],
        );

        assert_eq!(name, "Alice");
        let entry = ledger
            .receivables_and_deposits
            .receivables
            .entry("Alice")
            .unwrap();
        assert_eq!(entry.amount_krw, 300);
        assert_eq!(entry.tags, vec!["#Receivables and Deposits".to_string()]);
        assert_eq!(ledger.summary.receivables_and_deposits_krw, 300);
        assert_eq!(ledger.summary.converted_total_krw, 300);
        assert_totals_consistent(&ledger);
    }

    #[test]
    fn loan_out_to_existing_adds_and_ignores_tags() {
        let mut ledger = Ledger::default();
        ledger.rd_loan_out(
            ReceivableKind::Receivables,
            "Alice",
            300,
            vec!["#original".to_string()],
        );

        let name = ledger.rd_loan_out(
            ReceivableKind::Receivables,
            "Alice",
            200,
            vec!["#ignored".to_string()],
        );

        assert_eq!(name, "Alice");
        let entry = ledger
            .receivables_and_deposits
            .receivables
            .entry("Alice")
            .unwrap();
        assert_eq!(entry.amount_krw, 500);
        assert_eq!(entry.tags, vec!["#original".to_string()]);
        assert_eq!(ledger.receivables_and_deposits.receivables.details.len(), 1);
        assert_totals_consistent(&ledger);
    }

    #[test]
    fn repay_and_settle() {
        let mut ledger = Ledger::default();
        ledger.rd_loan_out(ReceivableKind::Deposits, "Jeonse", 1000, vec![]);

        ledger
            .rd_repay(ReceivableKind::Deposits, "Jeonse", 400)
            .unwrap();
        assert_eq!(
            ledger
                .receivables_and_deposits
                .deposits
                .entry("Jeonse")
                .unwrap()
                .amount_krw,
            600
        );

        let over = ledger.rd_repay(ReceivableKind::Deposits, "Jeonse", 700);
        assert!(matches!(over, Err(LedgerError::Insufficient { .. })));
        assert_totals_consistent(&ledger);

        ledger.rd_settle(ReceivableKind::Deposits, "Jeonse").unwrap();
        assert!(ledger.receivables_and_deposits.deposits.details.is_empty());
        assert_eq!(ledger.receivables_and_deposits.total_krw, 0);
        assert_eq!(ledger.summary.converted_total_krw, 0);
        assert_totals_consistent(&ledger);
    }

    #[test]
    fn repay_unknown_entry_is_not_found() {
        let mut ledger = Ledger::default();
        let result = ledger.rd_repay(ReceivableKind::Receivables, "Bob", 100);
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn adjust_propagates_negative_diff() {
        let mut ledger = Ledger::default();
        ledger.rd_loan_out(ReceivableKind::Receivables, "Alice", 1000, vec![]);

        ledger
            .rd_adjust(ReceivableKind::Receivables, "Alice", 400)
            .unwrap();

        assert_eq!(
            ledger
                .receivables_and_deposits
                .receivables
                .entry("Alice")
                .unwrap()
                .amount_krw,
            400
        );
        assert_eq!(ledger.receivables_and_deposits.total_krw, 400);
        assert_eq!(ledger.summary.receivables_and_deposits_krw, 400);
        assert_totals_consistent(&ledger);
    }

    #[test]
    fn upsert_does_not_touch_liquid_counters() {
        let mut ledger = Ledger::default();
        ledger.rd_loan_out(ReceivableKind::Receivables, "Alice", 300, vec![]);
        assert_eq!(ledger.summary.liquid_assets_krw, 0);
        assert_eq!(ledger.liquid_assets.total_krw, 0);
    }
}
