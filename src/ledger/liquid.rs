//! Liquid assets engine: mutations over the checking / savings / installment
//! buckets. Every operation keeps the entry balance, the bucket total, the
//! category total, and the two summary counters moving together.
//!
//! Input validation (positive amounts, non-empty names) happens at the
//! caller; the engine reports `NotFound` and `Insufficient` as values.

use tracing::debug;

use super::error::{LedgerError, LedgerResult};
use super::model::{dedupe_name, Entry, Ledger, LiquidAccountKind};

impl Ledger {
    /// Adds `amount` to an existing entry and propagates it through the
    /// bucket, category, and summary counters.
    pub fn liquid_deposit(
        &mut self,
        kind: LiquidAccountKind,
        name: &str,
        amount: i64,
    ) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.liquid_assets);
        let entry = bucket
            .entry_mut(name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        entry.amount_krw += amount;
        bucket.total_krw += amount;
        self.liquid_propagate(amount);
        debug!(%kind, name, amount, "liquid deposit");
        Ok(())
    }

    /// Symmetric decrement of the same counters; refuses to overdraw.
    pub fn liquid_withdraw(
        &mut self,
        kind: LiquidAccountKind,
        name: &str,
        amount: i64,
    ) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.liquid_assets);
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
        self.liquid_propagate(-amount);
        debug!(%kind, name, amount, "liquid withdraw");
        Ok(())
    }

    /// Withdraw-then-deposit between two entries. The destination is
    /// resolved before the withdrawal so a failed transfer leaves the
    /// ledger untouched.
    pub fn liquid_transfer(
        &mut self,
        from_kind: LiquidAccountKind,
        from_name: &str,
        to_kind: LiquidAccountKind,
        to_name: &str,
        amount: i64,
    ) -> LedgerResult<()> {
        if !to_kind.bucket(&self.liquid_assets).contains(to_name) {
            return Err(LedgerError::NotFound(format!("{to_kind} entry {to_name}")));
        }
        self.liquid_withdraw(from_kind, from_name, amount)?;
        self.liquid_deposit(to_kind, to_name, amount)
    }

    /// Creates a new entry, deduplicating the name with a `" (n)"` suffix,
    /// and returns the final name.
    pub fn liquid_add_account(
        &mut self,
        kind: LiquidAccountKind,
        name: &str,
        initial_balance: i64,
        tags: Vec<String>,
    ) -> String {
        let bucket = kind.bucket_mut(&mut self.liquid_assets);
        let final_name = dedupe_name(|candidate| bucket.contains(candidate), name);
        bucket.details.push(Entry {
            name: final_name.clone(),
            amount_krw: initial_balance,
            tags,
        });
        bucket.total_krw += initial_balance;
        self.liquid_propagate(initial_balance);
        debug!(%kind, name = %final_name, initial_balance, "liquid account added");
        final_name
    }

    /// Removes an entry, backing its balance out of every counter.
    pub fn liquid_delete_account(
        &mut self,
        kind: LiquidAccountKind,
        name: &str,
    ) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.liquid_assets);
        let index = bucket
            .details
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        let balance = bucket.details[index].amount_krw;
        bucket.details.remove(index);
        bucket.total_krw -= balance;
        self.liquid_propagate(-balance);
        debug!(%kind, name, balance, "liquid account deleted");
        Ok(())
    }

    /// Sets an entry to an exact balance, propagating the difference
    /// (possibly negative). Applying the same balance twice is a no-op the
    /// second time.
    pub fn liquid_adjust_balance(
        &mut self,
        kind: LiquidAccountKind,
        name: &str,
        new_balance: i64,
    ) -> LedgerResult<()> {
        let bucket = kind.bucket_mut(&mut self.liquid_assets);
        let entry = bucket
            .entry_mut(name)
            .ok_or_else(|| LedgerError::NotFound(format!("{kind} entry {name}")))?;
        let diff = new_balance - entry.amount_krw;
        entry.amount_krw = new_balance;
        bucket.total_krw += diff;
        self.liquid_propagate(diff);
        debug!(%kind, name, new_balance, diff, "liquid balance adjusted");
        Ok(())
    }

    fn liquid_propagate(&mut self, diff: i64) {
        self.liquid_assets.total_krw += diff;
        self.summary.liquid_assets_krw += diff;
        self.summary.converted_total_krw += diff;
    }
}
