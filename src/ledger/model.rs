//! The persisted ledger document.
//!
//! The whole tree is loaded wholesale, mutated in memory by exactly one
//! engine operation at a time, and saved wholesale. Serde attributes mirror
//! the on-disk JSON shape; every field defaults when absent, so a partially
//! populated or freshly seeded document loads cleanly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel name of the KRW cash placeholder inside every stock account.
pub const KRW_DEPOSIT: &str = "KRW_DEPOSIT";
/// Sentinel name of the USD cash placeholder inside every stock account.
pub const USD_DEPOSIT: &str = "USD_DEPOSIT";

/// Tag attached to holdings created by the stocks engine.
pub const INVESTMENT_TAG: &str = "#Investment Assets";

/// Top-level container for the four category subtrees plus running totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub liquid_assets: LiquidAssets,
    pub receivables_and_deposits: ReceivablesAndDeposits,
    pub stocks: Stocks,
    pub cryptocurrency: Cryptocurrency,
    pub summary: Summary,
}

/// Running totals in KRW, maintained incrementally by every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub liquid_assets_krw: i64,
    pub receivables_and_deposits_krw: i64,
    pub converted_total_krw: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidAssets {
    pub total_krw: i64,
    pub checking_account: Bucket,
    pub savings_account: Bucket,
    pub installment_savings: Bucket,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceivablesAndDeposits {
    pub total_krw: i64,
    pub receivables: Bucket,
    pub deposits: Bucket,
}

/// A named balance-holding unit: a running total and an ordered entry list.
///
/// Invariant: `total_krw == details.iter().map(|e| e.amount_krw).sum()` after
/// every completed engine operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bucket {
    pub total_krw: i64,
    pub details: Vec<Entry>,
}

impl Bucket {
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.details.iter().find(|e| e.name == name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.details.iter_mut().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }
}

/// A single named balance line inside a bucket. Entry names are unique
/// within their bucket; creation dedups by suffixing `" (n)"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub amount_krw: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The three liquid sub-categories, closed so a typo cannot reach the
/// engine as an unresolvable account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LiquidAccountKind {
    Checking,
    Savings,
    Installment,
}

impl LiquidAccountKind {
    pub fn bucket<'a>(&self, liquid: &'a LiquidAssets) -> &'a Bucket {
        match self {
            LiquidAccountKind::Checking => &liquid.checking_account,
            LiquidAccountKind::Savings => &liquid.savings_account,
            LiquidAccountKind::Installment => &liquid.installment_savings,
        }
    }

    pub fn bucket_mut<'a>(&self, liquid: &'a mut LiquidAssets) -> &'a mut Bucket {
        match self {
            LiquidAccountKind::Checking => &mut liquid.checking_account,
            LiquidAccountKind::Savings => &mut liquid.savings_account,
            LiquidAccountKind::Installment => &mut liquid.installment_savings,
        }
    }
}

impl fmt::Display for LiquidAccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiquidAccountKind::Checking => "Checking Account",
            LiquidAccountKind::Savings => "Savings Account",
            LiquidAccountKind::Installment => "Installment Savings",
        };
        write!(f, "{label}")
    }
}

/// The two receivables/deposits sub-categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReceivableKind {
    Receivables,
    Deposits,
}

impl ReceivableKind {
    pub fn bucket<'a>(&self, rd: &'a ReceivablesAndDeposits) -> &'a Bucket {
        match self {
            ReceivableKind::Receivables => &rd.receivables,
            ReceivableKind::Deposits => &rd.deposits,
        }
    }

    pub fn bucket_mut<'a>(&self, rd: &'a mut ReceivablesAndDeposits) -> &'a mut Bucket {
        match self {
            ReceivableKind::Receivables => &mut rd.receivables,
            ReceivableKind::Deposits => &mut rd.deposits,
        }
    }
}

impl fmt::Display for ReceivableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReceivableKind::Receivables => "Receivables",
            ReceivableKind::Deposits => "Deposits",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum Currency {
    Krw,
    Usd,
}

impl Currency {
    pub fn other(self) -> Self {
        match self {
            Currency::Krw => Currency::Usd,
            Currency::Usd => Currency::Krw,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Brokerage category: account-name → ordered holdings, plus root cash
/// counters. The counters are NOT derived from holdings; every mutating
/// operation moves them in step with the deposit sentinels, and valuation
/// never touches them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stocks {
    pub total_krw: f64,
    pub total_usd: f64,
    #[serde(flatten)]
    pub accounts: BTreeMap<String, Vec<Holding>>,
}

impl Stocks {
    pub fn account(&self, name: &str) -> Option<&Vec<Holding>> {
        self.accounts.get(name)
    }

    pub fn account_mut(&mut self, name: &str) -> Option<&mut Vec<Holding>> {
        self.accounts.get_mut(name)
    }
}

/// One line inside a stock account: either a cash sentinel or a tradable
/// position. Untagged so the on-disk rows keep the original field shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Holding {
    KrwDeposit(KrwDeposit),
    UsdDeposit(UsdDeposit),
    Stock(StockHolding),
}

impl Holding {
    pub fn as_stock(&self) -> Option<&StockHolding> {
        match self {
            Holding::Stock(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stock_mut(&mut self) -> Option<&mut StockHolding> {
        match self {
            Holding::Stock(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrwDeposit {
    pub name: String,
    pub amount_krw: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KrwDeposit {
    pub fn seed() -> Self {
        KrwDeposit {
            name: KRW_DEPOSIT.to_string(),
            amount_krw: 0.0,
            tags: vec![INVESTMENT_TAG.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdDeposit {
    pub name: String,
    pub amount_usd: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl UsdDeposit {
    pub fn seed() -> Self {
        UsdDeposit {
            name: USD_DEPOSIT.to_string(),
            amount_usd: 0.0,
            tags: vec![INVESTMENT_TAG.to_string()],
        }
    }
}

/// A tradable position. `symbol` is the unique key within its account;
/// `ticker` is the external price-lookup key and may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
    pub symbol: String,
    #[serde(default)]
    pub ticker: String,
    pub currency: Currency,
    pub quantity: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Cryptocurrency category: exchange-name → opaque coin records. The engine
/// only creates and deletes exchanges; `total_usd` is maintained externally
/// and consumed read-only here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cryptocurrency {
    pub total_usd: f64,
    #[serde(flatten)]
    pub exchanges: BTreeMap<String, Vec<serde_json::Value>>,
}

/// Picks a unique name by suffixing `" (1)"`, `" (2)"`, … on collision.
pub(crate) fn dedupe_name(taken: impl Fn(&str) -> bool, want: &str) -> String {
    if !taken(want) {
        return want.to_string();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{want} ({counter})");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
