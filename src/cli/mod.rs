//! Command-line surface: one command group per asset category plus the
//! combined summary. Input validation (positive amounts, non-empty names,
//! same-account transfers) lives here, before anything reaches the engine.

pub mod crypto;
pub mod liquid;
pub mod receivables;
pub mod setup;
pub mod stocks;
pub mod summary;
pub mod ui;

use anyhow::{bail, Result};
use clap::Subcommand;

use crate::ledger::{Currency, LiquidAccountKind, ReceivableKind};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create default configuration
    Setup,
    /// Display the combined net worth summary
    Summary,
    /// Liquid asset accounts (checking / savings / installment)
    Liquid {
        #[command(subcommand)]
        op: Option<LiquidOp>,
    },
    /// Receivables and deposits
    Rd {
        #[command(subcommand)]
        op: Option<RdOp>,
    },
    /// Brokerage accounts and holdings
    Stocks {
        #[command(subcommand)]
        op: Option<StockOp>,
    },
    /// Cryptocurrency exchanges
    Crypto {
        #[command(subcommand)]
        op: Option<CryptoOp>,
    },
}

#[derive(Debug, Subcommand)]
pub enum LiquidOp {
    /// Deposit money into an existing account
    Deposit {
        #[arg(value_enum)]
        kind: LiquidAccountKind,
        name: String,
        amount: i64,
    },
    /// Withdraw money from an existing account
    Withdraw {
        #[arg(value_enum)]
        kind: LiquidAccountKind,
        name: String,
        amount: i64,
    },
    /// Transfer money between accounts
    Transfer {
        #[arg(value_enum)]
        from_kind: LiquidAccountKind,
        from_name: String,
        #[arg(value_enum)]
        to_kind: LiquidAccountKind,
        to_name: String,
        amount: i64,
    },
    /// Add a new account
    Add {
        #[arg(value_enum)]
        kind: LiquidAccountKind,
        name: String,
        /// Initial balance in KRW
        #[arg(default_value_t = 0)]
        balance: i64,
        /// Tags recorded on the new account
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete an existing account
    Delete {
        #[arg(value_enum)]
        kind: LiquidAccountKind,
        name: String,
    },
    /// Set an account balance to an exact amount
    Adjust {
        #[arg(value_enum)]
        kind: LiquidAccountKind,
        name: String,
        balance: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum RdOp {
    /// Lend money out; tops up an existing entry or creates a new one
    LoanOut {
        #[arg(value_enum)]
        kind: ReceivableKind,
        name: String,
        amount: i64,
        /// Tags recorded if a new entry is created
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Book a repayment against an entry
    Repay {
        #[arg(value_enum)]
        kind: ReceivableKind,
        name: String,
        amount: i64,
    },
    /// Settle an entry completely and remove it
    Settle {
        #[arg(value_enum)]
        kind: ReceivableKind,
        name: String,
    },
    /// Set an entry balance to an exact amount
    Adjust {
        #[arg(value_enum)]
        kind: ReceivableKind,
        name: String,
        balance: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum StockOp {
    /// Buy shares, paying from the account's cash deposit
    Buy {
        account: String,
        symbol: String,
        quantity: f64,
        /// Price paid per share
        price: f64,
        /// Price-lookup ticker for a new holding (e.g. AAPL, 005930.KS)
        #[arg(long, default_value = "")]
        ticker: String,
        /// Settlement currency for a new holding
        #[arg(long, value_enum, default_value_t = Currency::Usd)]
        currency: Currency,
        /// Tags recorded if a new holding is created
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Sell shares, crediting the proceeds to the cash deposit
    Sell {
        account: String,
        symbol: String,
        quantity: f64,
        /// Price received per share
        price: f64,
    },
    /// Deposit cash into an account
    Deposit {
        account: String,
        #[arg(value_enum)]
        currency: Currency,
        amount: f64,
    },
    /// Withdraw cash from an account
    Withdraw {
        account: String,
        #[arg(value_enum)]
        currency: Currency,
        amount: f64,
    },
    /// Book a currency exchange between the two cash deposits
    Exchange {
        account: String,
        /// Currency to sell
        #[arg(value_enum)]
        from: Currency,
        /// Amount sold
        from_amount: f64,
        /// Amount received, as booked by the brokerage
        to_amount: f64,
    },
    /// Remove a holding whose quantity is zero
    RemoveZero { account: String, symbol: String },
    /// Create a new brokerage account
    AddAccount { name: String },
    /// Delete a brokerage account
    DeleteAccount { name: String },
}

#[derive(Debug, Subcommand)]
pub enum CryptoOp {
    /// Register a new exchange
    AddExchange { name: String },
    /// Delete an exchange and its coin records
    DeleteExchange { name: String },
}

pub(crate) fn require_positive(amount: i64) -> Result<()> {
    if amount <= 0 {
        bail!("Amount must be positive");
    }
    Ok(())
}

pub(crate) fn require_positive_f64(amount: f64) -> Result<()> {
    if amount.is_nan() || amount <= 0.0 {
        bail!("Amount must be positive");
    }
    Ok(())
}

pub(crate) fn require_non_negative(amount: i64) -> Result<()> {
    if amount < 0 {
        bail!("Amount must not be negative");
    }
    Ok(())
}

pub(crate) fn require_non_negative_f64(amount: f64) -> Result<()> {
    if amount.is_nan() || amount < 0.0 {
        bail!("Amount must not be negative");
    }
    Ok(())
}

/// Trims a user-supplied name and rejects empty input.
pub(crate) fn require_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Name must not be empty");
    }
    Ok(trimmed)
}
