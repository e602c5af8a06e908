//! Combined net-worth aggregation across all four categories.
//!
//! Aggregation is read-only: it walks the ledger, asks the valuation layer
//! for live stock values and the spot rate, and folds everything into one
//! KRW figure. Missing subtrees contribute zero.

use crate::ledger::Ledger;
use crate::valuation::Valuation;

#[derive(Debug, Clone, PartialEq)]
pub struct NetWorthSummary {
    pub liquid_krw: i64,
    pub receivables_krw: i64,
    pub stocks_krw: f64,
    pub stocks_usd: f64,
    pub crypto_krw: f64,
    pub crypto_usd: f64,
    /// Sum of every KRW-side figure.
    pub total_krw: f64,
    /// Sum of every USD-side figure.
    pub total_usd: f64,
    /// `total_krw + total_usd * exchange_rate`.
    pub combined_total_krw: f64,
    pub exchange_rate: f64,
}

/// Recomputes the combined totals from the current ledger and live market
/// data. Stock values come from the valuation walk, not from the booked
/// root counters, so the figure reflects current prices.
pub async fn compute_grand_total(ledger: &Ledger, valuation: &Valuation<'_>) -> NetWorthSummary {
    let exchange_rate = valuation.usd_krw_rate().await;

    let liquid_krw = ledger.liquid_assets.total_krw;
    let receivables_krw = ledger.receivables_and_deposits.total_krw;
    let (stocks_krw, stocks_usd) = valuation.stocks_totals(&ledger.stocks, exchange_rate).await;
    let crypto_usd = ledger.cryptocurrency.total_usd;
    let crypto_krw = crypto_usd * exchange_rate;

    let total_krw = liquid_krw as f64 + receivables_krw as f64 + stocks_krw + crypto_krw;
    let total_usd = stocks_usd + crypto_usd;
    let combined_total_krw = total_krw + total_usd * exchange_rate;

    NetWorthSummary {
        liquid_krw,
        receivables_krw,
        stocks_krw,
        stocks_usd,
        crypto_krw,
        crypto_usd,
        total_krw,
        total_usd,
        combined_total_krw,
        exchange_rate,
    }
}
