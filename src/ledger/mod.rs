//! The ledger mutation engine: the owned asset tree plus one module of
//! operations per asset category. All mutation goes through `&mut Ledger`
//! methods that either apply completely or report a [`LedgerError`] without
//! touching anything.

pub mod crypto;
pub mod error;
pub mod liquid;
pub mod model;
pub mod receivables;
pub mod stocks;

pub use error::{LedgerError, LedgerResult};
pub use model::{
    Bucket, Currency, Cryptocurrency, Entry, Holding, KrwDeposit, Ledger, LiquidAccountKind,
    LiquidAssets, ReceivableKind, ReceivablesAndDeposits, StockHolding, Stocks, Summary,
    UsdDeposit, INVESTMENT_TAG, KRW_DEPOSIT, USD_DEPOSIT,
};

/// Asserts the derived-total invariants the engines promise to maintain:
/// every bucket total equals the sum of its entries, every category total
/// equals the sum of its buckets, and the summary counters match.
#[cfg(test)]
pub(crate) fn assert_totals_consistent(ledger: &Ledger) {
    let liquid = &ledger.liquid_assets;
    let mut liquid_sum = 0;
    for bucket in [
        &liquid.checking_account,
        &liquid.savings_account,
        &liquid.installment_savings,
    ] {
        let entries: i64 = bucket.details.iter().map(|e| e.amount_krw).sum();
        assert_eq!(bucket.total_krw, entries, "bucket total out of sync");
        liquid_sum += bucket.total_krw;
    }
    assert_eq!(liquid.total_krw, liquid_sum, "liquid total out of sync");
    assert_eq!(
        ledger.summary.liquid_assets_krw, liquid.total_krw,
        "summary liquid counter out of sync"
    );

    let rd = &ledger.receivables_and_deposits;
    let mut rd_sum = 0;
    for bucket in [&rd.receivables, &rd.deposits] {
        let entries: i64 = bucket.details.iter().map(|e| e.amount_krw).sum();
        assert_eq!(bucket.total_krw, entries, "bucket total out of sync");
        rd_sum += bucket.total_krw;
    }
    assert_eq!(rd.total_krw, rd_sum, "receivables total out of sync");
    assert_eq!(
        ledger.summary.receivables_and_deposits_krw, rd.total_krw,
        "summary receivables counter out of sync"
    );

    assert_eq!(
        ledger.summary.converted_total_krw,
        ledger.summary.liquid_assets_krw + ledger.summary.receivables_and_deposits_krw,
        "converted total out of sync"
    );
}
