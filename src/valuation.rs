//! Best-effort valuation on top of the provider traits.
//!
//! Market data is never allowed to fail a caller: a price that cannot be
//! fetched values at zero and a missing exchange rate degrades to the
//! configured fallback constant, with a logged warning either way. The
//! resulting figures are display values only; they never feed back into the
//! booked counters the engines maintain.

use futures::future::join_all;
use tracing::warn;

use crate::currency_provider::CurrencyRateProvider;
use crate::ledger::{Currency, Holding, Stocks};
use crate::price_provider::PriceProvider;

/// Used when the live USD→KRW rate cannot be fetched.
pub const DEFAULT_USD_KRW_RATE: f64 = 1350.0;

/// Korean exchange ticker suffixes quoted directly in KRW.
const KRX_SUFFIXES: [&str; 2] = [".KS", ".KQ"];

pub fn is_krx_ticker(ticker: &str) -> bool {
    KRX_SUFFIXES.iter().any(|suffix| ticker.ends_with(suffix))
}

pub struct Valuation<'a> {
    prices: &'a (dyn PriceProvider + Send + Sync),
    rates: &'a (dyn CurrencyRateProvider + Send + Sync),
    fallback_rate: f64,
}

impl<'a> Valuation<'a> {
    pub fn new(
        prices: &'a (dyn PriceProvider + Send + Sync),
        rates: &'a (dyn CurrencyRateProvider + Send + Sync),
        fallback_rate: f64,
    ) -> Self {
        Valuation {
            prices,
            rates,
            fallback_rate,
        }
    }

    /// Live unit price for a ticker. An empty ticker or any fetch failure
    /// values at zero.
    pub async fn unit_price(&self, ticker: &str) -> f64 {
        if ticker.is_empty() {
            return 0.0;
        }
        match self.prices.fetch_price(ticker).await {
            Ok(result) => result.price,
            Err(e) => {
                warn!(ticker, error = %e, "Price fetch failed, valuing at 0");
                0.0
            }
        }
    }

    /// Spot USD→KRW rate, degrading to the fallback constant.
    pub async fn usd_krw_rate(&self) -> f64 {
        match self.rates.get_rate("USD", "KRW").await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = self.fallback_rate,
                    "Exchange rate fetch failed, using fallback"
                );
                self.fallback_rate
            }
        }
    }

    /// Live value of one account's holdings, split into (KRW, USD).
    ///
    /// Deposit sentinels count at face value. A KRW holding on a Korean
    /// exchange is priced directly in KRW; any other KRW holding is priced
    /// in USD and converted at `rate`. USD holdings are priced in USD.
    pub async fn account_totals(&self, holdings: &[Holding], rate: f64) -> (f64, f64) {
        let mut krw = 0.0;
        let mut usd = 0.0;

        let priced = join_all(holdings.iter().filter_map(Holding::as_stock).map(
            |stock| async move { (stock, self.unit_price(&stock.ticker).await) },
        ))
        .await;

        for holding in holdings {
            match holding {
                Holding::KrwDeposit(d) => krw += d.amount_krw,
                Holding::UsdDeposit(d) => usd += d.amount_usd,
                Holding::Stock(_) => {}
            }
        }
        for (stock, price) in priced {
            match stock.currency {
                Currency::Krw => {
                    let unit_krw = if is_krx_ticker(&stock.ticker) {
                        price
                    } else {
                        price * rate
                    };
                    krw += unit_krw * stock.quantity;
                }
                Currency::Usd => {
                    usd += price * stock.quantity;
                }
            }
        }
        (krw, usd)
    }

    /// Live value of the whole stocks category, split into (KRW, USD).
    pub async fn stocks_totals(&self, stocks: &Stocks, rate: f64) -> (f64, f64) {
        let mut total_krw = 0.0;
        let mut total_usd = 0.0;
        for holdings in stocks.accounts.values() {
            let (krw, usd) = self.account_totals(holdings, rate).await;
            total_krw += krw;
            total_usd += usd;
        }
        (total_krw, total_usd)
    }
}
