//! Stocks engine: brokerage accounts holding two always-present cash
//! sentinels plus tradable positions.
//!
//! Every mutation moves a deposit sentinel and the matching root counter
//! (`total_krw` / `total_usd`) together. The root counters track booked cash
//! only; live share valuation happens in the valuation layer and never
//! writes back here. Operations validate everything they need before the
//! first write so a failure leaves the account untouched.

use tracing::debug;

use super::error::{LedgerError, LedgerResult};
use super::model::{
    Currency, Holding, KrwDeposit, Ledger, StockHolding, UsdDeposit, KRW_DEPOSIT, USD_DEPOSIT,
};

fn krw_deposit_mut(holdings: &mut [Holding]) -> Option<&mut KrwDeposit> {
    holdings.iter_mut().find_map(|h| match h {
        Holding::KrwDeposit(d) => Some(d),
        _ => None,
    })
}

fn usd_deposit_mut(holdings: &mut [Holding]) -> Option<&mut UsdDeposit> {
    holdings.iter_mut().find_map(|h| match h {
        Holding::UsdDeposit(d) => Some(d),
        _ => None,
    })
}

pub(crate) fn sentinel_balance(holdings: &[Holding], currency: Currency) -> Option<f64> {
    holdings.iter().find_map(|h| match (currency, h) {
        (Currency::Krw, Holding::KrwDeposit(d)) => Some(d.amount_krw),
        (Currency::Usd, Holding::UsdDeposit(d)) => Some(d.amount_usd),
        _ => None,
    })
}

fn sentinel_name(currency: Currency) -> &'static str {
    match currency {
        Currency::Krw => KRW_DEPOSIT,
        Currency::Usd => USD_DEPOSIT,
    }
}

impl Ledger {
    /// Creates an account seeded with both cash sentinels at zero.
    pub fn stock_create_account(&mut self, name: &str) -> LedgerResult<()> {
        if self.stocks.accounts.contains_key(name) {
            return Err(LedgerError::AlreadyExists(format!("stock account {name}")));
        }
        self.stocks.accounts.insert(
            name.to_string(),
            vec![
                Holding::KrwDeposit(KrwDeposit::seed()),
                Holding::UsdDeposit(UsdDeposit::seed()),
            ],
        );
        debug!(name, "stock account created");
        Ok(())
    }

    /// Removes an account and backs its sentinel balances out of the root
    /// counters. Remaining share positions carry no booked cash, so they
    /// are dropped without touching the counters.
    pub fn stock_delete_account(&mut self, name: &str) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .remove(name)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {name}")))?;
        for holding in &holdings {
            match holding {
                Holding::KrwDeposit(d) => self.stocks.total_krw -= d.amount_krw,
                Holding::UsdDeposit(d) => self.stocks.total_usd -= d.amount_usd,
                Holding::Stock(_) => {}
            }
        }
        debug!(name, "stock account deleted");
        Ok(())
    }

    /// Buys shares, paying from the matching-currency sentinel. A
    /// pre-existing symbol is topped up (its tags stay as created);
    /// otherwise a new holding is appended.
    #[allow(clippy::too_many_arguments)]
    pub fn stock_buy(
        &mut self,
        account: &str,
        symbol: &str,
        ticker: &str,
        currency: Currency,
        quantity: f64,
        tags: Vec<String>,
        unit_price: f64,
    ) -> LedgerResult<()> {
        let cost = unit_price * quantity;
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;

        match currency {
            Currency::Krw => {
                let deposit = krw_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(KRW_DEPOSIT.to_string()))?;
                if deposit.amount_krw < cost {
                    return Err(LedgerError::Insufficient {
                        requested: cost,
                        available: deposit.amount_krw,
                    });
                }
                deposit.amount_krw -= cost;
                self.stocks.total_krw -= cost;
            }
            Currency::Usd => {
                let deposit = usd_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(USD_DEPOSIT.to_string()))?;
                if deposit.amount_usd < cost {
                    return Err(LedgerError::Insufficient {
                        requested: cost,
                        available: deposit.amount_usd,
                    });
                }
                deposit.amount_usd -= cost;
                self.stocks.total_usd -= cost;
            }
        }

        if let Some(existing) = holdings
            .iter_mut()
            .filter_map(Holding::as_stock_mut)
            .find(|s| s.symbol == symbol)
        {
            existing.quantity += quantity;
        } else {
            holdings.push(Holding::Stock(StockHolding {
                symbol: symbol.to_string(),
                ticker: ticker.to_string(),
                currency,
                quantity,
                tags,
            }));
        }
        debug!(account, symbol, quantity, cost, "stock bought");
        Ok(())
    }

    /// Sells shares, crediting the proceeds to the holding's own currency
    /// sentinel. Selling down to zero keeps the holding; see
    /// [`Ledger::stock_remove_zero`].
    pub fn stock_sell(
        &mut self,
        account: &str,
        symbol: &str,
        quantity: f64,
        unit_price: f64,
    ) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;

        let (index, currency, held) = holdings
            .iter()
            .enumerate()
            .find_map(|(i, h)| {
                h.as_stock()
                    .filter(|s| s.symbol == symbol)
                    .map(|s| (i, s.currency, s.quantity))
            })
            .ok_or_else(|| LedgerError::NotFound(format!("holding {symbol}")))?;
        if quantity > held {
            return Err(LedgerError::Insufficient {
                requested: quantity,
                available: held,
            });
        }

        let proceeds = unit_price * quantity;
        match currency {
            Currency::Krw => {
                let deposit = krw_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(KRW_DEPOSIT.to_string()))?;
                deposit.amount_krw += proceeds;
                self.stocks.total_krw += proceeds;
            }
            Currency::Usd => {
                let deposit = usd_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(USD_DEPOSIT.to_string()))?;
                deposit.amount_usd += proceeds;
                self.stocks.total_usd += proceeds;
            }
        }
        if let Holding::Stock(s) = &mut holdings[index] {
            s.quantity -= quantity;
        }
        debug!(account, symbol, quantity, proceeds, "stock sold");
        Ok(())
    }

    /// Credits the matching sentinel and root counter.
    pub fn stock_deposit(
        &mut self,
        account: &str,
        currency: Currency,
        amount: f64,
    ) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;
        match currency {
            Currency::Krw => {
                let deposit = krw_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(KRW_DEPOSIT.to_string()))?;
                deposit.amount_krw += amount;
                self.stocks.total_krw += amount;
            }
            Currency::Usd => {
                let deposit = usd_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(USD_DEPOSIT.to_string()))?;
                deposit.amount_usd += amount;
                self.stocks.total_usd += amount;
            }
        }
        debug!(account, %currency, amount, "cash deposited");
        Ok(())
    }

    /// Debits the matching sentinel and root counter; refuses to overdraw.
    pub fn stock_withdraw(
        &mut self,
        account: &str,
        currency: Currency,
        amount: f64,
    ) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;
        match currency {
            Currency::Krw => {
                let deposit = krw_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(KRW_DEPOSIT.to_string()))?;
                if deposit.amount_krw < amount {
                    return Err(LedgerError::Insufficient {
                        requested: amount,
                        available: deposit.amount_krw,
                    });
                }
                deposit.amount_krw -= amount;
                self.stocks.total_krw -= amount;
            }
            Currency::Usd => {
                let deposit = usd_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(USD_DEPOSIT.to_string()))?;
                if deposit.amount_usd < amount {
                    return Err(LedgerError::Insufficient {
                        requested: amount,
                        available: deposit.amount_usd,
                    });
                }
                deposit.amount_usd -= amount;
                self.stocks.total_usd -= amount;
            }
        }
        debug!(account, %currency, amount, "cash withdrawn");
        Ok(())
    }

    /// Books a currency exchange inside one account: debits `from_amount`
    /// from one sentinel and credits `to_amount` to the other. The two
    /// amounts are caller-supplied independently so an actual brokerage FX
    /// event (rate, fees and all) can be reconciled exactly; no rate
    /// relationship is enforced between them.
    pub fn stock_exchange(
        &mut self,
        account: &str,
        from: Currency,
        to: Currency,
        from_amount: f64,
        to_amount: f64,
    ) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;

        // The credit side must be resolvable before the debit lands.
        if sentinel_balance(holdings, to).is_none() {
            return Err(LedgerError::NotFound(sentinel_name(to).to_string()));
        }

        match from {
            Currency::Krw => {
                let deposit = krw_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(KRW_DEPOSIT.to_string()))?;
                if deposit.amount_krw < from_amount {
                    return Err(LedgerError::Insufficient {
                        requested: from_amount,
                        available: deposit.amount_krw,
                    });
                }
                deposit.amount_krw -= from_amount;
                self.stocks.total_krw -= from_amount;
            }
            Currency::Usd => {
                let deposit = usd_deposit_mut(holdings)
                    .ok_or_else(|| LedgerError::NotFound(USD_DEPOSIT.to_string()))?;
                if deposit.amount_usd < from_amount {
                    return Err(LedgerError::Insufficient {
                        requested: from_amount,
                        available: deposit.amount_usd,
                    });
                }
                deposit.amount_usd -= from_amount;
                self.stocks.total_usd -= from_amount;
            }
        }
        match to {
            Currency::Krw => {
                if let Some(deposit) = krw_deposit_mut(holdings) {
                    deposit.amount_krw += to_amount;
                    self.stocks.total_krw += to_amount;
                }
            }
            Currency::Usd => {
                if let Some(deposit) = usd_deposit_mut(holdings) {
                    deposit.amount_usd += to_amount;
                    self.stocks.total_usd += to_amount;
                }
            }
        }
        debug!(account, %from, %to, from_amount, to_amount, "currency exchanged");
        Ok(())
    }

    /// Deletes a holding only while its quantity is exactly zero.
    pub fn stock_remove_zero(&mut self, account: &str, symbol: &str) -> LedgerResult<()> {
        let holdings = self
            .stocks
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::NotFound(format!("stock account {account}")))?;
        let index = holdings
            .iter()
            .position(|h| {
                h.as_stock()
                    .is_some_and(|s| s.symbol == symbol && s.quantity == 0.0)
            })
            .ok_or_else(|| LedgerError::NotFound(format!("zero-quantity holding {symbol}")))?;
        holdings.remove(index);
        debug!(account, symbol, "zero-quantity holding removed");
        Ok(())
    }
}
