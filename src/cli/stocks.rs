use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::warn;

use super::{require_name, require_non_negative_f64, require_positive_f64, ui, StockOp};
use crate::ledger::{Currency, Holding, Ledger};
use crate::store::LedgerStore;
use crate::valuation::{is_krx_ticker, Valuation};

pub async fn run(store: &LedgerStore, valuation: &Valuation<'_>, op: Option<StockOp>) -> Result<()> {
    let mut ledger = store.load()?;
    let Some(op) = op else {
        print_overview(&ledger, valuation).await;
        return Ok(());
    };

    match op {
        StockOp::Buy {
            account,
            symbol,
            quantity,
            price,
            ticker,
            currency,
            tags,
        } => {
            let account = require_name(&account)?;
            let symbol = require_name(&symbol)?;
            require_positive_f64(quantity)?;
            require_non_negative_f64(price)?;
            let tags = if tags.is_empty() {
                vec![crate::ledger::INVESTMENT_TAG.to_string()]
            } else {
                tags
            };
            ledger
                .stock_buy(account, symbol, ticker.trim(), currency, quantity, tags, price)
                .with_context(|| format!("Buy of [{symbol}] failed"))?;
            store.save(&ledger)?;
            println!(
                "Bought {} shares of [{}] in [{}]. Deposit updated.",
                ui::fmt_quantity(quantity),
                symbol,
                account
            );
        }
        StockOp::Sell {
            account,
            symbol,
            quantity,
            price,
        } => {
            let account = require_name(&account)?;
            let symbol = require_name(&symbol)?;
            require_positive_f64(quantity)?;
            require_non_negative_f64(price)?;
            ledger
                .stock_sell(account, symbol, quantity, price)
                .with_context(|| format!("Sell of [{symbol}] failed"))?;
            store.save(&ledger)?;
            println!(
                "Sold {} shares of [{}] in [{}]. Deposit updated.",
                ui::fmt_quantity(quantity),
                symbol,
                account
            );
        }
        StockOp::Deposit {
            account,
            currency,
            amount,
        } => {
            let account = require_name(&account)?;
            require_positive_f64(amount)?;
            ledger
                .stock_deposit(account, currency, amount)
                .with_context(|| format!("Deposit into [{account}] failed"))?;
            store.save(&ledger)?;
            println!("Deposited {} into [{account}].", fmt_cash(currency, amount));
        }
        StockOp::Withdraw {
            account,
            currency,
            amount,
        } => {
            let account = require_name(&account)?;
            require_positive_f64(amount)?;
            ledger
                .stock_withdraw(account, currency, amount)
                .with_context(|| format!("Withdrawal from [{account}] failed"))?;
            store.save(&ledger)?;
            println!("Withdrew {} from [{account}].", fmt_cash(currency, amount));
        }
        StockOp::Exchange {
            account,
            from,
            from_amount,
            to_amount,
        } => {
            let account = require_name(&account)?;
            require_positive_f64(from_amount)?;
            require_positive_f64(to_amount)?;
            let to = from.other();
            ledger
                .stock_exchange(account, from, to, from_amount, to_amount)
                .with_context(|| format!("Exchange in [{account}] failed"))?;
            store.save(&ledger)?;
            println!(
                "Exchanged {} to {} in [{account}].",
                fmt_cash(from, from_amount),
                fmt_cash(to, to_amount)
            );
        }
        StockOp::RemoveZero { account, symbol } => {
            let account = require_name(&account)?;
            let symbol = require_name(&symbol)?;
            ledger
                .stock_remove_zero(account, symbol)
                .with_context(|| format!("Removal of [{symbol}] failed"))?;
            store.save(&ledger)?;
            println!("Removed [{symbol}] which had 0 quantity.");
        }
        StockOp::AddAccount { name } => {
            let name = require_name(&name)?;
            ledger
                .stock_create_account(name)
                .with_context(|| format!("Creation of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Stock account [{name}] created.");
        }
        StockOp::DeleteAccount { name } => {
            let name = require_name(&name)?;
            let shares_remain = ledger.stocks.account(name).is_some_and(|holdings| {
                holdings
                    .iter()
                    .filter_map(Holding::as_stock)
                    .any(|s| s.quantity > 0.0)
            });
            if shares_remain {
                warn!(name, "Deleting account with live holdings; share value is not in the booked totals");
                println!(
                    "{}",
                    ui::style_text(
                        "Note: this account still holds shares; only its cash balances are backed out.",
                        ui::StyleType::Subtle
                    )
                );
            }
            ledger
                .stock_delete_account(name)
                .with_context(|| format!("Delete of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Stock account [{name}] has been deleted.");
        }
    }
    Ok(())
}

fn fmt_cash(currency: Currency, amount: f64) -> String {
    match currency {
        Currency::Krw => ui::fmt_krw_value(amount),
        Currency::Usd => ui::fmt_usd(amount),
    }
}

async fn print_overview(ledger: &Ledger, valuation: &Valuation<'_>) {
    println!("{}\n", ui::style_text("Stocks", ui::StyleType::Title));

    let pb = ui::new_spinner("Fetching market data...");
    let rate = valuation.usd_krw_rate().await;
    let (grand_krw, grand_usd) = valuation.stocks_totals(&ledger.stocks, rate).await;
    pb.finish_and_clear();

    println!(
        "{}: {} / {}",
        ui::style_text("Real-time Valuation", ui::StyleType::TotalLabel),
        ui::style_text(&ui::fmt_krw_value(grand_krw), ui::StyleType::TotalValue),
        ui::style_text(&ui::fmt_usd(grand_usd), ui::StyleType::TotalValue)
    );

    for (name, holdings) in &ledger.stocks.accounts {
        let (acc_krw, acc_usd) = valuation.account_totals(holdings, rate).await;
        println!(
            "\n{} ({} / {})",
            name,
            ui::fmt_krw_value(acc_krw),
            ui::fmt_usd(acc_usd)
        );

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Ticker"),
            ui::header_cell("Quantity"),
            ui::header_cell("Value (KRW)"),
            ui::header_cell("Value (USD)"),
            ui::header_cell("Tags"),
        ]);

        for holding in holdings {
            match holding {
                Holding::KrwDeposit(d) => {
                    table.add_row(vec![
                        Cell::new(&d.name),
                        Cell::new("(Deposit)"),
                        ui::money_cell(&ui::fmt_quantity(d.amount_krw)),
                        ui::money_cell(&ui::fmt_krw_value(d.amount_krw)),
                        ui::na_cell(),
                        Cell::new(d.tags.join(", ")),
                    ]);
                }
                Holding::UsdDeposit(d) => {
                    table.add_row(vec![
                        Cell::new(&d.name),
                        Cell::new("(Deposit)"),
                        ui::money_cell(&ui::fmt_quantity(d.amount_usd)),
                        ui::na_cell(),
                        ui::money_cell(&ui::fmt_usd(d.amount_usd)),
                        Cell::new(d.tags.join(", ")),
                    ]);
                }
                Holding::Stock(s) => {
                    let price = valuation.unit_price(&s.ticker).await;
                    let (krw_cell, usd_cell) = match s.currency {
                        Currency::Krw => {
                            let unit_krw = if is_krx_ticker(&s.ticker) {
                                price
                            } else {
                                price * rate
                            };
                            (
                                ui::money_cell(&ui::fmt_krw_value(unit_krw * s.quantity)),
                                ui::na_cell(),
                            )
                        }
                        Currency::Usd => (
                            ui::na_cell(),
                            ui::money_cell(&ui::fmt_usd(price * s.quantity)),
                        ),
                    };
                    table.add_row(vec![
                        Cell::new(&s.symbol),
                        Cell::new(&s.ticker),
                        ui::money_cell(&ui::fmt_quantity(s.quantity)),
                        krw_cell,
                        usd_cell,
                        Cell::new(s.tags.join(", ")),
                    ]);
                }
            }
        }
        println!("{table}");
    }

    if ledger.stocks.accounts.is_empty() {
        println!("{}", ui::style_text("No stock accounts.", ui::StyleType::Subtle));
    }
}
