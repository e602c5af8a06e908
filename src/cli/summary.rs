use anyhow::Result;
use comfy_table::Cell;
use console::style;

use super::ui;
use crate::store::LedgerStore;
use crate::summary::{compute_grand_total, NetWorthSummary};
use crate::valuation::Valuation;

pub async fn run(store: &LedgerStore, valuation: &Valuation<'_>) -> Result<()> {
    let ledger = store.load()?;

    let pb = ui::new_spinner("Fetching market data...");
    let summary = compute_grand_total(&ledger, valuation).await;
    pb.finish_and_clear();

    println!("{}", render(&summary));
    Ok(())
}

fn render(summary: &NetWorthSummary) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("My Assets", ui::StyleType::Title)
    );

    let combined_krw = ui::fmt_krw_value(summary.combined_total_krw);
    let combined = style(combined_krw.as_str())
        .bold()
        .green();
    output.push_str(&format!("Combined Total (KRW): {combined}\n"));
    output.push_str(&format!(
        "Total (KRW): {}  /  Total (USD): {}\n",
        ui::fmt_krw_value(summary.total_krw),
        ui::fmt_usd(summary.total_usd)
    ));
    output.push_str(&format!(
        "{}\n\n",
        ui::style_text(
            &format!("USD→KRW rate: {:.2}", summary.exchange_rate),
            ui::StyleType::Subtle
        )
    ));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("KRW"),
        ui::header_cell("USD"),
    ]);
    table.add_row(vec![
        Cell::new("Liquid Assets"),
        ui::money_cell(&ui::fmt_krw(summary.liquid_krw)),
        ui::na_cell(),
    ]);
    table.add_row(vec![
        Cell::new("Receivables & Deposits"),
        ui::money_cell(&ui::fmt_krw(summary.receivables_krw)),
        ui::na_cell(),
    ]);
    table.add_row(vec![
        Cell::new("Stocks"),
        ui::money_cell(&ui::fmt_krw_value(summary.stocks_krw)),
        ui::money_cell(&ui::fmt_usd(summary.stocks_usd)),
    ]);
    table.add_row(vec![
        Cell::new("Cryptocurrency"),
        ui::money_cell(&ui::fmt_krw_value(summary.crypto_krw)),
        ui::money_cell(&ui::fmt_usd(summary.crypto_usd)),
    ]);
    output.push_str(&table.to_string());

    output
}
