use anyhow::{Context, Result};

use super::{require_name, ui, CryptoOp};
use crate::ledger::Ledger;
use crate::store::LedgerStore;

pub fn run(store: &LedgerStore, op: Option<CryptoOp>) -> Result<()> {
    let mut ledger = store.load()?;
    let Some(op) = op else {
        print_overview(&ledger);
        return Ok(());
    };

    match op {
        CryptoOp::AddExchange { name } => {
            let name = require_name(&name)?;
            ledger
                .crypto_add_exchange(name)
                .with_context(|| format!("Creation of exchange [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Exchange [{name}] created.");
        }
        CryptoOp::DeleteExchange { name } => {
            let name = require_name(&name)?;
            ledger
                .crypto_delete_exchange(name)
                .with_context(|| format!("Delete of exchange [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Exchange [{name}] has been deleted.");
        }
    }
    Ok(())
}

fn print_overview(ledger: &Ledger) {
    println!("{}\n", ui::style_text("Cryptocurrency", ui::StyleType::Title));
    println!(
        "{}: {}",
        ui::style_text("Total Crypto (USD)", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::fmt_usd(ledger.cryptocurrency.total_usd),
            ui::StyleType::TotalValue
        )
    );

    for (name, coins) in &ledger.cryptocurrency.exchanges {
        println!("\n{name}");
        if coins.is_empty() {
            println!("{}", ui::style_text("No coins recorded.", ui::StyleType::Subtle));
            continue;
        }
        for coin in coins {
            println!("  {coin}");
        }
    }

    if ledger.cryptocurrency.exchanges.is_empty() {
        println!("{}", ui::style_text("No exchanges.", ui::StyleType::Subtle));
    }
}
