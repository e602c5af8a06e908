use anyhow::{Context, Result};
use comfy_table::Cell;

use super::{require_name, require_non_negative, require_positive, ui, RdOp};
use crate::ledger::{Ledger, ReceivableKind};
use crate::store::LedgerStore;

const KINDS: [ReceivableKind; 2] = [ReceivableKind::Receivables, ReceivableKind::Deposits];

pub fn run(store: &LedgerStore, op: Option<RdOp>) -> Result<()> {
    let mut ledger = store.load()?;
    let Some(op) = op else {
        print_overview(&ledger);
        return Ok(());
    };

    match op {
        RdOp::LoanOut {
            kind,
            name,
            amount,
            tags,
        } => {
            let name = require_name(&name)?;
            require_positive(amount)?;
            let final_name = ledger.rd_loan_out(kind, name, amount, tags);
            store.save(&ledger)?;
            if final_name == name {
                println!("Loaned out {} to [{}].", ui::fmt_krw(amount), final_name);
            } else {
                println!(
                    "Created [{}] and loaned out {}.",
                    final_name,
                    ui::fmt_krw(amount)
                );
            }
        }
        RdOp::Repay { kind, name, amount } => {
            let name = require_name(&name)?;
            require_positive(amount)?;
            ledger
                .rd_repay(kind, name, amount)
                .with_context(|| format!("Repayment from [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Repaid {} from [{}].", ui::fmt_krw(amount), name);
        }
        RdOp::Settle { kind, name } => {
            let name = require_name(&name)?;
            ledger
                .rd_settle(kind, name)
                .with_context(|| format!("Settlement of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Settlement done. [{name}] removed.");
        }
        RdOp::Adjust {
            kind,
            name,
            balance,
        } => {
            let name = require_name(&name)?;
            require_non_negative(balance)?;
            ledger
                .rd_adjust(kind, name, balance)
                .with_context(|| format!("Adjust of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("[{}] balance set to {}.", name, ui::fmt_krw(balance));
        }
    }
    Ok(())
}

fn print_overview(ledger: &Ledger) {
    println!(
        "{}\n",
        ui::style_text("Receivables & Deposits", ui::StyleType::Title)
    );
    println!(
        "{}: {}",
        ui::style_text("Total", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::fmt_krw(ledger.receivables_and_deposits.total_krw),
            ui::StyleType::TotalValue
        )
    );

    for kind in KINDS {
        let bucket = kind.bucket(&ledger.receivables_and_deposits);
        println!("\n{} ({})", kind, ui::fmt_krw(bucket.total_krw));
        if bucket.details.is_empty() {
            println!("{}", ui::style_text("No entries.", ui::StyleType::Subtle));
            continue;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Counterparty"),
            ui::header_cell("Balance (KRW)"),
            ui::header_cell("Tags"),
        ]);
        for entry in &bucket.details {
            table.add_row(vec![
                Cell::new(&entry.name),
                ui::money_cell(&ui::fmt_krw(entry.amount_krw)),
                Cell::new(entry.tags.join(", ")),
            ]);
        }
        println!("{table}");
    }
}
