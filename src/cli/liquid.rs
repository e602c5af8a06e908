use anyhow::{bail, Context, Result};
use comfy_table::Cell;

use super::{require_name, require_non_negative, require_positive, ui, LiquidOp};
use crate::ledger::{Ledger, LiquidAccountKind};
use crate::store::LedgerStore;

const KINDS: [LiquidAccountKind; 3] = [
    LiquidAccountKind::Checking,
    LiquidAccountKind::Savings,
    LiquidAccountKind::Installment,
];

pub fn run(store: &LedgerStore, op: Option<LiquidOp>) -> Result<()> {
    let mut ledger = store.load()?;
    let Some(op) = op else {
        print_overview(&ledger);
        return Ok(());
    };

    match op {
        LiquidOp::Deposit { kind, name, amount } => {
            let name = require_name(&name)?;
            require_positive(amount)?;
            ledger
                .liquid_deposit(kind, name, amount)
                .with_context(|| format!("Deposit into [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Deposited {} to [{}].", ui::fmt_krw(amount), name);
        }
        LiquidOp::Withdraw { kind, name, amount } => {
            let name = require_name(&name)?;
            require_positive(amount)?;
            ledger
                .liquid_withdraw(kind, name, amount)
                .with_context(|| format!("Withdrawal from [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Withdrew {} from [{}].", ui::fmt_krw(amount), name);
        }
        LiquidOp::Transfer {
            from_kind,
            from_name,
            to_kind,
            to_name,
            amount,
        } => {
            let from_name = require_name(&from_name)?;
            let to_name = require_name(&to_name)?;
            require_positive(amount)?;
            if from_kind == to_kind && from_name == to_name {
                bail!("Cannot transfer to the same account");
            }
            ledger
                .liquid_transfer(from_kind, from_name, to_kind, to_name, amount)
                .with_context(|| format!("Transfer [{from_name}] → [{to_name}] failed"))?;
            store.save(&ledger)?;
            println!(
                "Transferred {} from [{}] to [{}].",
                ui::fmt_krw(amount),
                from_name,
                to_name
            );
        }
        LiquidOp::Add {
            kind,
            name,
            balance,
            tags,
        } => {
            let name = require_name(&name)?;
            require_non_negative(balance)?;
            let created = ledger.liquid_add_account(kind, name, balance, tags);
            store.save(&ledger)?;
            println!("New account [{}] added with {}.", created, ui::fmt_krw(balance));
        }
        LiquidOp::Delete { kind, name } => {
            let name = require_name(&name)?;
            ledger
                .liquid_delete_account(kind, name)
                .with_context(|| format!("Delete of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Account [{name}] has been deleted.");
        }
        LiquidOp::Adjust {
            kind,
            name,
            balance,
        } => {
            let name = require_name(&name)?;
            require_non_negative(balance)?;
            ledger
                .liquid_adjust_balance(kind, name, balance)
                .with_context(|| format!("Adjust of [{name}] failed"))?;
            store.save(&ledger)?;
            println!("Account [{}] balance set to {}.", name, ui::fmt_krw(balance));
        }
    }
    Ok(())
}

fn print_overview(ledger: &Ledger) {
    println!("{}\n", ui::style_text("Liquid Assets", ui::StyleType::Title));
    println!(
        "{}: {}",
        ui::style_text("Total Liquid", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::fmt_krw(ledger.liquid_assets.total_krw),
            ui::StyleType::TotalValue
        )
    );

    for kind in KINDS {
        let bucket = kind.bucket(&ledger.liquid_assets);
        println!("\n{} ({})", kind, ui::fmt_krw(bucket.total_krw));
        if bucket.details.is_empty() {
            println!("{}", ui::style_text("No accounts.", ui::StyleType::Subtle));
            continue;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Account"),
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
