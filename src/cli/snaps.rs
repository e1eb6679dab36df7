// src/cli/snaps.rs — Snap balance and transaction history

use crate::credits::{CreditLedger, SnapTransaction, TransactionKind};

pub fn show_snaps(ledger: &CreditLedger, history: usize) {
    println!("mirrors v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  Snaps left: {}", ledger.balance());

    let transactions = ledger.transactions();
    if transactions.is_empty() || history == 0 {
        return;
    }

    println!();
    println!("  Recent transactions:");
    let start = transactions.len().saturating_sub(history);
    for tx in &transactions[start..] {
        println!("    {}", format_transaction(tx));
    }
}

fn format_transaction(tx: &SnapTransaction) -> String {
    let kind = match tx.kind {
        TransactionKind::Init => "init",
        TransactionKind::Consumption => "used",
    };
    format!(
        "{}  {:<4}  {:+}",
        tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
        kind,
        tx.amount
    )
}
