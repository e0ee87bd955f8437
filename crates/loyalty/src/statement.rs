//! Points statement: purchase history with a running balance reconstructed
//! backwards from the current balance.

use omnishop_core::loyalty::Transaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub points: u64,
    /// Balance right after this transaction. Signed because upstream history
    /// may not fully account for the current balance.
    pub balance_after: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementOrder {
    #[default]
    NewestFirst,
    OldestFirst,
    HighestPoints,
    HighestAmount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementQuery {
    pub category: Option<String>,
    pub order: StatementOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSummary {
    pub total_transactions: usize,
    pub points_earned: u64,
    pub total_spent: f64,
    pub current_balance: u64,
}

/// Build statement lines in input (chronological) order. The last line's
/// `balance_after` equals `current_balance`.
pub fn statement(transactions: &[Transaction], current_balance: u64) -> Vec<StatementLine> {
    let mut running = i64::try_from(current_balance).unwrap_or(i64::MAX);
    let mut lines: Vec<StatementLine> = transactions
        .iter()
        .rev()
        .map(|tx| {
            let points = tx.points_or_zero();
            let line = StatementLine {
                date: tx.date().unwrap_or("N/A").to_string(),
                description: tx.product_name().unwrap_or("Purchase").to_string(),
                category: tx.category().unwrap_or("Other").to_string(),
                amount: tx.amount_or_zero(),
                points,
                balance_after: running,
            };
            running = running.saturating_sub(i64::try_from(points).unwrap_or(i64::MAX));
            line
        })
        .collect();
    lines.reverse();
    lines
}

pub fn summarize(lines: &[StatementLine], current_balance: u64) -> StatementSummary {
    StatementSummary {
        total_transactions: lines.len(),
        points_earned: lines.iter().map(|l| l.points).sum(),
        total_spent: lines.iter().map(|l| l.amount).sum(),
        current_balance,
    }
}

/// Filter and order chronological statement lines.
pub fn query_statement(lines: &[StatementLine], query: &StatementQuery) -> Vec<StatementLine> {
    let mut out: Vec<StatementLine> = lines
        .iter()
        .filter(|l| query.category.as_deref().map_or(true, |c| l.category == c))
        .cloned()
        .collect();

    match query.order {
        StatementOrder::OldestFirst => {}
        StatementOrder::NewestFirst => out.reverse(),
        StatementOrder::HighestPoints => out.sort_by(|a, b| b.points.cmp(&a.points)),
        StatementOrder::HighestAmount => out.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
    }
    out
}

/// Distinct categories in first-seen order.
pub fn categories(lines: &[StatementLine]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for line in lines {
        if !seen.contains(&line.category) {
            seen.push(line.category.clone());
        }
    }
    seen
}
