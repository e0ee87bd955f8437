//! Member bootstrap from the customer data service.
//!
//! Fetch failures never propagate: a missing balance yields a zeroed member,
//! missing transactions an empty history.

use crate::analyzer::PurchaseAnalyzer;
use crate::tier::TierEngine;
use omnishop_core::loyalty::{CustomerBalance, Member, PurchasePatterns, Transaction};
use omnishop_core::LoyaltyError;
use tracing::{info, warn};

/// Source of raw customer records (typically a remote API client).
pub trait CustomerDataSource: Send + Sync {
    fn customer_balance(&self, customer_id: &str) -> anyhow::Result<CustomerBalance>;
    fn transactions(&self, customer_id: &str) -> anyhow::Result<Vec<Transaction>>;
}

/// A member assembled from upstream data, with the history it came from.
#[derive(Debug, Clone)]
pub struct MemberSession {
    pub member: Member,
    pub transactions: Vec<Transaction>,
    pub patterns: PurchasePatterns,
    /// Upstream failures that were recovered from with defaults.
    pub degraded: Vec<String>,
}

/// Transactions for `customer_id`, or an empty list if the fetch fails.
pub fn fetch_transactions(source: &dyn CustomerDataSource, customer_id: &str) -> Vec<Transaction> {
    fetch_or_degrade(source, customer_id, &mut Vec::new())
}

fn fetch_or_degrade(
    source: &dyn CustomerDataSource,
    customer_id: &str,
    degraded: &mut Vec<String>,
) -> Vec<Transaction> {
    match source.transactions(customer_id) {
        Ok(txs) => txs,
        Err(e) => {
            let err = LoyaltyError::DataUnavailable(format!("transactions: {e}"));
            warn!(customer_id, error = %err, "Falling back to empty history");
            degraded.push(err.to_string());
            Vec::new()
        }
    }
}

pub fn load_member(
    source: &dyn CustomerDataSource,
    customer_id: &str,
    analyzer: &PurchaseAnalyzer,
    tiers: &TierEngine,
) -> MemberSession {
    let mut degraded = Vec::new();
    let transactions = fetch_or_degrade(source, customer_id, &mut degraded);
    let patterns = analyzer.analyze(&transactions);

    let mut member = match source.customer_balance(customer_id) {
        Ok(balance) => Member {
            id: if balance.customer_id.is_empty() {
                customer_id.to_string()
            } else {
                balance.customer_id
            },
            name: balance.customer_name.unwrap_or_default(),
            member_since: balance
                .created_at
                .map(|c| c.get(..10).map(str::to_string).unwrap_or(c)),
            lifetime_points: patterns.total_points_earned,
            ..Member::new(customer_id, balance.points_balance)
        },
        Err(e) => {
            let err = LoyaltyError::DataUnavailable(format!("balance: {e}"));
            warn!(customer_id, error = %err, "Falling back to default member");
            degraded.push(err.to_string());
            Member::new(customer_id, 0)
        }
    };
    tiers.assign(&mut member, patterns.total_spent);

    info!(
        member_id = %member.id,
        tier = %member.tier,
        balance = member.points_balance,
        transactions = transactions.len(),
        degraded = !degraded.is_empty(),
        "Member loaded"
    );

    MemberSession {
        member,
        transactions,
        patterns,
        degraded,
    }
}
