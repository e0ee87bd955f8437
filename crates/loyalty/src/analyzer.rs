//! Purchase analytics: category frequency, spend totals, favorite category.

use omnishop_core::config::AnalyticsConfig;
use omnishop_core::loyalty::{PurchasePatterns, Transaction};
use std::collections::HashMap;

/// Summarizes a purchase history. Stateless apart from its limits.
#[derive(Debug, Clone)]
pub struct PurchaseAnalyzer {
    top_categories: usize,
    recent_items: usize,
}

impl PurchaseAnalyzer {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            top_categories: config.top_categories,
            recent_items: config.recent_items,
        }
    }

    /// Aggregate a transaction list. Empty input yields empty patterns with
    /// no favorite category. Input order is preserved for `recent_items`.
    pub fn analyze(&self, transactions: &[Transaction]) -> PurchasePatterns {
        if transactions.is_empty() {
            return PurchasePatterns::default();
        }

        // Counts in first-seen order so the stable sort below breaks ties
        // by encounter.
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut total_spent = 0.0;
        let mut total_points_earned = 0u64;
        let mut recent_items = Vec::new();

        for tx in transactions {
            if let Some(category) = tx.category() {
                match position.get(category) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        position.insert(category, counts.len());
                        counts.push((category.to_string(), 1));
                    }
                }
            }
            if let Some(name) = tx.product_name() {
                if recent_items.len() < self.recent_items {
                    recent_items.push(name.to_string());
                }
            }
            total_spent += tx.amount_or_zero();
            total_points_earned = total_points_earned.saturating_add(tx.points_or_zero());
        }

        let category_counts = counts.iter().cloned().collect();

        let mut top_categories = counts;
        top_categories.sort_by(|a, b| b.1.cmp(&a.1));
        top_categories.truncate(self.top_categories);

        let favorite_category = top_categories.first().map(|(c, _)| c.clone());

        PurchasePatterns {
            category_counts,
            top_categories,
            total_transactions: transactions.len(),
            total_spent,
            total_points_earned,
            recent_items,
            favorite_category,
        }
    }
}

impl Default for PurchaseAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}
