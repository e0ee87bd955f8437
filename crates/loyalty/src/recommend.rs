//! Reward recommendation engine — ranks the catalog against a member's
//! balance and purchase patterns, with a reason for every bonus applied.
//!
//! Scoring bonuses (summed):
//! - +30 reward is within the points balance
//! - +25 reward category matches the member's favorite purchase category
//! - +15 cost under 1000, otherwise +10 cost under 2000
//! - +10 low stock
//!
//! `explain` is a separate member-facing rationale with its own value bands
//! (cost / 100 against 10 and 25); the two must not share constants.

use crate::analyzer::PurchaseAnalyzer;
use omnishop_core::config::RecommendationConfig;
use omnishop_core::loyalty::{
    AiPreferences, Member, PurchasePatterns, Recommendation, RewardCatalogItem, Transaction,
};
use tracing::debug;

const AFFORDABLE_BONUS: u32 = 30;
const CATEGORY_BONUS: u32 = 25;
const GREAT_VALUE_BONUS: u32 = 15;
const GOOD_VALUE_BONUS: u32 = 10;
const LOW_STOCK_BONUS: u32 = 10;

/// Cost bands for the ranking score, in points.
const GREAT_VALUE_MAX_COST: u64 = 1000;
const GOOD_VALUE_MAX_COST: u64 = 2000;

/// Value-score bands for `explain`, where value score = cost / 100.
const EXPLAIN_GREAT_VALUE_SCORE: f64 = 10.0;
const EXPLAIN_GOOD_VALUE_SCORE: f64 = 25.0;

/// Reward categories preferred by shoppers of a given purchase category.
pub fn preferred_reward_categories(purchase_category: &str) -> &'static [&'static str] {
    match purchase_category {
        "Electronics" => &["Merchandise", "Digital"],
        "Health" => &["Experiences", "Merchandise"],
        "Groceries" | "Food" => &["Gift Cards", "Discounts"],
        "Home" => &["Merchandise", "Gift Cards"],
        "Clothing" => &["Gift Cards", "Discounts"],
        _ => &["Gift Cards"],
    }
}

/// What the member is shown, depending on their AI preferences.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    Personalized {
        recommendations: Vec<Recommendation>,
        patterns: PurchasePatterns,
    },
    RuleBased(Vec<RewardCatalogItem>),
}

impl Suggestions {
    pub fn rewards(&self) -> Vec<&RewardCatalogItem> {
        match self {
            Suggestions::Personalized { recommendations, .. } => {
                recommendations.iter().map(|r| &r.reward).collect()
            }
            Suggestions::RuleBased(rewards) => rewards.iter().collect(),
        }
    }

    pub fn is_personalized(&self) -> bool {
        matches!(self, Suggestions::Personalized { .. })
    }
}

pub struct RecommendationEngine {
    analyzer: PurchaseAnalyzer,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(analyzer: PurchaseAnalyzer, config: &RecommendationConfig) -> Self {
        Self {
            analyzer,
            config: config.clone(),
        }
    }

    /// Rank the whole catalog and return the top entries with the purchase
    /// patterns they were derived from. Pure: identical input gives
    /// identical output, equal scores keep catalog order.
    pub fn recommend(
        &self,
        transactions: &[Transaction],
        catalog: &[RewardCatalogItem],
        points_balance: u64,
    ) -> (Vec<Recommendation>, PurchasePatterns) {
        let patterns = self.analyzer.analyze(transactions);
        let favorite = patterns
            .favorite_category
            .as_deref()
            .unwrap_or(self.config.fallback_category.as_str());
        let preferred = preferred_reward_categories(favorite);

        let mut scored: Vec<Recommendation> = catalog
            .iter()
            .map(|reward| self.score(reward, points_balance, favorite, preferred))
            .collect();

        // sort_by is stable; ties keep catalog order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.config.top_n);

        debug!(
            favorite = favorite,
            candidates = catalog.len(),
            returned = scored.len(),
            top_score = scored.first().map(|r| r.score).unwrap_or(0),
            "Recommendations ranked"
        );

        (scored, patterns)
    }

    /// Personalized ranking when the member allows it, otherwise the
    /// rule-based list. Purchase history is not read on the rule-based path.
    pub fn suggest(
        &self,
        prefs: &AiPreferences,
        transactions: &[Transaction],
        catalog: &[RewardCatalogItem],
        points_balance: u64,
    ) -> Suggestions {
        if prefs.personalized() {
            let (recommendations, patterns) = self.recommend(transactions, catalog, points_balance);
            Suggestions::Personalized {
                recommendations,
                patterns,
            }
        } else {
            debug!(
                ai_enabled = prefs.ai_enabled,
                personalization_enabled = prefs.personalization_enabled,
                "Personalization off, using rule-based picks"
            );
            Suggestions::RuleBased(self.rule_based(catalog, points_balance))
        }
    }

    /// Score a single reward. Reasons are listed in evaluation order.
    pub fn score(
        &self,
        reward: &RewardCatalogItem,
        points_balance: u64,
        favorite_category: &str,
        preferred: &[&str],
    ) -> Recommendation {
        let mut score = 0;
        let mut reasons = Vec::new();

        if reward.points_cost <= points_balance {
            score += AFFORDABLE_BONUS;
            reasons.push("Within your points balance".to_string());
        }

        if preferred.contains(&reward.category.as_str()) {
            score += CATEGORY_BONUS;
            reasons.push(format!(
                "Matches your {} shopping preference",
                favorite_category
            ));
        }

        if reward.points_cost < GREAT_VALUE_MAX_COST {
            score += GREAT_VALUE_BONUS;
            reasons.push("Great value redemption".to_string());
        } else if reward.points_cost < GOOD_VALUE_MAX_COST {
            score += GOOD_VALUE_BONUS;
            reasons.push("Good value for points".to_string());
        }

        if reward.stock < self.config.low_stock_threshold {
            score += LOW_STOCK_BONUS;
            reasons.push("Limited availability".to_string());
        }

        Recommendation {
            reward: reward.clone(),
            score,
            reasons,
        }
    }

    /// Member-facing rationale for one reward, independent of ranking.
    pub fn explain(&self, reward: &RewardCatalogItem, member: &Member) -> Vec<String> {
        let mut reasons = Vec::with_capacity(4);

        if member.points_balance >= reward.points_cost {
            reasons.push(format!(
                "You have enough points ({} pts)",
                group_thousands(member.points_balance)
            ));
        } else {
            reasons.push(format!(
                "Need {} more points",
                group_thousands(reward.points_cost - member.points_balance)
            ));
        }

        match reward.tier_exclusive {
            Some(required) if required == member.tier => {
                reasons.push(format!("Exclusive for your {} tier", member.tier));
            }
            Some(required) => reasons.push(format!("Requires {} tier", required)),
            None => reasons.push("Available to all members".to_string()),
        }

        let value_score = reward.points_cost as f64 / 100.0;
        if value_score < EXPLAIN_GREAT_VALUE_SCORE {
            reasons.push("Great value redemption".to_string());
        } else if value_score < EXPLAIN_GOOD_VALUE_SCORE {
            reasons.push("Good value for points".to_string());
        } else {
            reasons.push("Premium reward".to_string());
        }

        if reward.stock < self.config.low_stock_threshold {
            reasons.push("Popular - limited stock!".to_string());
        }

        reasons
    }

    /// Non-personalized fallback: the most expensive rewards the balance
    /// covers, cost descending.
    pub fn rule_based(
        &self,
        catalog: &[RewardCatalogItem],
        points_balance: u64,
    ) -> Vec<RewardCatalogItem> {
        let mut affordable: Vec<RewardCatalogItem> = catalog
            .iter()
            .filter(|r| r.points_cost <= points_balance)
            .cloned()
            .collect();
        affordable.sort_by(|a, b| b.points_cost.cmp(&a.points_cost));
        affordable.truncate(self.config.rule_based_n);
        affordable
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(PurchaseAnalyzer::default(), &RecommendationConfig::default())
    }
}

/// Format with comma thousands separators: 18574 -> "18,574".
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
