//! Loyalty program domain types: tiers, purchase records, reward catalog,
//! recommendations and the redemption ledger's records.
//!
//! Three-tier structure keyed on cumulative spend: Gold → Silver → Platinum.
//! Gold is the entry level; Platinum is the top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ─── Tier System ────────────────────────────────────────────────────────────

/// Membership tiers, ordered from entry level to top.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Entry-level. 1.0x earn rate. Spend in [0, 500).
    Gold,
    /// Spend in [500, 2000). 1.25x earn rate.
    Silver,
    /// Spend of 2000 and above. 1.5x earn rate.
    Platinum,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Gold, Tier::Silver, Tier::Platinum];

    /// Points earning multiplier for this tier.
    pub fn earning_rate(&self) -> f64 {
        match self {
            Tier::Gold => 1.0,
            Tier::Silver => 1.25,
            Tier::Platinum => 1.5,
        }
    }

    /// Default cumulative spend required to enter this tier.
    pub fn min_spend(&self) -> f64 {
        match self {
            Tier::Gold => 0.0,
            Tier::Silver => 500.0,
            Tier::Platinum => 2000.0,
        }
    }

    pub fn benefits(&self) -> &'static [&'static str] {
        match self {
            Tier::Gold => &[
                "Birthday rewards",
                "Early access to sales (24h)",
                "Standard returns (30 days)",
                "Member-only promotions",
            ],
            Tier::Silver => &[
                "All Gold benefits",
                "Free standard shipping",
                "Priority customer service",
                "Extended returns (60 days)",
                "Quarterly bonus points",
            ],
            Tier::Platinum => &[
                "All Silver benefits",
                "Free express shipping",
                "Dedicated concierge",
                "Exclusive events",
                "Personal shopper access",
                "Monthly bonus points",
            ],
        }
    }

    /// The tier above this one, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Gold => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Platinum),
            Tier::Platinum => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Gold => "Gold",
            Tier::Silver => "Silver",
            Tier::Platinum => "Platinum",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Gold
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a tier for display.
#[derive(Debug, Clone, Serialize)]
pub struct TierInfo {
    pub tier: Tier,
    pub earning_rate: f64,
    pub min_spend: f64,
    pub benefits: Vec<String>,
}

impl From<Tier> for TierInfo {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            earning_rate: tier.earning_rate(),
            min_spend: tier.min_spend(),
            benefits: tier.benefits().iter().map(|b| b.to_string()).collect(),
        }
    }
}

// ─── Purchases ──────────────────────────────────────────────────────────────

/// A purchase record as delivered by the order system. Every field may be
/// missing upstream; accessors coerce missing amounts to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub purchase_amount: Option<f64>,
    #[serde(default)]
    pub points: Option<u64>,
}

impl Transaction {
    pub fn new(
        product_name: impl Into<String>,
        category: impl Into<String>,
        purchase_amount: f64,
        points: u64,
    ) -> Self {
        Self {
            timestamp: None,
            product_name: Some(product_name.into()),
            category: Some(category.into()),
            purchase_amount: Some(purchase_amount),
            points: Some(points),
        }
    }

    pub fn at(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Purchase amount, with missing or negative values treated as 0.
    pub fn amount_or_zero(&self) -> f64 {
        self.purchase_amount
            .filter(|a| a.is_finite())
            .unwrap_or(0.0)
            .max(0.0)
    }

    pub fn points_or_zero(&self) -> u64 {
        self.points.unwrap_or(0)
    }

    /// Category, ignoring blank strings.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref().filter(|p| !p.is_empty())
    }

    /// Calendar date portion (`YYYY-MM-DD`) of the timestamp.
    pub fn date(&self) -> Option<&str> {
        self.timestamp.as_deref().map(|t| t.get(..10).unwrap_or(t))
    }
}

/// Aggregate view of a purchase history. Recomputed on demand, never stored.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PurchasePatterns {
    pub category_counts: HashMap<String, usize>,
    /// Highest-count categories, count descending, first-seen order on ties.
    pub top_categories: Vec<(String, usize)>,
    pub total_transactions: usize,
    pub total_spent: f64,
    pub total_points_earned: u64,
    pub recent_items: Vec<String>,
    pub favorite_category: Option<String>,
}

// ─── Members ────────────────────────────────────────────────────────────────

/// Reference to a redeemed reward kept on the member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardRef {
    pub id: u32,
    pub name: String,
    pub points_cost: u64,
}

impl From<&RewardCatalogItem> for RewardRef {
    fn from(item: &RewardCatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            points_cost: item.points_cost,
        }
    }
}

/// A loyalty member. `tier`/`annual_spend` change only through the tier
/// engine; `points_balance`/`redeemed_rewards` only through the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub points_balance: u64,
    pub lifetime_points: u64,
    pub annual_spend: f64,
    pub member_since: Option<String>,
    pub redeemed_rewards: Vec<RewardRef>,
    /// Names of earned badges, in the order they were earned.
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub streak_days: u32,
}

impl Member {
    pub fn new(id: impl Into<String>, points_balance: u64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            tier: Tier::Gold,
            points_balance,
            lifetime_points: 0,
            annual_spend: 0.0,
            member_since: None,
            redeemed_rewards: Vec::new(),
            badges: Vec::new(),
            streak_days: 0,
        }
    }
}

/// Balance record returned by the customer data service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBalance {
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub points_balance: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ─── Rewards ────────────────────────────────────────────────────────────────

/// A redeemable reward. Static reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardCatalogItem {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub points_cost: u64,
    pub dollar_value: f64,
    #[serde(default)]
    pub tier_exclusive: Option<Tier>,
    pub stock: u32,
    #[serde(default)]
    pub limited: bool,
}

impl RewardCatalogItem {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        category: impl Into<String>,
        points_cost: u64,
        dollar_value: f64,
        stock: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            points_cost,
            dollar_value,
            tier_exclusive: None,
            stock,
            limited: false,
        }
    }

    pub fn exclusive_to(mut self, tier: Tier) -> Self {
        self.tier_exclusive = Some(tier);
        self
    }

    pub fn limited(mut self) -> Self {
        self.limited = true;
        self
    }

    /// Whether a member of `tier` may redeem this reward. Exclusivity is a
    /// floor: a Platinum member satisfies a Silver-exclusive reward.
    pub fn available_to(&self, tier: Tier) -> bool {
        self.tier_exclusive.map_or(true, |required| tier >= required)
    }
}

/// A scored catalog item with the reasons behind its score.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub reward: RewardCatalogItem,
    pub score: u32,
    pub reasons: Vec<String>,
}

// ─── Ledger ─────────────────────────────────────────────────────────────────

/// One committed redemption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedemptionRecord {
    pub reward_id: u32,
    pub reward_name: String,
    pub points_spent: u64,
    pub dollar_value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Running totals over the redemption history.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct LedgerStats {
    pub total_redemptions: usize,
    pub total_points_redeemed: u64,
    pub total_value_redeemed: f64,
}

impl LedgerStats {
    pub fn from_history(history: &[RedemptionRecord]) -> Self {
        history.iter().fold(Self::default(), |mut acc, r| {
            acc.record(r);
            acc
        })
    }

    pub fn record(&mut self, record: &RedemptionRecord) {
        self.total_redemptions += 1;
        self.total_points_redeemed += record.points_spent;
        self.total_value_redeemed += record.dollar_value;
    }
}

/// Payload sent to the remote redemption service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub customer_id: String,
    pub reward_name: String,
    pub points_redeemed: u64,
    pub category: String,
    pub reward_value: f64,
    pub redeemed_at: DateTime<Utc>,
}

// ─── Achievements ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Member-controlled switches for the assistant and personalized ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AiPreferences {
    #[serde(default = "enabled")]
    pub ai_enabled: bool,
    #[serde(default = "enabled")]
    pub personalization_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Default for AiPreferences {
    fn default() -> Self {
        Self {
            ai_enabled: true,
            personalization_enabled: true,
        }
    }
}

impl AiPreferences {
    /// Personalized ranking needs both switches on.
    pub fn personalized(&self) -> bool {
        self.ai_enabled && self.personalization_enabled
    }
}

// ─── Challenges ─────────────────────────────────────────────────────────────

/// A bonus-points quest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub bonus_points: u64,
    pub progress: u32,
    pub target: u32,
    pub ends: String,
}

impl Challenge {
    /// Completion percentage; a zero target counts as complete.
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 100.0;
        }
        (self.progress as f64 / self.target as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Gold < Tier::Silver);
        assert!(Tier::Silver < Tier::Platinum);
        assert_eq!(Tier::Gold.next(), Some(Tier::Silver));
        assert_eq!(Tier::Platinum.next(), None);
    }

    #[test]
    fn test_tier_info() {
        let info = TierInfo::from(Tier::Silver);
        assert_eq!(info.earning_rate, 1.25);
        assert_eq!(info.min_spend, 500.0);
        assert_eq!(info.benefits[0], "All Gold benefits");
    }

    #[test]
    fn test_transaction_deserialize_missing_fields() {
        let tx: Transaction =
            serde_json::from_str(r#"{"productName":"Kettle","purchaseAmount":null}"#).unwrap();
        assert_eq!(tx.product_name(), Some("Kettle"));
        assert_eq!(tx.category(), None);
        assert_eq!(tx.amount_or_zero(), 0.0);
        assert_eq!(tx.points_or_zero(), 0);
    }

    #[test]
    fn test_transaction_date() {
        let tx = Transaction::new("Kettle", "Home", 20.0, 20).at("2026-01-13T10:22:00");
        assert_eq!(tx.date(), Some("2026-01-13"));
    }

    #[test]
    fn test_available_to() {
        let item = RewardCatalogItem::new(1, "VIP", "Experiences", 3500, 150.0, 10)
            .exclusive_to(Tier::Silver);
        assert!(!item.available_to(Tier::Gold));
        assert!(item.available_to(Tier::Silver));
        assert!(item.available_to(Tier::Platinum));
    }

    #[test]
    fn test_member_deserialize_without_achievements() {
        let m: Member = serde_json::from_str(
            r#"{"id":"CUST001","name":"Alex D.","tier":"Silver","points_balance":18574,
                "lifetime_points":19222,"annual_spend":1531.58,"member_since":null,
                "redeemed_rewards":[]}"#,
        )
        .unwrap();
        assert!(m.badges.is_empty());
        assert_eq!(m.streak_days, 0);
    }

    #[test]
    fn test_ai_preferences() {
        assert!(AiPreferences::default().personalized());
        let prefs: AiPreferences = serde_json::from_str(r#"{"ai_enabled":false}"#).unwrap();
        assert!(prefs.personalization_enabled);
        assert!(!prefs.personalized());
    }

    #[test]
    fn test_challenge_percent() {
        let c = Challenge {
            id: 1,
            name: "Review Champion".into(),
            description: "Write 5 product reviews".into(),
            bonus_points: 300,
            progress: 3,
            target: 5,
            ends: "7 days".into(),
        };
        assert_eq!(c.percent(), 60.0);
        assert!(!c.is_complete());
    }
}
