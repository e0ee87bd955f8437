use crate::error::{LoyaltyError, LoyaltyResult};
use serde::Deserialize;

/// Root loyalty configuration. Loaded from environment variables with the
/// prefix `OMNISHOP__`, e.g. `OMNISHOP__TIERS__SILVER_THRESHOLD=600`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltyConfig {
    #[serde(default)]
    pub tiers: TierConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub redemption: RedemptionPolicy,
    #[serde(default)]
    pub safety: SafetyConfig,
}

// ─── Tier Config ────────────────────────────────────────────────────────────

/// Cumulative-spend thresholds. Lower edges are inclusive.
#[derive(Debug, Clone, Deserialize)]
pub struct TierConfig {
    #[serde(default = "default_silver_threshold")]
    pub silver_threshold: f64,
    #[serde(default = "default_platinum_threshold")]
    pub platinum_threshold: f64,
}

fn default_silver_threshold() -> f64 {
    500.0
}
fn default_platinum_threshold() -> f64 {
    2000.0
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            silver_threshold: default_silver_threshold(),
            platinum_threshold: default_platinum_threshold(),
        }
    }
}

// ─── Recommendation Config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    /// Favorite category assumed when the member has no categorized purchases.
    #[serde(default = "default_fallback_category")]
    pub fallback_category: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Stock below this counts as limited availability.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default = "default_rule_based_n")]
    pub rule_based_n: usize,
}

fn default_fallback_category() -> String {
    "Electronics".to_string()
}
fn default_top_n() -> usize {
    5
}
fn default_low_stock_threshold() -> u32 {
    30
}
fn default_rule_based_n() -> usize {
    3
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            fallback_category: default_fallback_category(),
            top_n: default_top_n(),
            low_stock_threshold: default_low_stock_threshold(),
            rule_based_n: default_rule_based_n(),
        }
    }
}

// ─── Analytics Config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
    #[serde(default = "default_recent_items")]
    pub recent_items: usize,
}

fn default_top_categories() -> usize {
    5
}
fn default_recent_items() -> usize {
    10
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_categories: default_top_categories(),
            recent_items: default_recent_items(),
        }
    }
}

// ─── Redemption Policy ──────────────────────────────────────────────────────

/// Commit-time checks applied by the ledger. Disabling both reproduces the
/// legacy behavior where exclusivity and stock were display-only.
#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionPolicy {
    #[serde(default = "default_enforce")]
    pub enforce_tier_exclusivity: bool,
    #[serde(default = "default_enforce")]
    pub enforce_stock: bool,
}

fn default_enforce() -> bool {
    true
}

impl RedemptionPolicy {
    pub fn legacy() -> Self {
        Self {
            enforce_tier_exclusivity: false,
            enforce_stock: false,
        }
    }
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        Self {
            enforce_tier_exclusivity: default_enforce(),
            enforce_stock: default_enforce(),
        }
    }
}

// ─── Safety Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SafetyConfig {
    /// Lowercase fragments; any case-insensitive substring match blocks text.
    #[serde(default = "default_blocked_patterns")]
    pub blocked_patterns: Vec<String>,
}

fn default_blocked_patterns() -> Vec<String> {
    [
        "personal financial advice",
        "investment advice",
        "medical advice",
        "legal advice",
        "discriminat",
        "hate speech",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            blocked_patterns: default_blocked_patterns(),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            tiers: TierConfig::default(),
            recommendations: RecommendationConfig::default(),
            analytics: AnalyticsConfig::default(),
            redemption: RedemptionPolicy::default(),
            safety: SafetyConfig::default(),
        }
    }
}

impl LoyaltyConfig {
    /// Load configuration from environment variables.
    pub fn load() -> LoyaltyResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OMNISHOP")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("safety.blocked_patterns"),
        );

        let loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| LoyaltyError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the engines cannot work with.
    pub fn validate(&self) -> LoyaltyResult<()> {
        if !(self.tiers.silver_threshold < self.tiers.platinum_threshold) {
            return Err(LoyaltyError::Config(format!(
                "silver_threshold ({}) must be below platinum_threshold ({})",
                self.tiers.silver_threshold, self.tiers.platinum_threshold
            )));
        }
        if self.tiers.silver_threshold < 0.0 {
            return Err(LoyaltyError::Config("silver_threshold must not be negative".into()));
        }
        if self.recommendations.top_n == 0 {
            return Err(LoyaltyError::Config("recommendations.top_n must be positive".into()));
        }
        Ok(())
    }
}
