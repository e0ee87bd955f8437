//! Loyalty engine: builds every component from one `LoyaltyConfig` and
//! exposes the pure query operations in one place.

use crate::analyzer::PurchaseAnalyzer;
use crate::ledger::{LedgerRegistry, RedemptionGateway, StockBook};
use crate::member::{load_member, CustomerDataSource, MemberSession};
use crate::achievements::{badge_board, streak_progress, BadgeBoard, StreakProgress};
use crate::recommend::{RecommendationEngine, Suggestions};
use crate::safety::{SafetyFilter, SafetyVerdict};
use crate::tier::{TierEngine, TierProgress};
use omnishop_core::config::LoyaltyConfig;
use omnishop_core::event_bus::EventSink;
use omnishop_core::loyalty::{
    AiPreferences, Badge, Member, PurchasePatterns, Recommendation, RewardCatalogItem, Tier,
    Transaction,
};
use std::sync::Arc;
use tracing::info;

/// Stateless loyalty computations. Balance-changing work goes through the
/// ledgers handed out by [`LoyaltyEngine::ledgers`].
pub struct LoyaltyEngine {
    config: LoyaltyConfig,
    analyzer: PurchaseAnalyzer,
    tiers: TierEngine,
    recommender: RecommendationEngine,
    safety: SafetyFilter,
}

impl LoyaltyEngine {
    pub fn new(config: &LoyaltyConfig) -> Self {
        info!(
            top_n = config.recommendations.top_n,
            fallback_category = %config.recommendations.fallback_category,
            enforce_tier_exclusivity = config.redemption.enforce_tier_exclusivity,
            enforce_stock = config.redemption.enforce_stock,
            blocked_patterns = config.safety.blocked_patterns.len(),
            "Loyalty engine initialized"
        );
        let analyzer = PurchaseAnalyzer::new(&config.analytics);
        Self {
            config: config.clone(),
            recommender: RecommendationEngine::new(analyzer.clone(), &config.recommendations),
            analyzer,
            tiers: TierEngine::new(&config.tiers),
            safety: SafetyFilter::new(&config.safety),
        }
    }

    pub fn analyze(&self, transactions: &[Transaction]) -> PurchasePatterns {
        self.analyzer.analyze(transactions)
    }

    pub fn classify(&self, total_spend: f64) -> Tier {
        self.tiers.classify(total_spend)
    }

    pub fn progress(&self, member: &Member) -> TierProgress {
        self.tiers.progress(member)
    }

    pub fn recommend(
        &self,
        transactions: &[Transaction],
        catalog: &[RewardCatalogItem],
        points_balance: u64,
    ) -> (Vec<Recommendation>, PurchasePatterns) {
        self.recommender.recommend(transactions, catalog, points_balance)
    }

    /// Recommendations as the member's AI preferences allow.
    pub fn suggest(
        &self,
        prefs: &AiPreferences,
        transactions: &[Transaction],
        catalog: &[RewardCatalogItem],
        points_balance: u64,
    ) -> Suggestions {
        self.recommender.suggest(prefs, transactions, catalog, points_balance)
    }

    pub fn badges(&self, member: &Member, badges: &[Badge]) -> BadgeBoard {
        badge_board(member, badges)
    }

    pub fn streak(&self, member: &Member) -> StreakProgress {
        streak_progress(member.streak_days)
    }

    pub fn explain(&self, reward: &RewardCatalogItem, member: &Member) -> Vec<String> {
        self.recommender.explain(reward, member)
    }

    pub fn check(&self, text: &str) -> SafetyVerdict {
        self.safety.check(text)
    }

    /// Build a member from upstream data, tolerating fetch failures.
    pub fn load_member(&self, source: &dyn CustomerDataSource, customer_id: &str) -> MemberSession {
        load_member(source, customer_id, &self.analyzer, &self.tiers)
    }

    /// A ledger registry wired with this engine's redemption policy and a
    /// stock book seeded from `catalog`.
    pub fn ledgers(
        &self,
        catalog: &[RewardCatalogItem],
        gateway: Arc<dyn RedemptionGateway>,
        events: Arc<dyn EventSink>,
    ) -> LedgerRegistry {
        LedgerRegistry::new(
            self.config.redemption.clone(),
            Arc::new(StockBook::from_catalog(catalog)),
            gateway,
            events,
        )
    }

    pub fn tiers(&self) -> &TierEngine {
        &self.tiers
    }

    pub fn recommender(&self) -> &RecommendationEngine {
        &self.recommender
    }

    pub fn safety(&self) -> &SafetyFilter {
        &self.safety
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }
}

impl Default for LoyaltyEngine {
    fn default() -> Self {
        Self::new(&LoyaltyConfig::default())
    }
}
