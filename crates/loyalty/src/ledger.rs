//! Redemption ledger: the single authority over a member's points balance.
//!
//! Each member has one `RedemptionLedger`; every balance change goes through
//! its lock, so two redemptions for the same member can never both pass the
//! balance check against the same pre-mutation balance. The remote write to
//! the redemption service happens inside the same critical section, before
//! anything is committed locally.

use chrono::Utc;
use dashmap::DashMap;
use omnishop_core::config::RedemptionPolicy;
use omnishop_core::event_bus::{make_event, noop_sink, EventSink};
use omnishop_core::loyalty::{
    Challenge, LedgerStats, Member, RedemptionRecord, RedemptionRequest, RewardCatalogItem,
    RewardRef,
};
use omnishop_core::types::EventType;
use omnishop_core::{LoyaltyError, LoyaltyResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::tier::TierEngine;

// ─── Remote persistence ─────────────────────────────────────────────────────

/// Remote redemption service. A returned error means the redemption was not
/// persisted and must not be committed locally.
pub trait RedemptionGateway: Send + Sync {
    fn post_redemption(&self, request: &RedemptionRequest) -> anyhow::Result<()>;
}

/// Gateway for deployments without a remote redemption service.
pub struct LocalOnly;

impl RedemptionGateway for LocalOnly {
    fn post_redemption(&self, _request: &RedemptionRequest) -> anyhow::Result<()> {
        Ok(())
    }
}

// ─── Stock ──────────────────────────────────────────────────────────────────

/// Live stock levels shared by every ledger. Rewards not yet tracked are
/// seeded from their catalog stock on first reservation.
#[derive(Default)]
pub struct StockBook {
    levels: DashMap<u32, u32>,
}

impl StockBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: &[RewardCatalogItem]) -> Self {
        let levels = DashMap::new();
        for item in catalog {
            levels.insert(item.id, item.stock);
        }
        Self { levels }
    }

    pub fn level(&self, reward_id: u32) -> Option<u32> {
        self.levels.get(&reward_id).map(|l| *l)
    }

    /// Take one unit. The shard lock makes check-and-decrement atomic.
    fn reserve(&self, reward: &RewardCatalogItem) -> LoyaltyResult<()> {
        let mut level = self.levels.entry(reward.id).or_insert(reward.stock);
        if *level == 0 {
            return Err(LoyaltyError::OutOfStock {
                reward: reward.name.clone(),
            });
        }
        *level -= 1;
        Ok(())
    }

    fn release(&self, reward_id: u32) {
        if let Some(mut level) = self.levels.get_mut(&reward_id) {
            *level += 1;
        }
    }
}

// ─── Ledger ─────────────────────────────────────────────────────────────────

struct LedgerState {
    member: Member,
    history: Vec<RedemptionRecord>,
    claimed_challenges: HashSet<u32>,
}

pub struct RedemptionLedger {
    state: Mutex<LedgerState>,
    policy: RedemptionPolicy,
    stock: Arc<StockBook>,
    gateway: Arc<dyn RedemptionGateway>,
    events: Arc<dyn EventSink>,
}

impl RedemptionLedger {
    /// A ledger with strict policy, its own stock book, no remote write and
    /// no event consumer. Use the `with_*` builders to wire collaborators.
    pub fn new(member: Member) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                member,
                history: Vec::new(),
                claimed_challenges: HashSet::new(),
            }),
            policy: RedemptionPolicy::default(),
            stock: Arc::new(StockBook::new()),
            gateway: Arc::new(LocalOnly),
            events: noop_sink(),
        }
    }

    pub fn with_policy(mut self, policy: RedemptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_stock(mut self, stock: Arc<StockBook>) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn RedemptionGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Redeem `reward` against the member's balance.
    ///
    /// Checks, in order: balance, tier exclusivity, stock (the last two per
    /// policy). Then posts to the gateway and, only if that succeeds, deducts
    /// the cost and appends to history. Any failure leaves the balance,
    /// redeemed rewards, history and stock unchanged.
    pub fn redeem(&self, reward: &RewardCatalogItem) -> LoyaltyResult<RedemptionRecord> {
        let mut state = self.state.lock();
        let member_id = state.member.id.clone();

        match self.try_redeem(&mut state, reward) {
            Ok(record) => {
                metrics::counter!("loyalty.redemptions").increment(1);
                metrics::counter!("loyalty.points_redeemed").increment(record.points_spent);
                info!(
                    member_id = %member_id,
                    reward_id = reward.id,
                    cost = record.points_spent,
                    new_balance = state.member.points_balance,
                    "Points redeemed"
                );
                self.events.emit(
                    make_event(EventType::PointsRedeemed, member_id)
                        .with_reward(reward.id)
                        .with_points(record.points_spent)
                        .with_value(record.dollar_value),
                );
                Ok(record)
            }
            Err(e) => {
                metrics::counter!("loyalty.redemption_failures", "reason" => e.kind())
                    .increment(1);
                warn!(
                    member_id = %member_id,
                    reward_id = reward.id,
                    error = %e,
                    "Redemption rejected"
                );
                let event_type = match e {
                    LoyaltyError::RemoteWriteFailed(_) => EventType::RedemptionRolledBack,
                    _ => EventType::RedemptionRejected,
                };
                self.events.emit(
                    make_event(event_type, member_id)
                        .with_reward(reward.id)
                        .with_points(reward.points_cost)
                        .with_detail(e.kind()),
                );
                Err(e)
            }
        }
    }

    /// Look up `reward_id` in `catalog` and redeem it.
    pub fn redeem_id(
        &self,
        catalog: &[RewardCatalogItem],
        reward_id: u32,
    ) -> LoyaltyResult<RedemptionRecord> {
        let reward = catalog
            .iter()
            .find(|r| r.id == reward_id)
            .ok_or(LoyaltyError::UnknownReward(reward_id))?;
        self.redeem(reward)
    }

    fn try_redeem(
        &self,
        state: &mut LedgerState,
        reward: &RewardCatalogItem,
    ) -> LoyaltyResult<RedemptionRecord> {
        let available = state.member.points_balance;
        if reward.points_cost > available {
            return Err(LoyaltyError::InsufficientPoints {
                required: reward.points_cost,
                available,
                shortfall: reward.points_cost - available,
            });
        }

        if self.policy.enforce_tier_exclusivity && !reward.available_to(state.member.tier) {
            if let Some(required) = reward.tier_exclusive {
                return Err(LoyaltyError::TierRestricted {
                    required,
                    actual: state.member.tier,
                });
            }
        }

        if self.policy.enforce_stock {
            self.stock.reserve(reward)?;
        }

        let now = Utc::now();
        let request = RedemptionRequest {
            customer_id: state.member.id.clone(),
            reward_name: reward.name.clone(),
            points_redeemed: reward.points_cost,
            category: reward.category.clone(),
            reward_value: reward.dollar_value,
            redeemed_at: now,
        };

        if let Err(e) = self.gateway.post_redemption(&request) {
            if self.policy.enforce_stock {
                self.stock.release(reward.id);
            }
            return Err(LoyaltyError::RemoteWriteFailed(e.to_string()));
        }

        // Commit. Balance was checked above under the same lock.
        state.member.points_balance = available - reward.points_cost;
        state.member.redeemed_rewards.push(RewardRef::from(reward));

        let record = RedemptionRecord {
            reward_id: reward.id,
            reward_name: reward.name.clone(),
            points_spent: reward.points_cost,
            dollar_value: reward.dollar_value,
            timestamp: now,
        };
        state.history.push(record.clone());
        Ok(record)
    }

    /// Credit the bonus for a completed challenge. Each challenge pays out
    /// once per ledger. Returns the new balance.
    pub fn claim_challenge(&self, challenge: &Challenge) -> LoyaltyResult<u64> {
        let mut state = self.state.lock();

        if !challenge.is_complete() {
            return Err(LoyaltyError::ChallengeIncomplete {
                challenge: challenge.name.clone(),
                progress: challenge.progress,
                target: challenge.target,
            });
        }
        if !state.claimed_challenges.insert(challenge.id) {
            return Err(LoyaltyError::ChallengeAlreadyClaimed(challenge.id));
        }

        let member = &mut state.member;
        member.points_balance = member.points_balance.saturating_add(challenge.bonus_points);
        member.lifetime_points = member.lifetime_points.saturating_add(challenge.bonus_points);

        metrics::counter!("loyalty.points_credited").increment(challenge.bonus_points);
        debug!(
            member_id = %member.id,
            challenge = %challenge.name,
            bonus = challenge.bonus_points,
            balance = member.points_balance,
            "Challenge claimed"
        );
        self.events.emit(
            make_event(EventType::PointsCredited, member.id.clone())
                .with_points(challenge.bonus_points)
                .with_detail(challenge.name.clone()),
        );

        Ok(member.points_balance)
    }

    /// Reclassify the member from new cumulative spend. Returns true if the
    /// tier changed.
    pub fn update_tier(&self, tiers: &TierEngine, total_spend: f64) -> bool {
        let mut state = self.state.lock();
        let old_tier = state.member.tier;
        let changed = tiers.apply(&mut state.member, total_spend);
        if changed {
            self.events.emit(
                make_event(EventType::TierChanged, state.member.id.clone())
                    .with_detail(format!("{} -> {}", old_tier, state.member.tier)),
            );
        }
        changed
    }

    /// Snapshot of the member.
    pub fn member(&self) -> Member {
        self.state.lock().member.clone()
    }

    pub fn balance(&self) -> u64 {
        self.state.lock().member.points_balance
    }

    pub fn history(&self) -> Vec<RedemptionRecord> {
        self.state.lock().history.clone()
    }

    /// Aggregates, always derived from history.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats::from_history(&self.state.lock().history)
    }

    pub fn policy(&self) -> &RedemptionPolicy {
        &self.policy
    }
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// Hands out one ledger per member id, all sharing stock, gateway and sink.
pub struct LedgerRegistry {
    ledgers: DashMap<String, Arc<RedemptionLedger>>,
    policy: RedemptionPolicy,
    stock: Arc<StockBook>,
    gateway: Arc<dyn RedemptionGateway>,
    events: Arc<dyn EventSink>,
}

impl LedgerRegistry {
    pub fn new(
        policy: RedemptionPolicy,
        stock: Arc<StockBook>,
        gateway: Arc<dyn RedemptionGateway>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ledgers: DashMap::new(),
            policy,
            stock,
            gateway,
            events,
        }
    }

    /// Ledger for `member.id`, created from `member` if none exists yet.
    /// An existing ledger is returned as-is and `member` is ignored.
    pub fn open(&self, member: Member) -> Arc<RedemptionLedger> {
        self.ledgers
            .entry(member.id.clone())
            .or_insert_with(|| {
                Arc::new(
                    RedemptionLedger::new(member)
                        .with_policy(self.policy.clone())
                        .with_stock(self.stock.clone())
                        .with_gateway(self.gateway.clone())
                        .with_events(self.events.clone()),
                )
            })
            .clone()
    }

    pub fn get(&self, member_id: &str) -> Option<Arc<RedemptionLedger>> {
        self.ledgers.get(member_id).map(|l| l.clone())
    }

    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    pub fn stock(&self) -> &Arc<StockBook> {
        &self.stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnishop_core::catalog::{default_catalog, default_challenges};
    use omnishop_core::event_bus::capture_sink;
    use omnishop_core::loyalty::Tier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingGateway;

    impl RedemptionGateway for FailingGateway {
        fn post_redemption(&self, _request: &RedemptionRequest) -> anyhow::Result<()> {
            anyhow::bail!("API returned status 503")
        }
    }

    #[derive(Default)]
    struct CountingGateway {
        calls: AtomicUsize,
    }

    impl RedemptionGateway for CountingGateway {
        fn post_redemption(&self, _request: &RedemptionRequest) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn reward(id: u32, cost: u64, stock: u32) -> RewardCatalogItem {
        RewardCatalogItem::new(
            id,
            format!("reward-{id}"),
            "Gift Cards",
            cost,
            cost as f64 / 50.0,
            stock,
        )
    }

    #[test]
    fn test_redeem_exact_balance_then_insufficient() {
        let ledger = RedemptionLedger::new(Member::new("CUST001", 1800));

        let record = ledger.redeem(&reward(1, 1800, 100)).unwrap();
        assert_eq!(record.points_spent, 1800);
        assert_eq!(ledger.balance(), 0);
        assert_eq!(ledger.history().len(), 1);

        let err = ledger.redeem(&reward(2, 300, 100)).unwrap_err();
        match err {
            LoyaltyError::InsufficientPoints { shortfall, .. } => assert_eq!(shortfall, 300),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_redeem_is_noop() {
        let sink = capture_sink();
        let ledger = RedemptionLedger::new(Member::new("CUST001", 100)).with_events(sink.clone());
        let before = ledger.member();

        assert!(ledger.redeem(&reward(1, 500, 100)).is_err());

        assert_eq!(ledger.member(), before);
        assert!(ledger.history().is_empty());
        assert_eq!(sink.count_type(EventType::RedemptionRejected), 1);
    }

    #[test]
    fn test_balance_and_aggregates_track_history() {
        let ledger = RedemptionLedger::new(Member::new("CUST001", 5000));
        let costs = [1200, 800, 4000, 600, 300, 1000];
        let mut spent = 0;
        for (i, cost) in costs.iter().enumerate() {
            if ledger.redeem(&reward(i as u32, *cost, 100)).is_ok() {
                spent += cost;
            }
        }
        assert_eq!(ledger.balance(), 5000 - spent);

        let history = ledger.history();
        let stats = ledger.stats();
        assert_eq!(stats.total_redemptions, history.len());
        assert_eq!(
            stats.total_points_redeemed,
            history.iter().map(|r| r.points_spent).sum::<u64>()
        );
        assert_eq!(ledger.member().redeemed_rewards.len(), history.len());
    }

    #[test]
    fn test_remote_failure_rolls_back() {
        let sink = capture_sink();
        let stock = Arc::new(StockBook::from_catalog(&default_catalog()));
        let ledger = RedemptionLedger::new(Member::new("CUST001", 1000))
            .with_gateway(Arc::new(FailingGateway))
            .with_stock(stock.clone())
            .with_events(sink.clone());
        let catalog = default_catalog();
        let band = &catalog[5];

        let err = ledger.redeem(band).unwrap_err();
        assert!(matches!(err, LoyaltyError::RemoteWriteFailed(_)));
        assert_eq!(ledger.balance(), 1000);
        assert!(ledger.history().is_empty());
        assert_eq!(stock.level(band.id), Some(band.stock));
        assert_eq!(sink.count_type(EventType::RedemptionRolledBack), 1);
    }

    #[test]
    fn test_gateway_called_once_per_success() {
        let gateway = Arc::new(CountingGateway::default());
        let ledger =
            RedemptionLedger::new(Member::new("CUST001", 1000)).with_gateway(gateway.clone());
        ledger.redeem(&reward(1, 600, 10)).unwrap();
        assert!(ledger.redeem(&reward(2, 600, 10)).is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tier_exclusive_enforced() {
        let vip = RewardCatalogItem::new(7, "VIP", "Experiences", 3500, 150.0, 10)
            .exclusive_to(Tier::Platinum);
        let stock = Arc::new(StockBook::from_catalog(&[vip.clone()]));
        let ledger =
            RedemptionLedger::new(Member::new("CUST001", 10_000)).with_stock(stock.clone());
        let err = ledger.redeem(&vip).unwrap_err();
        assert!(matches!(
            err,
            LoyaltyError::TierRestricted {
                required: Tier::Platinum,
                actual: Tier::Gold
            }
        ));
        assert_eq!(ledger.balance(), 10_000);
        assert!(ledger.history().is_empty());
        assert!(ledger.member().redeemed_rewards.is_empty());
        assert_eq!(stock.level(vip.id), Some(10));

        let legacy = RedemptionLedger::new(Member::new("CUST002", 10_000))
            .with_policy(RedemptionPolicy::legacy());
        assert!(legacy.redeem(&vip).is_ok());
    }

    #[test]
    fn test_stock_decrements_and_exhausts() {
        let stock = Arc::new(StockBook::new());
        let ledger =
            RedemptionLedger::new(Member::new("CUST001", 10_000)).with_stock(stock.clone());
        let scarce = reward(99, 100, 2);

        ledger.redeem(&scarce).unwrap();
        ledger.redeem(&scarce).unwrap();
        assert_eq!(stock.level(99), Some(0));

        let err = ledger.redeem(&scarce).unwrap_err();
        assert!(matches!(err, LoyaltyError::OutOfStock { .. }));
        assert_eq!(ledger.balance(), 9_800);
        assert_eq!(ledger.history().len(), 2);
        assert_eq!(ledger.member().redeemed_rewards.len(), 2);
        assert_eq!(stock.level(99), Some(0));
    }

    #[test]
    fn test_claim_challenge() {
        let sink = capture_sink();
        let ledger = RedemptionLedger::new(Member::new("CUST001", 0)).with_events(sink.clone());
        let mut challenges = default_challenges();

        let incomplete = &challenges[3];
        assert!(matches!(
            ledger.claim_challenge(incomplete),
            Err(LoyaltyError::ChallengeIncomplete { .. })
        ));

        challenges[0].progress = 1;
        assert_eq!(ledger.claim_challenge(&challenges[0]).unwrap(), 100);
        assert!(matches!(
            ledger.claim_challenge(&challenges[0]),
            Err(LoyaltyError::ChallengeAlreadyClaimed(1))
        ));
        assert_eq!(ledger.member().lifetime_points, 100);
        assert_eq!(sink.count_type(EventType::PointsCredited), 1);
    }

    #[test]
    fn test_update_tier_emits_event() {
        let sink = capture_sink();
        let ledger = RedemptionLedger::new(Member::new("CUST001", 0)).with_events(sink.clone());
        let tiers = TierEngine::default();
        assert!(ledger.update_tier(&tiers, 2500.0));
        assert_eq!(ledger.member().tier, Tier::Platinum);
        assert!(!ledger.update_tier(&tiers, 2600.0));
        assert_eq!(sink.count_type(EventType::TierChanged), 1);
    }

    #[test]
    fn test_registry_one_ledger_per_member() {
        let registry = LedgerRegistry::new(
            RedemptionPolicy::default(),
            Arc::new(StockBook::new()),
            Arc::new(LocalOnly),
            noop_sink(),
        );
        let first = registry.open(Member::new("CUST001", 1000));
        let second = registry.open(Member::new("CUST001", 99));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.balance(), 1000);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("CUST002").is_none());
    }

    #[test]
    fn test_redeem_by_id() {
        let catalog = vec![reward(1, 200, 10), reward(2, 400, 10)];
        let ledger = RedemptionLedger::new(Member::new("CUST001", 500));

        assert_eq!(ledger.redeem_id(&catalog, 2).unwrap().points_spent, 400);
        assert!(matches!(
            ledger.redeem_id(&catalog, 99),
            Err(LoyaltyError::UnknownReward(99))
        ));
        assert_eq!(ledger.balance(), 100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_single_winner() {
        let ledger = Arc::new(RedemptionLedger::new(Member::new("CUST001", 1000)));
        let item = reward(1, 1000, 100);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                let item = item.clone();
                tokio::task::spawn_blocking(move || ledger.redeem(&item).is_ok())
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(ledger.balance(), 0);
        assert_eq!(ledger.history().len(), 1);
    }
}
