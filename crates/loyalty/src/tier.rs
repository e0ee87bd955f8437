//! Tier classification by cumulative spend, and progress toward the next tier.

use omnishop_core::config::TierConfig;
use omnishop_core::loyalty::{Member, Tier};
use serde::Serialize;
use tracing::{info, warn};

/// Progress toward the next tier. `remaining` may be negative when spend has
/// already passed the threshold; display code clamps it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierProgress {
    pub percent: f64,
    pub remaining: f64,
    pub next_tier: Option<Tier>,
}

#[derive(Debug, Clone)]
pub struct TierEngine {
    config: TierConfig,
}

impl TierEngine {
    pub fn new(config: &TierConfig) -> Self {
        info!(
            silver = config.silver_threshold,
            platinum = config.platinum_threshold,
            "Tier engine initialized"
        );
        Self {
            config: config.clone(),
        }
    }

    /// Map cumulative spend to a tier. Negative or non-finite spend is
    /// clamped to 0 and therefore classifies as Gold.
    pub fn classify(&self, total_spend: f64) -> Tier {
        let spend = sanitize_spend(total_spend);
        if spend >= self.config.platinum_threshold {
            Tier::Platinum
        } else if spend >= self.config.silver_threshold {
            Tier::Silver
        } else {
            Tier::Gold
        }
    }

    /// Progress from the member's current tier toward the next one, based on
    /// `annual_spend`.
    pub fn progress(&self, member: &Member) -> TierProgress {
        let spend = sanitize_spend(member.annual_spend);
        let silver = self.config.silver_threshold;
        let platinum = self.config.platinum_threshold;

        match member.tier {
            Tier::Gold => TierProgress {
                percent: percent_of(spend, silver),
                remaining: silver - spend,
                next_tier: Some(Tier::Silver),
            },
            Tier::Silver => TierProgress {
                percent: percent_of(spend - silver, platinum - silver),
                remaining: platinum - spend,
                next_tier: Some(Tier::Platinum),
            },
            Tier::Platinum => TierProgress {
                percent: 100.0,
                remaining: 0.0,
                next_tier: None,
            },
        }
    }

    /// Set tier and spend for a member being assembled from stored data.
    /// Nothing is reported: the member's tier was already this value.
    pub fn assign(&self, member: &mut Member, total_spend: f64) {
        member.annual_spend = sanitize_spend(total_spend);
        member.tier = self.classify(member.annual_spend);
    }

    /// Record new cumulative spend on the member and reclassify.
    /// Returns true if the tier changed.
    pub fn apply(&self, member: &mut Member, total_spend: f64) -> bool {
        let old_tier = member.tier;
        member.annual_spend = sanitize_spend(total_spend);
        let new_tier = self.classify(member.annual_spend);

        if new_tier == old_tier {
            return false;
        }

        member.tier = new_tier;
        let direction = if new_tier > old_tier { "upgrade" } else { "downgrade" };
        metrics::counter!("loyalty.tier_changes", "direction" => direction).increment(1);
        info!(
            member_id = %member.id,
            old = %old_tier,
            new = %new_tier,
            spend = member.annual_spend,
            "Tier {}", direction
        );
        true
    }
}

impl Default for TierEngine {
    fn default() -> Self {
        Self::new(&TierConfig::default())
    }
}

fn sanitize_spend(spend: f64) -> f64 {
    if spend.is_finite() && spend >= 0.0 {
        spend
    } else {
        warn!(spend, "Invalid spend clamped to 0");
        0.0
    }
}

fn percent_of(value: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 100.0;
    }
    (value / span * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(tier: Tier, spend: f64) -> Member {
        Member {
            tier,
            annual_spend: spend,
            ..Member::new("test-member", 0)
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let engine = TierEngine::default();
        assert_eq!(engine.classify(0.0), Tier::Gold);
        assert_eq!(engine.classify(499.99), Tier::Gold);
        assert_eq!(engine.classify(500.00), Tier::Silver);
        assert_eq!(engine.classify(1999.99), Tier::Silver);
        assert_eq!(engine.classify(2000.00), Tier::Platinum);
        assert_eq!(engine.classify(1_000_000.0), Tier::Platinum);
    }

    #[test]
    fn test_negative_spend_clamped() {
        let engine = TierEngine::default();
        assert_eq!(engine.classify(-50.0), Tier::Gold);
        assert_eq!(engine.classify(f64::NAN), Tier::Gold);
    }

    #[test]
    fn test_progress_gold() {
        let engine = TierEngine::default();
        let p = engine.progress(&member(Tier::Gold, 250.0));
        assert_eq!(p.percent, 50.0);
        assert_eq!(p.remaining, 250.0);
        assert_eq!(p.next_tier, Some(Tier::Silver));
    }

    #[test]
    fn test_progress_silver() {
        let engine = TierEngine::default();
        let p = engine.progress(&member(Tier::Silver, 1250.0));
        assert_eq!(p.percent, 50.0);
        assert_eq!(p.remaining, 750.0);
    }

    #[test]
    fn test_progress_gold_past_threshold_caps_percent() {
        let engine = TierEngine::default();
        let p = engine.progress(&member(Tier::Gold, 600.0));
        assert_eq!(p.percent, 100.0);
        assert_eq!(p.remaining, -100.0);
    }

    #[test]
    fn test_progress_platinum() {
        let engine = TierEngine::default();
        let p = engine.progress(&member(Tier::Platinum, 5000.0));
        assert_eq!((p.percent, p.remaining), (100.0, 0.0));
        assert_eq!(p.next_tier, None);
    }

    #[test]
    fn test_apply_upgrade_and_noop() {
        let engine = TierEngine::default();
        let mut m = member(Tier::Gold, 0.0);
        assert!(engine.apply(&mut m, 750.0));
        assert_eq!(m.tier, Tier::Silver);
        assert_eq!(m.annual_spend, 750.0);
        assert!(!engine.apply(&mut m, 800.0));
        assert_eq!(m.annual_spend, 800.0);
    }

    #[test]
    fn test_assign_is_not_a_tier_change() {
        let engine = TierEngine::default();
        let mut m = Member::new("CUST001", 18574);
        engine.assign(&mut m, 1531.58);
        assert_eq!(m.tier, Tier::Silver);
        assert_eq!(m.annual_spend, 1531.58);
        assert!(!engine.apply(&mut m, 1531.58));
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = TierEngine::new(&TierConfig {
            silver_threshold: 100.0,
            platinum_threshold: 200.0,
        });
        assert_eq!(engine.classify(150.0), Tier::Silver);
        assert_eq!(engine.classify(200.0), Tier::Platinum);
    }
}
