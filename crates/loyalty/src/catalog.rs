//! Catalog browsing: filter, sort and annotate rewards for one member.

use omnishop_core::loyalty::{Member, RewardCatalogItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    PointsLowToHigh,
    PointsHighToLow,
    NameAsc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Reward category; `None` means all categories.
    pub category: Option<String>,
    pub affordable_only: bool,
    pub sort: CatalogSort,
}

/// A reward as seen by a particular member.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub reward: RewardCatalogItem,
    /// The member's tier does not satisfy the reward's exclusivity.
    pub locked: bool,
    pub affordable: bool,
    pub points_short: u64,
}

pub fn browse(
    catalog: &[RewardCatalogItem],
    member: &Member,
    query: &CatalogQuery,
) -> Vec<CatalogEntry> {
    let mut rewards: Vec<&RewardCatalogItem> = catalog
        .iter()
        .filter(|r| query.category.as_deref().map_or(true, |c| r.category == c))
        .filter(|r| !query.affordable_only || r.points_cost <= member.points_balance)
        .collect();

    match query.sort {
        CatalogSort::PointsLowToHigh => rewards.sort_by_key(|r| r.points_cost),
        CatalogSort::PointsHighToLow => rewards.sort_by(|a, b| b.points_cost.cmp(&a.points_cost)),
        CatalogSort::NameAsc => rewards.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    rewards
        .into_iter()
        .map(|reward| CatalogEntry {
            locked: !reward.available_to(member.tier),
            affordable: reward.points_cost <= member.points_balance,
            points_short: reward.points_cost.saturating_sub(member.points_balance),
            reward: reward.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnishop_core::catalog::default_catalog;
    use omnishop_core::loyalty::Tier;

    fn silver_member(points: u64) -> Member {
        Member {
            tier: Tier::Silver,
            ..Member::new("CUST001", points)
        }
    }

    #[test]
    fn test_filter_category_sorted_low_to_high() {
        let query = CatalogQuery {
            category: Some("Gift Cards".into()),
            ..Default::default()
        };
        let entries = browse(&default_catalog(), &silver_member(1000), &query);
        let costs: Vec<u64> = entries.iter().map(|e| e.reward.points_cost).collect();
        assert_eq!(costs, vec![500, 1200, 2300]);
        assert!(entries[0].affordable);
        assert_eq!(entries[1].points_short, 200);
    }

    #[test]
    fn test_affordable_only_high_to_low() {
        let query = CatalogQuery {
            category: None,
            affordable_only: true,
            sort: CatalogSort::PointsHighToLow,
        };
        let entries = browse(&default_catalog(), &silver_member(500), &query);
        assert!(entries.iter().all(|e| e.reward.points_cost <= 500));
        assert_eq!(entries.first().map(|e| e.reward.points_cost), Some(500));
        assert_eq!(entries.last().map(|e| e.reward.points_cost), Some(300));
    }

    #[test]
    fn test_locked_follows_tier_ordering() {
        let query = CatalogQuery {
            category: Some("Experiences".into()),
            ..Default::default()
        };
        let entries = browse(&default_catalog(), &silver_member(0), &query);
        let locked: Vec<(u32, bool)> = entries.iter().map(|e| (e.reward.id, e.locked)).collect();
        // Silver-exclusive styling session is open; Platinum ones are locked.
        assert_eq!(locked, vec![(8, false), (7, true), (15, true)]);
    }

    #[test]
    fn test_sort_by_name() {
        let query = CatalogQuery {
            sort: CatalogSort::NameAsc,
            ..Default::default()
        };
        let entries = browse(&default_catalog(), &silver_member(0), &query);
        assert_eq!(entries[0].reward.name, "$10 Store Gift Card");
        assert_eq!(entries.len(), 15);
    }
}
