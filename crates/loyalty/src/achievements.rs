//! Badge collection and streak bonus progress.

use omnishop_core::loyalty::{Badge, Member};
use serde::Serialize;
use tracing::debug;

/// Consecutive days needed for the streak bonus.
pub const STREAK_BONUS_DAYS: u32 = 14;
pub const STREAK_BONUS_POINTS: u64 = 500;

/// A member's badges split against the full badge set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BadgeBoard {
    /// In the order the member earned them.
    pub earned: Vec<Badge>,
    /// Remaining badges in display order.
    pub locked: Vec<Badge>,
}

impl BadgeBoard {
    pub fn total(&self) -> usize {
        self.earned.len() + self.locked.len()
    }

    /// Earned fraction in [0, 1]; 0 for an empty badge set.
    pub fn earned_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.earned.len() as f64 / total as f64,
        }
    }
}

/// Split `badges` into earned and locked for `member`. Names on the member
/// that are not in `badges` are skipped.
pub fn badge_board(member: &Member, badges: &[Badge]) -> BadgeBoard {
    let mut earned = Vec::with_capacity(member.badges.len());
    for name in &member.badges {
        match badges.iter().find(|b| &b.name == name) {
            Some(badge) if !earned.contains(badge) => earned.push(badge.clone()),
            Some(_) => {}
            None => debug!(member_id = %member.id, badge = %name, "Unknown badge skipped"),
        }
    }
    let locked = badges
        .iter()
        .filter(|b| !member.badges.contains(&b.name))
        .cloned()
        .collect();

    BadgeBoard { earned, locked }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct StreakProgress {
    pub days: u32,
    /// Capped at 100.
    pub percent: f64,
    pub days_remaining: u32,
    pub bonus_points: u64,
}

impl StreakProgress {
    pub fn bonus_reached(&self) -> bool {
        self.days_remaining == 0
    }
}

pub fn streak_progress(streak_days: u32) -> StreakProgress {
    let percent = (streak_days as f64 / STREAK_BONUS_DAYS as f64 * 100.0).min(100.0);
    StreakProgress {
        days: streak_days,
        percent,
        days_remaining: STREAK_BONUS_DAYS.saturating_sub(streak_days),
        bonus_points: STREAK_BONUS_POINTS,
    }
}
