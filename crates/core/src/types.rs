use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit/analytics event emitted by the loyalty engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub member_id: String,
    pub reward_id: Option<u32>,
    pub points: Option<u64>,
    pub dollar_value: Option<f64>,
    /// Free-form context: rejection reason, filter pattern, tier change.
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PointsRedeemed,
    RedemptionRejected,
    RedemptionRolledBack,
    PointsCredited,
    TierChanged,
    ContentFiltered,
}
