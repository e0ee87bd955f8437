use crate::loyalty::Tier;
use thiserror::Error;

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Insufficient points: need {required}, have {available} ({shortfall} short)")]
    InsufficientPoints {
        required: u64,
        available: u64,
        shortfall: u64,
    },

    #[error("Remote redemption write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Customer data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Content flagged for review: {pattern}")]
    UnsafeContent { pattern: String },

    #[error("Requires {required} tier, member is {actual}")]
    TierRestricted { required: Tier, actual: Tier },

    #[error("Reward out of stock: {reward}")]
    OutOfStock { reward: String },

    #[error("Unknown reward id: {0}")]
    UnknownReward(u32),

    #[error("Challenge {challenge} incomplete: {progress}/{target}")]
    ChallengeIncomplete {
        challenge: String,
        progress: u32,
        target: u32,
    },

    #[error("Challenge {0} already claimed")]
    ChallengeAlreadyClaimed(u32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LoyaltyError {
    /// Short label used for metrics and rejection events.
    pub fn kind(&self) -> &'static str {
        match self {
            LoyaltyError::InsufficientPoints { .. } => "insufficient_points",
            LoyaltyError::RemoteWriteFailed(_) => "remote_write_failed",
            LoyaltyError::DataUnavailable(_) => "data_unavailable",
            LoyaltyError::UnsafeContent { .. } => "unsafe_content",
            LoyaltyError::TierRestricted { .. } => "tier_restricted",
            LoyaltyError::OutOfStock { .. } => "out_of_stock",
            LoyaltyError::UnknownReward(_) => "unknown_reward",
            LoyaltyError::ChallengeIncomplete { .. } => "challenge_incomplete",
            LoyaltyError::ChallengeAlreadyClaimed(_) => "challenge_already_claimed",
            LoyaltyError::Config(_) => "config",
            LoyaltyError::Serialization(_) => "serialization",
            LoyaltyError::Internal(_) => "internal",
        }
    }
}
