//! Loyalty engines: purchase analytics, tier classification, reward
//! recommendations, the redemption ledger, achievements and content guardrails.

pub mod achievements;
pub mod analyzer;
pub mod catalog;
pub mod engine;
pub mod ledger;
pub mod member;
pub mod recommend;
pub mod safety;
pub mod statement;
pub mod tier;

pub use achievements::{BadgeBoard, StreakProgress};
pub use analyzer::PurchaseAnalyzer;
pub use engine::LoyaltyEngine;
pub use ledger::{LedgerRegistry, LocalOnly, RedemptionGateway, RedemptionLedger, StockBook};
pub use member::{CustomerDataSource, MemberSession};
pub use recommend::{RecommendationEngine, Suggestions};
pub use safety::{InteractionLog, SafetyFilter, SafetyVerdict, SAFE_FALLBACK_RESPONSE};
pub use tier::{TierEngine, TierProgress};
