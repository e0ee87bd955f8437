//! Event bus — trait for emitting loyalty events from any engine.
//!
//! Engines accept an `Arc<dyn EventSink>`; the surrounding application routes
//! events into its analytics and audit pipelines.

use crate::types::{EventType, LoyaltyEvent};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Trait for emitting loyalty events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LoyaltyEvent);
}

/// No-op sink for callers that don't consume events.
pub struct NoOpSink;

impl EventSink for NoOpSink {
    fn emit(&self, _event: LoyaltyEvent) {}
}

/// In-memory sink that captures events for testing.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<LoyaltyEvent>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<LoyaltyEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn count_type(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for CaptureSink {
    fn emit(&self, event: LoyaltyEvent) {
        self.events.lock().push(event);
    }
}

/// Convenience builder for a `LoyaltyEvent` with only the required fields set.
pub fn make_event(event_type: EventType, member_id: impl Into<String>) -> LoyaltyEvent {
    LoyaltyEvent {
        event_id: Uuid::new_v4(),
        event_type,
        member_id: member_id.into(),
        reward_id: None,
        points: None,
        dollar_value: None,
        detail: None,
        timestamp: Utc::now(),
    }
}

impl LoyaltyEvent {
    pub fn with_reward(mut self, reward_id: u32) -> Self {
        self.reward_id = Some(reward_id);
        self
    }

    pub fn with_points(mut self, points: u64) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_value(mut self, dollar_value: f64) -> Self {
        self.dollar_value = Some(dollar_value);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Convenience: create a no-op event bus.
pub fn noop_sink() -> Arc<dyn EventSink> {
    Arc::new(NoOpSink)
}

/// Convenience: create a capture sink for tests.
pub fn capture_sink() -> Arc<CaptureSink> {
    Arc::new(CaptureSink::new())
}
