//! Content guardrails for advisory text produced outside the engine, plus an
//! audit log of screened assistant exchanges.

use chrono::{DateTime, Utc};
use omnishop_core::config::SafetyConfig;
use omnishop_core::event_bus::{make_event, noop_sink, EventSink};
use omnishop_core::loyalty::{Member, Tier};
use omnishop_core::types::EventType;
use omnishop_core::{LoyaltyError, LoyaltyResult};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Shown in place of any reply that fails the safety check.
pub const SAFE_FALLBACK_RESPONSE: &str = "I apologize, but I can't provide that type of advice. \
Let me help you with your rewards questions instead. \
What would you like to know about earning or redeeming points?";

const MAX_LOGGED_INPUT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    /// The first blocked pattern found, when unsafe.
    pub reason: Option<String>,
}

impl SafetyVerdict {
    pub fn into_result(self) -> LoyaltyResult<()> {
        match self.reason {
            Some(pattern) if !self.is_safe => Err(LoyaltyError::UnsafeContent { pattern }),
            _ => Ok(()),
        }
    }
}

/// Stateless denylist classifier.
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    patterns: Vec<String>,
}

impl SafetyFilter {
    pub fn new(config: &SafetyConfig) -> Self {
        Self {
            patterns: config
                .blocked_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive substring match against the denylist, in list order.
    pub fn check(&self, text: &str) -> SafetyVerdict {
        let lowered = text.to_lowercase();
        match self.patterns.iter().find(|p| lowered.contains(p.as_str())) {
            Some(pattern) => SafetyVerdict {
                is_safe: false,
                reason: Some(pattern.clone()),
            },
            None => SafetyVerdict {
                is_safe: true,
                reason: None,
            },
        }
    }

    /// `text` if it passes, otherwise the canned fallback.
    pub fn gate<'a>(&self, text: &'a str) -> &'a str {
        if self.check(text).is_safe {
            text
        } else {
            SAFE_FALLBACK_RESPONSE
        }
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        Self::new(&SafetyConfig::default())
    }
}

// ─── Interaction audit ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    /// Prompt, truncated for the log.
    pub input: String,
    pub output_length: usize,
    pub was_filtered: bool,
    pub member_tier: Tier,
}

/// Append-only log of assistant exchanges, written after screening so that
/// blocked text never reaches it.
pub struct InteractionLog {
    records: Mutex<Vec<InteractionRecord>>,
    events: Arc<dyn EventSink>,
}

impl InteractionLog {
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Screen a prompt/reply pair and log it. Returns the text to show: the
    /// reply, or the fallback if either side was blocked.
    pub fn screen_exchange(
        &self,
        filter: &SafetyFilter,
        member: &Member,
        kind: &str,
        prompt: &str,
        reply: &str,
    ) -> String {
        let verdict = match filter.check(prompt) {
            v if !v.is_safe => v,
            _ => filter.check(reply),
        };

        let (shown, was_filtered) = match verdict.reason {
            Some(pattern) => {
                metrics::counter!("safety.content_filtered").increment(1);
                warn!(
                    member_id = %member.id,
                    pattern = %pattern,
                    kind,
                    "Assistant content filtered"
                );
                self.events.emit(
                    make_event(EventType::ContentFiltered, member.id.clone()).with_detail(pattern),
                );
                (SAFE_FALLBACK_RESPONSE, true)
            }
            None => (reply, false),
        };

        self.records.lock().push(InteractionRecord {
            timestamp: Utc::now(),
            kind: kind.to_string(),
            input: truncate_for_log(prompt),
            output_length: shown.chars().count(),
            was_filtered,
            member_tier: member.tier,
        });

        shown.to_string()
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new(noop_sink())
    }
}

fn truncate_for_log(input: &str) -> String {
    if input.chars().count() > MAX_LOGGED_INPUT_CHARS {
        let head: String = input.chars().take(MAX_LOGGED_INPUT_CHARS).collect();
        format!("{head}...")
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnishop_core::event_bus::capture_sink;

    #[test]
    fn test_blocks_medical_advice() {
        let filter = SafetyFilter::default();
        let verdict = filter.check("I recommend seeing a doctor for medical advice");
        assert!(!verdict.is_safe);
        assert_eq!(verdict.reason.as_deref(), Some("medical advice"));
    }

    #[test]
    fn test_allows_reward_talk() {
        let filter = SafetyFilter::default();
        let verdict = filter.check("Here are some gift card ideas");
        assert!(verdict.is_safe);
        assert_eq!(verdict.reason, None);
        assert!(verdict.into_result().is_ok());
    }

    #[test]
    fn test_case_insensitive_and_fragments() {
        let filter = SafetyFilter::default();
        assert_eq!(
            filter.check("LEGAL ADVICE follows").reason.as_deref(),
            Some("legal advice")
        );
        assert_eq!(
            filter.check("that would be discriminatory").reason.as_deref(),
            Some("discriminat")
        );
    }

    #[test]
    fn test_first_pattern_in_list_order_wins() {
        let filter = SafetyFilter::default();
        let verdict = filter.check("legal advice and investment advice");
        assert_eq!(verdict.reason.as_deref(), Some("investment advice"));
    }

    #[test]
    fn test_into_result_unsafe() {
        let filter = SafetyFilter::default();
        let err = filter.check("hate speech").into_result().unwrap_err();
        assert!(matches!(err, LoyaltyError::UnsafeContent { pattern } if pattern == "hate speech"));
    }

    #[test]
    fn test_gate() {
        let filter = SafetyFilter::default();
        assert_eq!(filter.gate("Redeem the tote bag"), "Redeem the tote bag");
        assert_eq!(filter.gate("some investment advice"), SAFE_FALLBACK_RESPONSE);
    }

    #[test]
    fn test_screen_exchange_logs_and_filters() {
        let sink = capture_sink();
        let log = InteractionLog::new(sink.clone());
        let filter = SafetyFilter::default();
        let member = Member::new("CUST001", 500);

        let ok = log.screen_exchange(
            &filter,
            &member,
            "chat",
            "What can I get?",
            "Try the E-Book Bundle.",
        );
        assert_eq!(ok, "Try the E-Book Bundle.");

        let long_prompt = "x".repeat(150);
        let blocked = log.screen_exchange(
            &filter,
            &member,
            "chat",
            &long_prompt,
            "Here is some legal advice",
        );
        assert_eq!(blocked, SAFE_FALLBACK_RESPONSE);

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert!(!records[0].was_filtered);
        assert!(records[1].was_filtered);
        assert_eq!(records[1].input.chars().count(), 103);
        assert!(records[1].input.ends_with("..."));
        assert_eq!(sink.count_type(EventType::ContentFiltered), 1);

        log.clear();
        assert!(log.records().is_empty());
    }
}
