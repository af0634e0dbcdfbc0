//! Per-family activity timeline

use crate::models::GoalStatus;
use crate::risk::RiskCategory;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEventKind {
    OnboardingStarted {
        onboarding_id: Uuid,
    },
    PreProfilerCompleted {
        onboarding_id: Uuid,
        hni_flag: bool,
        investor_type: Option<String>,
    },
    RiskProfileCompleted {
        onboarding_id: Uuid,
        total_score: u8,
        category: RiskCategory,
    },
    OnboardingCompleted {
        onboarding_id: Uuid,
        family_member_count: usize,
    },
    GoalReviewed {
        goal_id: Uuid,
        status: GoalStatus,
        progress_percent: f64,
    },
    MeetingScheduled {
        meeting_id: Uuid,
        starts_at: DateTime<Utc>,
    },
    MessageSent {
        thread_id: Uuid,
        message_id: Uuid,
    },
    Note {
        author_id: Uuid,
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub event_id: Uuid,
    pub family_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TimelineEventKind,
}

/// In-memory timeline keyed by family
pub struct Timeline {
    events: Arc<RwLock<HashMap<Uuid, Vec<TimelineEvent>>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn record(&self, family_id: Uuid, kind: TimelineEventKind) -> Result<TimelineEvent> {
        let event = TimelineEvent {
            event_id: Uuid::new_v4(),
            family_id,
            occurred_at: Utc::now(),
            kind,
        };

        let mut events = self.events.write().await;
        events.entry(family_id).or_default().push(event.clone());

        Ok(event)
    }

    /// Events for a family in the order they happened
    pub async fn for_family(&self, family_id: Uuid) -> Result<Vec<TimelineEvent>> {
        let events = self.events.read().await;
        Ok(events.get(&family_id).cloned().unwrap_or_default())
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_scoped_and_ordered() {
        let timeline = Timeline::new();
        let family = Uuid::new_v4();
        let onboarding_id = Uuid::new_v4();

        timeline
            .record(family, TimelineEventKind::OnboardingStarted { onboarding_id })
            .await
            .unwrap();
        timeline
            .record(
                family,
                TimelineEventKind::RiskProfileCompleted {
                    onboarding_id,
                    total_score: 22,
                    category: RiskCategory::Moderate,
                },
            )
            .await
            .unwrap();
        timeline
            .record(
                Uuid::new_v4(),
                TimelineEventKind::Note {
                    author_id: Uuid::new_v4(),
                    text: "other family".to_string(),
                },
            )
            .await
            .unwrap();

        let events = timeline.for_family(family).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].kind,
            TimelineEventKind::OnboardingStarted { .. }
        ));
        assert!(timeline.for_family(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[test]
    fn test_event_wire_shape() {
        let event = TimelineEvent {
            event_id: Uuid::new_v4(),
            family_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            kind: TimelineEventKind::GoalReviewed {
                goal_id: Uuid::new_v4(),
                status: GoalStatus::AtRisk,
                progress_percent: 42.0,
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "goal_reviewed");
        assert_eq!(json["status"], "at_risk");
        assert!(json.get("familyId").is_some());

        let parsed: TimelineEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
