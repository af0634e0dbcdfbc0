//! RM ↔ client messaging
//!
//! Message payloads are a closed set of variants, each carrying only the
//! fields its kind needs.

pub mod meetings;
pub mod threads;
pub mod timeline;

pub use meetings::{Meeting, MeetingMode, MeetingRequest, MeetingScheduler, MeetingStatus};
pub use threads::MessageCenter;
pub use timeline::{Timeline, TimelineEvent, TimelineEventKind};

use crate::error::AdvisoryError;
use crate::models::GoalStatus;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    Text {
        body: String,
    },
    MeetingRequest {
        meeting_id: Uuid,
        proposed_start: DateTime<Utc>,
        duration_minutes: u32,
        agenda: String,
    },
    DocumentShare {
        document_name: String,
        document_url: String,
    },
    GoalUpdate {
        goal_id: Uuid,
        progress_percent: f64,
        status: GoalStatus,
    },
}

impl MessageBody {
    /// One-line preview for thread lists
    pub fn summary(&self) -> String {
        match self {
            MessageBody::Text { body } => {
                let mut preview: String = body.chars().take(80).collect();
                if body.chars().count() > 80 {
                    preview.push('…');
                }
                preview
            }
            MessageBody::MeetingRequest { proposed_start, .. } => {
                format!("Meeting requested for {}", proposed_start.format("%d %b %Y %H:%M"))
            }
            MessageBody::DocumentShare { document_name, .. } => {
                format!("Shared {}", document_name)
            }
            MessageBody::GoalUpdate {
                progress_percent,
                status,
                ..
            } => format!("Goal at {:.1}% ({})", progress_percent, status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub body: MessageBody,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// Conversation between one RM and one client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageThread {
    pub thread_id: Uuid,
    pub family_id: Uuid,
    pub rm_id: Uuid,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    messages: VecDeque<Message>,
}

impl MessageThread {
    pub fn new(family_id: Uuid, rm_id: Uuid, client_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            thread_id: Uuid::new_v4(),
            family_id,
            rm_id,
            client_id,
            created_at: now,
            updated_at: now,
            messages: VecDeque::new(),
        }
    }

    fn is_participant(&self, user_id: Uuid) -> bool {
        user_id == self.rm_id || user_id == self.client_id
    }

    /// Append a message from one of the two participants
    pub fn post(&mut self, sender_id: Uuid, body: MessageBody) -> Result<&Message> {
        if !self.is_participant(sender_id) {
            return Err(AdvisoryError::Forbidden(format!(
                "user {} is not part of thread {}",
                sender_id, self.thread_id
            )));
        }
        if let MessageBody::Text { body } = &body {
            if body.trim().is_empty() {
                return Err(AdvisoryError::InvalidInput(
                    "message text is empty".to_string(),
                ));
            }
        }

        let now = Utc::now();
        self.messages.push_back(Message {
            message_id: Uuid::new_v4(),
            thread_id: self.thread_id,
            sender_id,
            body,
            sent_at: now,
            read_at: None,
        });
        self.updated_at = now;

        self.messages
            .back()
            .ok_or_else(|| AdvisoryError::NotFound("posted message".to_string()))
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Most recent first
    pub fn recent_messages(&self, count: usize) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev().take(count)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Messages addressed to `user_id` that they have not read
    pub fn unread_count_for(&self, user_id: Uuid) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender_id != user_id && m.read_at.is_none())
            .count()
    }

    /// Mark everything addressed to `user_id` as read; returns how many changed
    pub fn mark_read(&mut self, user_id: Uuid, now: DateTime<Utc>) -> usize {
        let mut marked = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|m| m.sender_id != user_id && m.read_at.is_none())
        {
            message.read_at = Some(now);
            marked += 1;
        }
        marked
    }

    pub fn preview(&self) -> Option<String> {
        self.messages.back().map(|m| m.body.summary())
    }
}
