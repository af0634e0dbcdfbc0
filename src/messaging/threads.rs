//! Thread store: posting a message or a note also lands on the family timeline

use super::timeline::{Timeline, TimelineEvent, TimelineEventKind};
use super::{Message, MessageBody, MessageThread};
use crate::error::AdvisoryError;
use crate::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub struct MessageCenter {
    threads: Arc<RwLock<HashMap<Uuid, MessageThread>>>,
    timeline: Arc<Timeline>,
}

impl MessageCenter {
    pub fn new(timeline: Arc<Timeline>) -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
            timeline,
        }
    }

    /// The thread between this RM and client for the family, created on first use
    pub async fn open_thread(
        &self,
        family_id: Uuid,
        rm_id: Uuid,
        client_id: Uuid,
    ) -> Result<MessageThread> {
        if rm_id == client_id {
            return Err(AdvisoryError::InvalidInput(
                "a thread needs two distinct participants".to_string(),
            ));
        }

        let mut threads = self.threads.write().await;
        if let Some(existing) = threads
            .values()
            .find(|t| t.family_id == family_id && t.rm_id == rm_id && t.client_id == client_id)
        {
            return Ok(existing.clone());
        }

        let thread = MessageThread::new(family_id, rm_id, client_id);
        threads.insert(thread.thread_id, thread.clone());

        info!(thread_id = %thread.thread_id, family_id = %family_id, "Message thread opened");

        Ok(thread)
    }

    pub async fn thread(&self, thread_id: Uuid) -> Result<MessageThread> {
        let threads = self.threads.read().await;
        threads
            .get(&thread_id)
            .cloned()
            .ok_or_else(|| AdvisoryError::NotFound(format!("thread {}", thread_id)))
    }

    /// Most recently active first
    pub async fn threads_for_family(&self, family_id: Uuid) -> Result<Vec<MessageThread>> {
        let threads = self.threads.read().await;
        let mut found: Vec<MessageThread> = threads
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(found)
    }

    pub async fn post(&self, thread_id: Uuid, sender_id: Uuid, body: MessageBody) -> Result<Message> {
        let (family_id, message) = {
            let mut threads = self.threads.write().await;
            let thread = threads
                .get_mut(&thread_id)
                .ok_or_else(|| AdvisoryError::NotFound(format!("thread {}", thread_id)))?;
            let message = thread.post(sender_id, body)?.clone();
            (thread.family_id, message)
        };

        self.timeline
            .record(
                family_id,
                TimelineEventKind::MessageSent {
                    thread_id,
                    message_id: message.message_id,
                },
            )
            .await?;

        debug!(thread_id = %thread_id, message_id = %message.message_id, "Message posted");

        Ok(message)
    }

    /// Returns how many messages were newly marked read
    pub async fn mark_read(&self, thread_id: Uuid, user_id: Uuid) -> Result<usize> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(&thread_id)
            .ok_or_else(|| AdvisoryError::NotFound(format!("thread {}", thread_id)))?;
        Ok(thread.mark_read(user_id, Utc::now()))
    }

    /// Free-text note on the family timeline
    pub async fn add_note(&self, family_id: Uuid, author_id: Uuid, text: &str) -> Result<TimelineEvent> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisoryError::InvalidInput("note text is empty".to_string()));
        }

        self.timeline
            .record(
                family_id,
                TimelineEventKind::Note {
                    author_id,
                    text: text.to_string(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(body: &str) -> MessageBody {
        MessageBody::Text {
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_posting_records_timeline_event() {
        let timeline = Arc::new(Timeline::new());
        let center = MessageCenter::new(timeline.clone());
        let (family, rm, client) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let thread = center.open_thread(family, rm, client).await.unwrap();
        let message = center.post(thread.thread_id, rm, text("Welcome")).await.unwrap();

        let events = timeline.for_family(family).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            TimelineEventKind::MessageSent {
                thread_id: thread.thread_id,
                message_id: message.message_id,
            }
        );

        let stored = center.thread(thread.thread_id).await.unwrap();
        assert_eq!(stored.unread_count_for(client), 1);
        assert_eq!(center.mark_read(thread.thread_id, client).await.unwrap(), 1);
        assert_eq!(center.mark_read(thread.thread_id, client).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_post_leaves_no_event() {
        let timeline = Arc::new(Timeline::new());
        let center = MessageCenter::new(timeline.clone());
        let family = Uuid::new_v4();
        let thread = center
            .open_thread(family, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let outsider = center.post(thread.thread_id, Uuid::new_v4(), text("hi")).await;
        assert!(matches!(outsider, Err(AdvisoryError::Forbidden(_))));

        let missing = center.post(Uuid::new_v4(), thread.rm_id, text("hi")).await;
        assert!(matches!(missing, Err(AdvisoryError::NotFound(_))));

        assert!(timeline.for_family(family).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_thread_reuses_existing() {
        let center = MessageCenter::new(Arc::new(Timeline::new()));
        let (family, rm, client) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let first = center.open_thread(family, rm, client).await.unwrap();
        let again = center.open_thread(family, rm, client).await.unwrap();
        assert_eq!(first.thread_id, again.thread_id);

        let other = center.open_thread(family, rm, Uuid::new_v4()).await.unwrap();
        assert_ne!(first.thread_id, other.thread_id);
        assert_eq!(center.threads_for_family(family).await.unwrap().len(), 2);

        let same_person = center.open_thread(family, rm, rm).await;
        assert!(matches!(same_person, Err(AdvisoryError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_notes_land_on_timeline() {
        let timeline = Arc::new(Timeline::new());
        let center = MessageCenter::new(timeline.clone());
        let (family, author) = (Uuid::new_v4(), Uuid::new_v4());

        center
            .add_note(family, author, "  Prefers calls after 6pm ")
            .await
            .unwrap();
        assert!(center.add_note(family, author, "   ").await.is_err());

        let events = timeline.for_family(family).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].kind,
            TimelineEventKind::Note {
                author_id: author,
                text: "Prefers calls after 6pm".to_string(),
            }
        );
    }
}
