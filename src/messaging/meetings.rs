//! Meeting scheduling for relationship managers

use crate::error::AdvisoryError;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Longest bookable slot
pub const MAX_MEETING_MINUTES: u32 = 8 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingMode {
    InPerson,
    Video,
    Phone,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRequest {
    pub rm_id: Uuid,
    pub family_id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub mode: MeetingMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub meeting_id: Uuid,
    pub rm_id: Uuid,
    pub family_id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub mode: MeetingMode,
    pub status: MeetingStatus,
}

fn end_of(starts_at: DateTime<Utc>, duration_minutes: u32) -> Option<DateTime<Utc>> {
    starts_at.checked_add_signed(Duration::minutes(duration_minutes as i64))
}

impl Meeting {
    /// `None` when the end falls outside the representable calendar
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        end_of(self.starts_at, self.duration_minutes)
    }

    /// Half-open interval overlap: back-to-back meetings do not clash
    pub fn overlaps(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        self.starts_at < ends_at && self.ends_at().map_or(true, |end| starts_at < end)
    }
}

/// In-memory meeting book
pub struct MeetingScheduler {
    meetings: Arc<RwLock<HashMap<Uuid, Meeting>>>,
}

impl MeetingScheduler {
    pub fn new() -> Self {
        Self {
            meetings: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn schedule(&self, request: MeetingRequest) -> Result<Meeting> {
        if request.duration_minutes == 0 || request.duration_minutes > MAX_MEETING_MINUTES {
            return Err(AdvisoryError::InvalidInput(format!(
                "meeting duration must be 1-{} minutes, got {}",
                MAX_MEETING_MINUTES, request.duration_minutes
            )));
        }
        if request.title.trim().is_empty() {
            return Err(AdvisoryError::InvalidInput(
                "meeting title is required".to_string(),
            ));
        }

        let ends_at = end_of(request.starts_at, request.duration_minutes).ok_or_else(|| {
            AdvisoryError::InvalidInput(format!(
                "meeting starting {} runs past the end of the calendar",
                request.starts_at
            ))
        })?;

        let mut meetings = self.meetings.write().await;

        if let Some(clash) = meetings.values().find(|m| {
            m.rm_id == request.rm_id
                && m.status == MeetingStatus::Scheduled
                && m.overlaps(request.starts_at, ends_at)
        }) {
            warn!(
                rm_id = %request.rm_id,
                clash = %clash.meeting_id,
                "Meeting request overlaps an existing booking"
            );
            return Err(AdvisoryError::SchedulingConflict(format!(
                "overlaps '{}' at {}",
                clash.title, clash.starts_at
            )));
        }

        let meeting = Meeting {
            meeting_id: Uuid::new_v4(),
            rm_id: request.rm_id,
            family_id: request.family_id,
            title: request.title,
            starts_at: request.starts_at,
            duration_minutes: request.duration_minutes,
            mode: request.mode,
            status: MeetingStatus::Scheduled,
        };
        meetings.insert(meeting.meeting_id, meeting.clone());

        info!(meeting_id = %meeting.meeting_id, rm_id = %meeting.rm_id, "Meeting scheduled");

        Ok(meeting)
    }

    pub async fn cancel(&self, meeting_id: Uuid) -> Result<Meeting> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .get_mut(&meeting_id)
            .ok_or_else(|| AdvisoryError::NotFound(format!("meeting {}", meeting_id)))?;

        meeting.status = MeetingStatus::Cancelled;
        Ok(meeting.clone())
    }

    /// Scheduled meetings for an RM that have not ended by `from`, soonest first
    pub async fn upcoming_for_rm(&self, rm_id: Uuid, from: DateTime<Utc>) -> Result<Vec<Meeting>> {
        let meetings = self.meetings.read().await;

        let mut upcoming: Vec<Meeting> = meetings
            .values()
            .filter(|m| m.rm_id == rm_id && m.status == MeetingStatus::Scheduled)
            .filter(|m| m.ends_at().map_or(true, |end| end > from))
            .cloned()
            .collect();
        upcoming.sort_by_key(|m| m.starts_at);

        Ok(upcoming)
    }
}

impl Default for MeetingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    fn request(rm_id: Uuid, starts_at: DateTime<Utc>, minutes: u32) -> MeetingRequest {
        MeetingRequest {
            rm_id,
            family_id: Uuid::new_v4(),
            title: "Quarterly review".to_string(),
            starts_at,
            duration_minutes: minutes,
            mode: MeetingMode::Video,
        }
    }

    #[tokio::test]
    async fn test_overlap_rejected_for_same_rm() {
        let scheduler = MeetingScheduler::new();
        let rm = Uuid::new_v4();

        scheduler.schedule(request(rm, at(10, 0), 60)).await.unwrap();

        let clash = scheduler.schedule(request(rm, at(10, 30), 30)).await;
        assert!(matches!(clash, Err(AdvisoryError::SchedulingConflict(_))));

        // Another RM can take the same slot
        scheduler
            .schedule(request(Uuid::new_v4(), at(10, 30), 30))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_back_to_back_allowed() {
        let scheduler = MeetingScheduler::new();
        let rm = Uuid::new_v4();

        scheduler.schedule(request(rm, at(10, 0), 60)).await.unwrap();
        scheduler.schedule(request(rm, at(11, 0), 30)).await.unwrap();

        let upcoming = scheduler.upcoming_for_rm(rm, at(9, 0)).await.unwrap();
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming[0].starts_at < upcoming[1].starts_at);
    }

    #[tokio::test]
    async fn test_cancelled_slot_can_be_rebooked() {
        let scheduler = MeetingScheduler::new();
        let rm = Uuid::new_v4();

        let first = scheduler.schedule(request(rm, at(14, 0), 45)).await.unwrap();
        scheduler.cancel(first.meeting_id).await.unwrap();
        scheduler.schedule(request(rm, at(14, 0), 45)).await.unwrap();

        assert!(scheduler.cancel(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_duration_rejected() {
        let scheduler = MeetingScheduler::new();
        let result = scheduler.schedule(request(Uuid::new_v4(), at(9, 0), 0)).await;
        assert!(matches!(result, Err(AdvisoryError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_start_near_calendar_end_is_rejected() {
        let scheduler = MeetingScheduler::new();
        let starts_at = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);

        let result = scheduler
            .schedule(request(Uuid::new_v4(), starts_at, 60))
            .await;
        assert!(matches!(result, Err(AdvisoryError::InvalidInput(_))));

        // A slot that still fits is accepted
        let fits = scheduler
            .schedule(request(Uuid::new_v4(), starts_at - Duration::minutes(60), 60))
            .await
            .unwrap();
        assert_eq!(fits.ends_at(), Some(starts_at));
    }

    #[tokio::test]
    async fn test_finished_meetings_not_upcoming() {
        let scheduler = MeetingScheduler::new();
        let rm = Uuid::new_v4();
        scheduler.schedule(request(rm, at(8, 0), 30)).await.unwrap();

        let upcoming = scheduler.upcoming_for_rm(rm, at(9, 0)).await.unwrap();
        assert!(upcoming.is_empty());
    }
}
