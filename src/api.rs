//! REST API for the wealth CRM advisory core
//!
//! Thin JSON layer over the questionnaire, scoring, projection and
//! onboarding components. Every response uses the `ApiResponse` envelope.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::audit::{AssessmentAuditLog, AssessmentKind};
use crate::classifier::PreProfilerClassifier;
use crate::error::AdvisoryError;
use crate::messaging::{
    MeetingRequest, MeetingScheduler, MessageBody, MessageCenter, Timeline, TimelineEventKind,
};
use crate::models::{BasicInfo, FinancialGoal, OnboardingFamilyMember};
use crate::onboarding::{InMemoryOnboardingStore, OnboardingService};
use crate::projection::{GoalProjection, GoalProjector, TrajectoryPoint};
use crate::questionnaire::{
    PreProfilerAnswers, RiskProfileAnswers, DEFAULT_PRE_PROFILER_BANK, DEFAULT_RISK_PROFILE_BANK,
};
use crate::risk::RiskScorer;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOnboardingRequest {
    pub family_id: Option<Uuid>,
    pub basic_info: BasicInfo,
}

#[derive(Debug, Deserialize)]
pub struct GoalReviewRequest {
    pub goal: FinancialGoal,
    /// Defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenThreadRequest {
    pub family_id: Uuid,
    pub rm_id: Uuid,
    pub client_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub sender_id: Uuid,
    pub body: MessageBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub author_id: Uuid,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GoalReviewResponse {
    pub goal: FinancialGoal,
    pub projection: GoalProjection,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn status_for(error: &AdvisoryError) -> StatusCode {
    if error.is_validation() {
        return StatusCode::BAD_REQUEST;
    }
    match error {
        AdvisoryError::NotFound(_) => StatusCode::NOT_FOUND,
        AdvisoryError::InvalidTransition(_) | AdvisoryError::SchedulingConflict(_) => {
            StatusCode::CONFLICT
        }
        AdvisoryError::InvalidCredentials | AdvisoryError::NotAuthenticated => {
            StatusCode::UNAUTHORIZED
        }
        AdvisoryError::Forbidden(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: crate::Result<T>) -> ApiResult {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!("Request failed: {}", e);
            }
            (status, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub onboarding: Arc<OnboardingService>,
    pub timeline: Arc<Timeline>,
    pub meetings: Arc<MeetingScheduler>,
    pub messages: Arc<MessageCenter>,
    /// `None` until goal thresholds are configured
    pub projector: Option<Arc<GoalProjector>>,
}

impl ApiState {
    /// In-memory stores sharing one timeline
    pub fn in_memory(projector: Option<GoalProjector>) -> Self {
        let timeline = Arc::new(Timeline::new());
        let onboarding = OnboardingService::new(
            Arc::new(InMemoryOnboardingStore::new()),
            Arc::new(AssessmentAuditLog::new()),
            timeline.clone(),
        );

        Self {
            onboarding: Arc::new(onboarding),
            messages: Arc::new(MessageCenter::new(timeline.clone())),
            timeline,
            meetings: Arc::new(MeetingScheduler::new()),
            projector: projector.map(Arc::new),
        }
    }
}

/// =============================
/// Health & Questionnaires
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn pre_profiler_questionnaire() -> ApiResult {
    respond(Ok(&*DEFAULT_PRE_PROFILER_BANK))
}

async fn risk_profile_questionnaire() -> ApiResult {
    respond(Ok(&*DEFAULT_RISK_PROFILE_BANK))
}

/// =============================
/// Stateless Scoring
/// =============================

async fn classify_pre_profiler(Json(answers): Json<PreProfilerAnswers>) -> ApiResult {
    respond(PreProfilerClassifier::classify(&answers))
}

async fn score_risk_profile(Json(answers): Json<RiskProfileAnswers>) -> ApiResult {
    respond(RiskScorer::score(&answers))
}

async fn review_goal(
    State(state): State<ApiState>,
    Json(req): Json<GoalReviewRequest>,
) -> ApiResult {
    let Some(projector) = state.projector.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(
                "Goal projection is not configured: status thresholds are unset".into(),
            )),
        );
    };

    let as_of = req.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let mut goal = req.goal;

    let result = async {
        let projection = projector.review(&mut goal, as_of, Utc::now())?;
        let trajectory = projector.trajectory(&goal, as_of)?;

        state
            .timeline
            .record(
                goal.family_id,
                TimelineEventKind::GoalReviewed {
                    goal_id: goal.goal_id,
                    status: goal.status,
                    progress_percent: goal.progress_percent,
                },
            )
            .await?;

        Ok::<_, AdvisoryError>(GoalReviewResponse {
            goal,
            projection,
            trajectory,
        })
    }
    .await;

    respond(result)
}

/// =============================
/// Onboarding
/// =============================

async fn start_onboarding(
    State(state): State<ApiState>,
    Json(req): Json<StartOnboardingRequest>,
) -> ApiResult {
    let family_id = req.family_id.unwrap_or_else(Uuid::new_v4);
    respond(state.onboarding.start(family_id, req.basic_info).await)
}

async fn get_onboarding(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.onboarding.get(id).await)
}

async fn submit_pre_profiler(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(answers): Json<PreProfilerAnswers>,
) -> ApiResult {
    respond(state.onboarding.submit_pre_profiler(id, answers).await)
}

async fn submit_risk_profile(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(answers): Json<RiskProfileAnswers>,
) -> ApiResult {
    respond(state.onboarding.submit_risk_profile(id, answers).await)
}

async fn add_family_member(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(member): Json<OnboardingFamilyMember>,
) -> ApiResult {
    respond(state.onboarding.add_family_member(id, member).await)
}

async fn complete_onboarding(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.onboarding.complete(id).await)
}

/// =============================
/// Assessment Audit
/// =============================

async fn family_assessments(
    State(state): State<ApiState>,
    Path(family_id): Path<Uuid>,
) -> ApiResult {
    respond(state.onboarding.audit_log().trail(family_id).await)
}

async fn current_risk_profile(
    State(state): State<ApiState>,
    Path(family_id): Path<Uuid>,
) -> ApiResult {
    let result = state
        .onboarding
        .audit_log()
        .latest(family_id, AssessmentKind::RiskProfile)
        .await
        .and_then(|latest| {
            latest.ok_or_else(|| {
                AdvisoryError::NotFound(format!("risk profile for family {}", family_id))
            })
        });

    respond(result)
}

async fn verify_assessment(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    let result = state
        .onboarding
        .audit_log()
        .verify_integrity(id)
        .await
        .map(|intact| serde_json::json!({ "auditId": id, "intact": intact }));

    respond(result)
}

/// =============================
/// Timeline & Meetings
/// =============================

async fn family_timeline(
    State(state): State<ApiState>,
    Path(family_id): Path<Uuid>,
) -> ApiResult {
    respond(state.timeline.for_family(family_id).await)
}

async fn schedule_meeting(
    State(state): State<ApiState>,
    Json(req): Json<MeetingRequest>,
) -> ApiResult {
    let result = async {
        let meeting = state.meetings.schedule(req).await?;
        state
            .timeline
            .record(
                meeting.family_id,
                TimelineEventKind::MeetingScheduled {
                    meeting_id: meeting.meeting_id,
                    starts_at: meeting.starts_at,
                },
            )
            .await?;
        Ok::<_, AdvisoryError>(meeting)
    }
    .await;

    respond(result)
}

async fn cancel_meeting(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.meetings.cancel(id).await)
}

async fn upcoming_meetings(State(state): State<ApiState>, Path(rm_id): Path<Uuid>) -> ApiResult {
    respond(state.meetings.upcoming_for_rm(rm_id, Utc::now()).await)
}

/// =============================
/// Messaging
/// =============================

async fn open_thread(
    State(state): State<ApiState>,
    Json(req): Json<OpenThreadRequest>,
) -> ApiResult {
    respond(
        state
            .messages
            .open_thread(req.family_id, req.rm_id, req.client_id)
            .await,
    )
}

async fn get_thread(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.messages.thread(id).await)
}

async fn post_message(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> ApiResult {
    respond(state.messages.post(id, req.sender_id, req.body).await)
}

async fn mark_thread_read(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkReadRequest>,
) -> ApiResult {
    respond(state.messages.mark_read(id, req.user_id).await)
}

async fn family_threads(
    State(state): State<ApiState>,
    Path(family_id): Path<Uuid>,
) -> ApiResult {
    respond(state.messages.threads_for_family(family_id).await)
}

async fn add_note(
    State(state): State<ApiState>,
    Path(family_id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> ApiResult {
    respond(state.messages.add_note(family_id, req.author_id, &req.text).await)
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/questionnaires/pre-profiler", get(pre_profiler_questionnaire))
        .route("/api/questionnaires/risk-profile", get(risk_profile_questionnaire))
        .route("/api/pre-profiler/classify", post(classify_pre_profiler))
        .route("/api/risk-profile/score", post(score_risk_profile))
        .route("/api/goals/review", post(review_goal))
        .route("/api/onboarding", post(start_onboarding))
        .route("/api/onboarding/:id", get(get_onboarding))
        .route("/api/onboarding/:id/pre-profiler", post(submit_pre_profiler))
        .route("/api/onboarding/:id/risk-profile", post(submit_risk_profile))
        .route("/api/onboarding/:id/family-members", post(add_family_member))
        .route("/api/onboarding/:id/complete", post(complete_onboarding))
        .route("/api/families/:family_id/timeline", get(family_timeline))
        .route("/api/families/:family_id/assessments", get(family_assessments))
        .route("/api/families/:family_id/risk-profile", get(current_risk_profile))
        .route("/api/assessments/:id/verify", get(verify_assessment))
        .route("/api/meetings", post(schedule_meeting))
        .route("/api/meetings/:id/cancel", post(cancel_meeting))
        .route("/api/rms/:rm_id/meetings", get(upcoming_meetings))
        .route("/api/threads", post(open_thread))
        .route("/api/threads/:id", get(get_thread))
        .route("/api/threads/:id/messages", post(post_message))
        .route("/api/threads/:id/read", post(mark_thread_read))
        .route("/api/families/:family_id/threads", get(family_threads))
        .route("/api/families/:family_id/notes", post(add_note))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
