use crate::infra::{AppState, ServicePipeline};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::Extension;
use axum::Json;
use party_admission::error::AppError;
use party_admission::workflows::admission::{admission_router, ProfileId};
use party_admission::workflows::notifications::Notification;
use party_admission::workflows::registry::{Member, MemberStatus};
use party_admission::workflows::targets::{
    NewTarget, RateBand, Target, TargetFilter, TargetTotals, TargetUpdate,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MemberQuery {
    pub(crate) id: Option<u64>,
    pub(crate) status: Option<MemberStatus>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MemberView {
    #[serde(flatten)]
    pub(crate) member: Member,
    pub(crate) status_label: &'static str,
    pub(crate) party_age: u32,
    pub(crate) probation_due: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OfficialRequest {
    pub(crate) decision_number: String,
    #[serde(default)]
    pub(crate) note: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationsResponse {
    pub(crate) unread: usize,
    pub(crate) notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TargetView {
    #[serde(flatten)]
    pub(crate) target: Target,
    pub(crate) rate: u64,
    pub(crate) band: RateBand,
}

impl From<Target> for TargetView {
    fn from(target: Target) -> Self {
        Self {
            rate: target.rate(),
            band: target.band(),
            target,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TargetsResponse {
    pub(crate) targets: Vec<TargetView>,
    pub(crate) totals: TargetTotals,
}

pub(crate) fn with_service_routes(pipeline: Arc<ServicePipeline>) -> axum::Router {
    admission_router(pipeline)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/members", get(members_endpoint))
        .route(
            "/api/v1/members/convert/:profile_id",
            post(convert_profile_endpoint),
        )
        .route("/api/v1/members/:member_id/official", post(official_endpoint))
        .route("/api/v1/notifications", get(notifications_endpoint))
        .route(
            "/api/v1/notifications/refresh",
            post(refresh_notifications_endpoint),
        )
        .route("/api/v1/notifications/read-all", post(read_all_endpoint))
        .route("/api/v1/notifications/:notification_id/read", post(read_endpoint))
        .route("/api/v1/targets", get(targets_endpoint).post(add_target_endpoint))
        .route("/api/v1/targets/export.csv", get(export_targets_endpoint))
        .route("/api/v1/targets/:target_id", patch(update_target_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn members_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<MemberView>>, AppError> {
    let today = state.pipeline.today();
    let lookahead = state.notifications.lookahead_days();
    let due: Vec<u64> = state
        .members
        .probation_due(today, lookahead)?
        .iter()
        .map(|member| member.id)
        .collect();

    let views = state
        .members
        .list()?
        .into_iter()
        .filter(|member| query.id.map_or(true, |id| member.id == id))
        .filter(|member| query.status.map_or(true, |status| member.status == status))
        .map(|member| MemberView {
            status_label: member.status.label(),
            party_age: member.party_age(today),
            probation_due: due.contains(&member.id),
            member,
        })
        .collect();

    Ok(Json(views))
}

pub(crate) async fn convert_profile_endpoint(
    Extension(state): Extension<AppState>,
    Path(profile_id): Path<String>,
) -> Result<(StatusCode, Json<Member>), AppError> {
    let profile = state.pipeline.get(&ProfileId(profile_id))?;
    let member = state
        .members
        .convert_profile(&profile, state.pipeline.today())?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub(crate) async fn official_endpoint(
    Extension(state): Extension<AppState>,
    Path(member_id): Path<u64>,
    Json(request): Json<OfficialRequest>,
) -> Result<Json<Member>, AppError> {
    let member = state.members.convert_to_official(
        member_id,
        &request.decision_number,
        &request.note,
        state.pipeline.today(),
    )?;
    Ok(Json(member))
}

pub(crate) async fn notifications_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<NotificationsResponse>, AppError> {
    Ok(Json(NotificationsResponse {
        unread: state.notifications.unread_count()?,
        notifications: state.notifications.list()?,
    }))
}

/// Re-run both deadline checks and persist whatever is new.
pub(crate) async fn refresh_notifications_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = state.pipeline.today();
    let members = state.members.list()?;
    let profiles = state.pipeline.snapshot()?;

    let mut drafts = state.notifications.check_probation_deadlines(&members, today);
    drafts.extend(state.notifications.check_stage_deadlines(&profiles, today));
    let published = state.notifications.publish(drafts, today)?;

    info!(published = published.len(), "notification refresh finished");
    Ok(Json(json!({ "published": published })))
}

pub(crate) async fn read_endpoint(
    Extension(state): Extension<AppState>,
    Path(notification_id): Path<u64>,
) -> Result<Json<Notification>, AppError> {
    Ok(Json(state.notifications.mark_read(notification_id)?))
}

pub(crate) async fn read_all_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let changed = state.notifications.mark_all_read()?;
    Ok(Json(json!({ "changed": changed })))
}

pub(crate) async fn targets_endpoint(
    Extension(state): Extension<AppState>,
    Query(filter): Query<TargetFilter>,
) -> Result<Json<TargetsResponse>, AppError> {
    let targets = state.targets.list(&filter)?;
    let totals = TargetTotals::of(&targets);
    Ok(Json(TargetsResponse {
        targets: targets.into_iter().map(TargetView::from).collect(),
        totals,
    }))
}

pub(crate) async fn add_target_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<NewTarget>,
) -> Result<(StatusCode, Json<TargetView>), AppError> {
    let target = state.targets.add(request)?;
    Ok((StatusCode::CREATED, Json(TargetView::from(target))))
}

pub(crate) async fn update_target_endpoint(
    Extension(state): Extension<AppState>,
    Path(target_id): Path<u64>,
    Json(update): Json<TargetUpdate>,
) -> Result<Json<TargetView>, AppError> {
    let target = state.targets.update(target_id, update)?;
    Ok(Json(TargetView::from(target)))
}

pub(crate) async fn export_targets_endpoint(
    Extension(state): Extension<AppState>,
    Query(filter): Query<TargetFilter>,
) -> Result<impl IntoResponse, AppError> {
    let body = state.targets.export_csv(&filter)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"recruitment-targets.csv\"",
            ),
        ],
        body,
    ))
}
