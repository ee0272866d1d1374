use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::json;

use super::checklist::DocumentKind;
use super::clock::Clock;
use super::domain::ProfileId;
use super::profile::{NewProfile, Profile};
use super::report::{export_csv, PipelineReport, ProfileDetail, ProfileView};
use super::repository::{ProfileRepository, RepositoryError};
use super::service::{DocumentUpload, PipelineError, ProfileFilter, ProfilePipeline};
use super::update::StageUpdate;

type SharedPipeline<R, C> = Arc<ProfilePipeline<R, C>>;

/// Router exposing profile lifecycle and pipeline reporting endpoints.
pub fn admission_router<R, C>(pipeline: SharedPipeline<R, C>) -> Router
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/profiles",
            post(create_handler::<R, C>).get(list_handler::<R, C>),
        )
        .route("/api/v1/profiles/:profile_id", get(detail_handler::<R, C>))
        .route(
            "/api/v1/profiles/:profile_id/stages/:stage",
            patch(update_stage_handler::<R, C>),
        )
        .route(
            "/api/v1/profiles/:profile_id/stages/:stage/complete",
            post(complete_stage_handler::<R, C>),
        )
        .route(
            "/api/v1/profiles/:profile_id/documents/:document",
            put(upload_document_handler::<R, C>).delete(remove_document_handler::<R, C>),
        )
        .route(
            "/api/v1/profiles/:profile_id/suspend",
            post(suspend_handler::<R, C>),
        )
        .route(
            "/api/v1/profiles/:profile_id/reactivate",
            post(reactivate_handler::<R, C>),
        )
        .route("/api/v1/pipeline/report", get(report_handler::<R, C>))
        .route("/api/v1/pipeline/export.csv", get(export_handler::<R, C>))
        .with_state(pipeline)
}

pub(crate) fn error_response(error: PipelineError) -> Response {
    let status = match &error {
        PipelineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::NotFound(_) | PipelineError::Repository(RepositoryError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        PipelineError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        PipelineError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn detail_response(status: StatusCode, result: Result<Profile, PipelineError>) -> Response {
    match result {
        Ok(profile) => (status, Json(ProfileDetail::from(&profile))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Json(request): Json<NewProfile>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(StatusCode::CREATED, pipeline.create_profile(request))
}

pub(crate) async fn list_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Query(filter): Query<ProfileFilter>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    match pipeline.list_profiles(&filter) {
        Ok(profiles) => {
            let views: Vec<ProfileView> = profiles.iter().map(ProfileView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path(profile_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(StatusCode::OK, pipeline.get(&ProfileId(profile_id)))
}

pub(crate) async fn update_stage_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path((profile_id, stage)): Path<(String, u8)>,
    Json(update): Json<StageUpdate>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(
        StatusCode::OK,
        pipeline.update_stage(&ProfileId(profile_id), stage, update),
    )
}

pub(crate) async fn complete_stage_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path((profile_id, stage)): Path<(String, u8)>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(
        StatusCode::OK,
        pipeline.complete_stage(&ProfileId(profile_id), stage),
    )
}

fn unknown_document(raw: &str) -> Response {
    let payload = json!({ "error": format!("'{raw}' is not a checklist document") });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn upload_document_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path((profile_id, document)): Path<(String, String)>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    let Some(kind) = DocumentKind::parse(&document) else {
        return unknown_document(&document);
    };
    detail_response(
        StatusCode::OK,
        pipeline.upload_document(&ProfileId(profile_id), kind, upload),
    )
}

pub(crate) async fn remove_document_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path((profile_id, document)): Path<(String, String)>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    let Some(kind) = DocumentKind::parse(&document) else {
        return unknown_document(&document);
    };
    detail_response(
        StatusCode::OK,
        pipeline.remove_document(&ProfileId(profile_id), kind),
    )
}

pub(crate) async fn suspend_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path(profile_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(StatusCode::OK, pipeline.suspend(&ProfileId(profile_id)))
}

pub(crate) async fn reactivate_handler<R, C>(
    State(pipeline): State<SharedPipeline<R, C>>,
    Path(profile_id): Path<String>,
) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    detail_response(StatusCode::OK, pipeline.reactivate(&ProfileId(profile_id)))
}

pub(crate) async fn report_handler<R, C>(State(pipeline): State<SharedPipeline<R, C>>) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    match pipeline.snapshot() {
        Ok(profiles) => {
            let report = PipelineReport::build(&profiles, pipeline.today());
            (StatusCode::OK, Json(report.summary())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, C>(State(pipeline): State<SharedPipeline<R, C>>) -> Response
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    let profiles = match pipeline.snapshot() {
        Ok(profiles) => profiles,
        Err(error) => return error_response(error),
    };

    match export_csv(&profiles) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"admission-profiles.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
