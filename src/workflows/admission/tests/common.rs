use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::admission::checklist::{ChecklistVariant, DocumentKind};
use crate::workflows::admission::clock::FixedClock;
use crate::workflows::admission::domain::{
    AdmissionDecision, Grade, InitialRating, ProfileId, Stage, TaskStatus,
};
use crate::workflows::admission::profile::{
    CommitmentTask, DossierEvaluation, NewProfile, Profile, WorkHistoryEntry,
};
use crate::workflows::admission::repository::{
    MemoryProfileRepository, ProfileRepository, RepositoryError,
};
use crate::workflows::admission::service::{DocumentUpload, PipelineSettings, ProfilePipeline};
use crate::workflows::admission::update::{
    AwarenessClassPatch, CommitmentPatch, DecisionPatch, DossierPatch, EvaluationPatch,
    PersonalInfoPatch, StageUpdate,
};
use crate::workflows::admission::admission_router;

pub(super) type TestPipeline = ProfilePipeline<MemoryProfileRepository, FixedClock>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn opening_day() -> NaiveDate {
    date(2025, 1, 15)
}

pub(super) fn new_profile(full_name: &str) -> NewProfile {
    NewProfile {
        full_name: full_name.to_string(),
        unit: "Cell 3 - Engineering".to_string(),
        introduced_date: Some(date(2025, 1, 10)),
        introducer_name: "Tran Van Minh".to_string(),
        initial_rating: Some(InitialRating::Good),
    }
}

pub(super) fn build_pipeline() -> (TestPipeline, Arc<MemoryProfileRepository>, Arc<FixedClock>) {
    build_pipeline_with(ChecklistVariant::Full)
}

pub(super) fn build_pipeline_with(
    variant: ChecklistVariant,
) -> (TestPipeline, Arc<MemoryProfileRepository>, Arc<FixedClock>) {
    let repository = Arc::new(MemoryProfileRepository::new());
    let clock = Arc::new(FixedClock::new(opening_day()));
    let pipeline = ProfilePipeline::new(
        repository.clone(),
        clock.clone(),
        PipelineSettings {
            checklist_variant: variant,
        },
    );
    (pipeline, repository, clock)
}

pub(super) fn open_profile(pipeline: &TestPipeline) -> Profile {
    pipeline
        .create_profile(new_profile("Nguyen Thi Lan"))
        .expect("profile opens")
}

pub(super) fn class_details() -> StageUpdate {
    StageUpdate::AwarenessClass(AwarenessClassPatch {
        class_name: Some("Party awareness class 2025/1".to_string()),
        class_code: Some("LCT-2025-01".to_string()),
        class_start_date: Some(date(2025, 2, 3)),
        class_end_date: Some(date(2025, 2, 14)),
        total_sessions: Some(10),
        attended_sessions: Some(10),
        exam_score: Some(8.5),
        exam_grade: Some(Grade::A),
        ..AwarenessClassPatch::default()
    })
}

pub(super) fn evaluation_scores(political: f64, attitude: f64, moral: f64) -> StageUpdate {
    StageUpdate::Evaluation(EvaluationPatch {
        evaluator: Some("Le Quang Huy".to_string()),
        political_awareness: Some(political),
        study_attitude: Some(attitude),
        moral_quality: Some(moral),
        grade: Some(Grade::B),
        ..EvaluationPatch::default()
    })
}

pub(super) fn commitment_details() -> StageUpdate {
    StageUpdate::Commitment(CommitmentPatch {
        commitment_content: Some("Lead the youth union volunteer programme".to_string()),
        mentor_name: Some("Pham Duc Anh".to_string()),
        tasks: Some(vec![
            CommitmentTask {
                id: "task-1".to_string(),
                name: "Volunteer weekend".to_string(),
                status: TaskStatus::Completed,
                completed_date: Some(date(2025, 5, 2)),
            },
            CommitmentTask {
                id: "task-2".to_string(),
                name: "Political theory reading group".to_string(),
                status: TaskStatus::InProgress,
                completed_date: None,
            },
        ]),
        ..CommitmentPatch::default()
    })
}

pub(super) fn dossier_details() -> StageUpdate {
    StageUpdate::Dossier(DossierPatch {
        personal_info: Some(PersonalInfoPatch {
            date_of_birth: Some(date(1998, 6, 21)),
            id_number: Some("001198012345".to_string()),
            phone: Some("0912345678".to_string()),
            email: Some("lan.nguyen@example.org".to_string()),
            ..PersonalInfoPatch::default()
        }),
        work_history: Some(vec![WorkHistoryEntry {
            period: "2020-2025".to_string(),
            position: "Software engineer".to_string(),
            unit: "Engineering".to_string(),
            description: String::new(),
        }]),
        evaluation: Some(DossierEvaluation {
            party_evaluation: "Meets every requirement".to_string(),
            union_evaluation: "Active union member".to_string(),
            training_result: "Excellent".to_string(),
            mentor_comment: String::new(),
        }),
        ..DossierPatch::default()
    })
}

pub(super) fn decision(decision: AdmissionDecision) -> StageUpdate {
    StageUpdate::Decision(DecisionPatch {
        present_members: Some(12),
        agreed_votes: Some(11),
        disagreed_votes: Some(1),
        decision: Some(decision),
        decision_number: Some("QD-118".to_string()),
        ..DecisionPatch::default()
    })
}

pub(super) fn upload(name: &str) -> DocumentUpload {
    DocumentUpload {
        file_name: name.to_string(),
        size_bytes: 4096,
        media_type: Some("application/pdf".to_string()),
    }
}

pub(super) fn upload_all(pipeline: &TestPipeline, id: &ProfileId, variant: ChecklistVariant) {
    for item in variant.items() {
        pipeline
            .upload_document(id, item.kind, upload(&format!("{:?}.pdf", item.kind)))
            .expect("upload");
    }
}

/// Drive a profile from stage 2 up to and including the completion of `last`.
pub(super) fn complete_through(pipeline: &TestPipeline, id: &ProfileId, last: Stage) -> Profile {
    let mut profile = pipeline.get(id).expect("profile exists");
    for stage in Stage::ordered().into_iter().skip(1) {
        if stage > last {
            break;
        }
        let update = match stage {
            Stage::Introduction => continue,
            Stage::AwarenessClass => class_details(),
            Stage::Evaluation => evaluation_scores(8.0, 7.5, 8.5),
            Stage::Commitment => commitment_details(),
            Stage::Dossier => {
                upload_all(pipeline, id, profile.stage5.checklist_variant);
                dossier_details()
            }
            Stage::Decision => decision(AdmissionDecision::Approved),
        };
        pipeline
            .update_stage(id, stage.number(), update)
            .expect("stage data merges");
        profile = pipeline
            .complete_stage(id, stage.number())
            .expect("stage completes");
    }
    profile
}

pub(super) fn any_document() -> DocumentKind {
    DocumentKind::PoliceClearance
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn router_with_pipeline(pipeline: TestPipeline) -> axum::Router {
    admission_router(Arc::new(pipeline))
}

pub(super) struct UnavailableRepository;

impl ProfileRepository for UnavailableRepository {
    fn insert_with<F>(&self, _build: F) -> Result<Profile, RepositoryError>
    where
        F: FnOnce(&[Profile]) -> Profile,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update<F, E>(&self, _id: &ProfileId, _mutate: F) -> Result<Profile, E>
    where
        F: FnOnce(&mut Profile) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch(&self, _id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshot(&self) -> Result<Arc<Vec<Profile>>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
