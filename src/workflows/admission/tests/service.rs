use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

use chrono::NaiveDate;

use super::common::*;
use crate::workflows::admission::checklist::{ChecklistVariant, DocumentKind};
use crate::workflows::admission::clock::{Clock, FixedClock};
use crate::workflows::admission::domain::{
    AdmissionDecision, EvaluationResult, ProfileId, ProfileStatus, ReviewStatus, Stage,
    StageStatus,
};
use crate::workflows::admission::guard::{DossierSection, ValidationError};
use crate::workflows::admission::profile::Profile;
use crate::workflows::admission::repository::{MemoryProfileRepository, ProfileRepository};
use crate::workflows::admission::service::{
    PipelineError, PipelineSettings, ProfileFilter, ProfilePipeline,
};
use crate::workflows::admission::update::{
    AwarenessClassPatch, DossierPatch, EvaluationPatch, StageUpdate,
};

fn validation(error: PipelineError) -> ValidationError {
    match error {
        PipelineError::Validation(inner) => inner,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

/// Clock that parks the first caller after `arm` until the test lets it go.
struct GatedClock {
    today: NaiveDate,
    armed: AtomicBool,
    reached: Barrier,
    release: Barrier,
}

impl GatedClock {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            armed: AtomicBool::new(false),
            reached: Barrier::new(2),
            release: Barrier::new(2),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl Clock for GatedClock {
    fn today(&self) -> NaiveDate {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.reached.wait();
            self.release.wait();
        }
        self.today
    }
}

#[test]
fn create_profile_completes_introduction_and_opens_the_class() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    let today = opening_day();

    assert_eq!(profile.id, ProfileId("profile-000001".to_string()));
    assert_eq!(profile.code, "HS-2025-001");
    assert_eq!(profile.status, ProfileStatus::Active);
    assert_eq!(profile.current_stage, Stage::AwarenessClass);

    assert_eq!(profile.stage1.common.status, StageStatus::Completed);
    assert_eq!(profile.stage1.common.start_date, Some(today));
    assert_eq!(profile.stage1.common.end_date, Some(today));
    assert_eq!(profile.stage1.common.deadline, Some(today));

    assert_eq!(profile.stage2.common.status, StageStatus::InProgress);
    assert_eq!(profile.stage2.common.start_date, Some(today));
    assert_eq!(profile.stage2.common.deadline, Some(date(2025, 7, 14)));

    for stage in [Stage::Evaluation, Stage::Commitment, Stage::Dossier, Stage::Decision] {
        assert_eq!(profile.common(stage).status, StageStatus::Pending);
    }
    assert_eq!(profile.overall_progress(), 17);
    assert_eq!(profile.stage5.required_count, 16);
}

#[test]
fn create_profile_names_the_first_missing_field() {
    let (pipeline, repository, _) = build_pipeline();

    let mut request = new_profile("  ");
    request.initial_rating = None;
    let error = validation(pipeline.create_profile(request).expect_err("name is blank"));
    assert_eq!(error, ValidationError::MissingField { field: "full name" });

    let mut request = new_profile("Hoang Minh Chau");
    request.introduced_date = None;
    let error = validation(pipeline.create_profile(request).expect_err("date missing"));
    assert_eq!(
        error,
        ValidationError::MissingField {
            field: "introduction date"
        }
    );

    let mut request = new_profile("Hoang Minh Chau");
    request.initial_rating = None;
    let error = validation(pipeline.create_profile(request).expect_err("rating missing"));
    assert_eq!(
        error,
        ValidationError::MissingField {
            field: "initial rating"
        }
    );

    assert!(repository.snapshot().expect("snapshot").is_empty());
}

#[test]
fn profile_codes_count_per_year() {
    let (pipeline, _, clock) = build_pipeline();

    let first = open_profile(&pipeline);
    let second = pipeline
        .create_profile(new_profile("Vo Thanh Tam"))
        .expect("second profile");
    clock.set(date(2026, 1, 2));
    let third = pipeline
        .create_profile(new_profile("Dang Thu Ha"))
        .expect("third profile");

    assert_eq!(first.code, "HS-2025-001");
    assert_eq!(second.code, "HS-2025-002");
    assert_eq!(third.code, "HS-2026-001");
    assert_eq!(third.id, ProfileId("profile-000003".to_string()));
}

#[test]
fn rejected_completion_leaves_the_snapshot_untouched() {
    let (pipeline, repository, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    let before = repository.snapshot().expect("snapshot");

    let error = validation(
        pipeline
            .complete_stage(&profile.id, 2)
            .expect_err("class details missing"),
    );
    assert_eq!(
        error,
        ValidationError::ClassDetailsIncomplete {
            missing: vec!["class name", "class start date", "class end date"]
        }
    );

    let after = repository.snapshot().expect("snapshot");
    assert_eq!(before.as_ref(), after.as_ref());
}

#[test]
fn completing_the_class_opens_the_evaluation_with_its_deadline() {
    let (pipeline, _, clock) = build_pipeline();
    let profile = open_profile(&pipeline);

    pipeline
        .update_stage(&profile.id, 2, class_details())
        .expect("class data");
    clock.set(date(2025, 2, 20));
    let profile = pipeline.complete_stage(&profile.id, 2).expect("class completes");

    assert_eq!(profile.stage2.common.status, StageStatus::Completed);
    assert_eq!(profile.stage2.common.end_date, Some(date(2025, 2, 20)));
    assert_eq!(profile.current_stage, Stage::Evaluation);
    assert_eq!(profile.stage3.common.status, StageStatus::InProgress);
    assert_eq!(profile.stage3.common.start_date, Some(date(2025, 2, 20)));
    assert_eq!(profile.stage3.common.deadline, Some(date(2025, 4, 21)));
    assert_eq!(profile.updated_at, date(2025, 2, 20));
    assert_eq!(profile.overall_progress(), 33);
}

#[test]
fn low_evaluation_scores_block_the_transition() {
    let (pipeline, repository, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::AwarenessClass);

    let updated = pipeline
        .update_stage(&profile.id, 3, evaluation_scores(4.0, 4.0, 4.0))
        .expect("scores merge");
    assert_eq!(updated.stage3.overall_score, 4.0);
    let before = repository.snapshot().expect("snapshot");

    let error = validation(
        pipeline
            .complete_stage(&profile.id, 3)
            .expect_err("score below threshold"),
    );
    assert_eq!(
        error,
        ValidationError::ScoreBelowThreshold {
            score: 4.0,
            minimum: 5.0
        }
    );
    assert_eq!(before.as_ref(), repository.snapshot().expect("snapshot").as_ref());

    pipeline
        .update_stage(&profile.id, 3, evaluation_scores(6.0, 7.0, 8.0))
        .expect("scores merge");
    let profile = pipeline
        .complete_stage(&profile.id, 3)
        .expect("score passes");
    assert_eq!(profile.stage3.overall_score, 7.0);
    assert_eq!(profile.stage3.result, EvaluationResult::Pass);
    assert_eq!(profile.stage3.evaluation_date, Some(opening_day()));
    assert_eq!(profile.current_stage, Stage::Commitment);
    assert_eq!(profile.stage4.common.deadline, Some(date(2026, 1, 15)));
}

#[test]
fn class_name_is_required_even_when_both_dates_are_set() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);

    pipeline
        .update_stage(
            &profile.id,
            2,
            StageUpdate::AwarenessClass(AwarenessClassPatch {
                class_name: Some("   ".to_string()),
                class_code: Some("LCT-2025-01".to_string()),
                class_start_date: Some(date(2025, 2, 3)),
                class_end_date: Some(date(2025, 2, 14)),
                total_sessions: Some(10),
                attended_sessions: Some(10),
                ..AwarenessClassPatch::default()
            }),
        )
        .expect("class data");

    let error = validation(pipeline.complete_stage(&profile.id, 2).expect_err("no class name"));
    assert_eq!(
        error,
        ValidationError::ClassDetailsIncomplete {
            missing: vec!["class name"]
        }
    );
    assert_eq!(
        pipeline.get(&profile.id).expect("profile").current_stage,
        Stage::AwarenessClass
    );
}

#[test]
fn sub_scores_outside_the_scale_are_rejected_before_merging() {
    let (pipeline, repository, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::AwarenessClass);
    let before = repository.snapshot().expect("snapshot");

    let error = validation(
        pipeline
            .update_stage(&profile.id, 3, evaluation_scores(15.0, 0.0, 0.0))
            .expect_err("15 is off the scale"),
    );
    assert_eq!(
        error,
        ValidationError::ScoreOutOfRange {
            field: "political awareness",
            score: 15.0
        }
    );
    assert_eq!(before.as_ref(), repository.snapshot().expect("snapshot").as_ref());

    let error = validation(
        pipeline
            .update_stage(
                &profile.id,
                3,
                StageUpdate::Evaluation(EvaluationPatch {
                    study_attitude: Some(-0.5),
                    ..EvaluationPatch::default()
                }),
            )
            .expect_err("negative score"),
    );
    assert!(matches!(
        error,
        ValidationError::ScoreOutOfRange {
            field: "study attitude",
            ..
        }
    ));
}

#[test]
fn three_closed_stages_report_half_progress() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);

    let profile = complete_through(&pipeline, &profile.id, Stage::Evaluation);
    assert_eq!(profile.completed_stages(), 3);
    assert_eq!(profile.current_stage, Stage::Commitment);
    assert_eq!(pipeline.overall_progress(&profile.id).expect("progress"), 50);
}

#[test]
fn a_patch_racing_a_completion_cannot_reopen_the_stage() {
    let clock = Arc::new(GatedClock::new(opening_day()));
    let pipeline = ProfilePipeline::new(
        Arc::new(MemoryProfileRepository::new()),
        clock.clone(),
        PipelineSettings::default(),
    );
    let id = pipeline
        .create_profile(new_profile("Nguyen Thi Lan"))
        .expect("profile opens")
        .id;
    pipeline
        .update_stage(&id, 2, class_details())
        .expect("class data");

    clock.arm();
    let (completed, patched) = std::thread::scope(|scope| {
        let patch = scope.spawn(|| {
            pipeline.update_stage(
                &id,
                2,
                StageUpdate::AwarenessClass(AwarenessClassPatch {
                    note: Some("moved to room 4".to_string()),
                    ..AwarenessClassPatch::default()
                }),
            )
        });
        clock.reached.wait();
        let completed = pipeline.complete_stage(&id, 2);
        clock.release.wait();
        (completed, patch.join().expect("patch thread"))
    });

    let completed = completed.expect("class completes");
    assert_eq!(completed.current_stage, Stage::Evaluation);
    let patched = patched.expect("note merges");
    assert_eq!(patched.current_stage, Stage::Evaluation);

    let stored = pipeline.get(&id).expect("profile");
    assert_eq!(stored.current_stage, Stage::Evaluation);
    assert_eq!(stored.stage2.common.status, StageStatus::Completed);
    assert_eq!(stored.stage2.common.end_date, Some(opening_day()));
    assert_eq!(stored.stage3.common.status, StageStatus::InProgress);
    assert_eq!(stored.stage2.common.note, "moved to room 4");
}

#[test]
fn concurrent_openings_get_distinct_ids_and_codes() {
    let (pipeline, repository, _) = build_pipeline();

    let opened: Vec<Profile> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let pipeline = &pipeline;
                scope.spawn(move || pipeline.create_profile(new_profile(&format!("Applicant {n}"))))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread").expect("profile opens"))
            .collect()
    });

    let mut ids: Vec<ProfileId> = opened.iter().map(|profile| profile.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);

    let mut codes: Vec<String> = opened.iter().map(|profile| profile.code.clone()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 8);
    assert_eq!(codes.last().map(String::as_str), Some("HS-2025-008"));
    assert_eq!(repository.snapshot().expect("snapshot").len(), 8);
}

#[test]
fn only_the_open_stage_can_complete() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);

    let error = validation(pipeline.complete_stage(&profile.id, 1).expect_err("closed"));
    assert_eq!(
        error,
        ValidationError::StageNotOpen {
            stage: Stage::Introduction,
            current_stage: Stage::AwarenessClass
        }
    );

    let error = validation(pipeline.complete_stage(&profile.id, 4).expect_err("pending"));
    assert!(matches!(
        error,
        ValidationError::StageNotOpen {
            stage: Stage::Commitment,
            ..
        }
    ));

    let error = validation(pipeline.complete_stage(&profile.id, 7).expect_err("no stage 7"));
    assert_eq!(error, ValidationError::UnknownStage { number: 7 });
}

#[test]
fn updates_merge_without_changing_status() {
    let (pipeline, _, clock) = build_pipeline();
    let profile = open_profile(&pipeline);
    clock.advance_days(3);

    let updated = pipeline
        .update_stage(&profile.id, 4, commitment_details())
        .expect("data for a pending stage still merges");

    assert_eq!(updated.stage4.common.status, StageStatus::Pending);
    assert_eq!(updated.stage4.completion_rate, 50);
    assert_eq!(updated.current_stage, Stage::AwarenessClass);
    assert_eq!(updated.updated_at, date(2025, 1, 18));

    let error = validation(
        pipeline
            .update_stage(&profile.id, 2, commitment_details())
            .expect_err("mismatch"),
    );
    assert_eq!(
        error,
        ValidationError::StageMismatch {
            requested: Stage::AwarenessClass,
            update: Stage::Commitment
        }
    );
}

#[test]
fn commitment_requires_content_and_mentor() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::Evaluation);

    let error = validation(pipeline.complete_stage(&profile.id, 4).expect_err("empty"));
    assert_eq!(
        error,
        ValidationError::CommitmentIncomplete {
            missing: vec!["commitment content", "mentor name"]
        }
    );

    pipeline
        .update_stage(&profile.id, 4, commitment_details())
        .expect("commitment data");
    let profile = pipeline.complete_stage(&profile.id, 4).expect("completes");
    assert_eq!(profile.stage4.completion_rate, 100);
    assert_eq!(profile.current_stage, Stage::Dossier);
}

#[test]
fn dossier_reports_every_missing_section() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::Commitment);

    pipeline
        .upload_document(&profile.id, any_document(), upload("clearance.pdf"))
        .expect("upload");

    let error = validation(pipeline.complete_stage(&profile.id, 5).expect_err("empty dossier"));
    assert_eq!(
        error,
        ValidationError::DossierIncomplete {
            missing: vec![
                DossierSection::PersonalInfo,
                DossierSection::WorkHistory,
                DossierSection::Evaluation,
                DossierSection::Documents,
            ],
            uploaded: 1,
            required: 16,
        }
    );

    pipeline
        .update_stage(&profile.id, 5, dossier_details())
        .expect("dossier data");
    let error = validation(pipeline.complete_stage(&profile.id, 5).expect_err("documents"));
    assert!(matches!(
        error,
        ValidationError::DossierIncomplete { ref missing, uploaded: 1, required: 16 }
            if missing == &vec![DossierSection::Documents]
    ));

    upload_all(&pipeline, &profile.id, ChecklistVariant::Full);
    let profile = pipeline.complete_stage(&profile.id, 5).expect("dossier completes");
    assert_eq!(profile.stage5.review_status, ReviewStatus::Approved);
    assert_eq!(profile.stage5.completion_rate, 100);
    assert_eq!(profile.stage6.common.deadline, Some(date(2025, 1, 22)));
}

#[test]
fn dossier_completes_only_once_the_last_document_arrives() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::Commitment);
    pipeline
        .update_stage(&profile.id, 5, dossier_details())
        .expect("dossier data");

    let items = ChecklistVariant::Full.items();
    let (last, rest) = items.split_last().expect("full checklist has items");
    for item in rest {
        pipeline
            .upload_document(&profile.id, item.kind, upload(&format!("{:?}.pdf", item.kind)))
            .expect("upload");
    }

    let error = validation(pipeline.complete_stage(&profile.id, 5).expect_err("one short"));
    assert_eq!(
        error,
        ValidationError::DossierIncomplete {
            missing: vec![DossierSection::Documents],
            uploaded: 15,
            required: 16,
        }
    );

    pipeline
        .upload_document(&profile.id, last.kind, upload("diploma.pdf"))
        .expect("last upload");
    let profile = pipeline.complete_stage(&profile.id, 5).expect("dossier completes");
    assert_eq!(profile.stage5.completed_count, 16);
    assert_eq!(profile.current_stage, Stage::Decision);
}

#[test]
fn switching_the_checklist_variant_recomputes_counts() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);

    pipeline
        .upload_document(&profile.id, DocumentKind::TrainingCommitment, upload("tc.pdf"))
        .expect("shared item");
    pipeline
        .upload_document(&profile.id, DocumentKind::Diploma, upload("diploma.pdf"))
        .expect("full-only item");

    let profile = pipeline
        .update_stage(
            &profile.id,
            5,
            StageUpdate::Dossier(DossierPatch {
                checklist_variant: Some(ChecklistVariant::Simplified),
                ..DossierPatch::default()
            }),
        )
        .expect("variant switch");

    assert_eq!(profile.stage5.required_count, 7);
    assert_eq!(profile.stage5.completed_count, 1);
    assert_eq!(profile.stage5.completion_rate, 14);
    assert!(profile.stage5.completed_count <= profile.stage5.required_count);

    let error = validation(
        pipeline
            .upload_document(&profile.id, DocumentKind::Diploma, upload("again.pdf"))
            .expect_err("not in the simplified list"),
    );
    assert!(matches!(
        error,
        ValidationError::DocumentNotInChecklist {
            document: DocumentKind::Diploma,
            variant: ChecklistVariant::Simplified
        }
    ));
}

#[test]
fn removing_a_document_lowers_the_count() {
    let (pipeline, _, _) = build_pipeline_with(ChecklistVariant::Simplified);
    let profile = open_profile(&pipeline);
    assert_eq!(profile.stage5.required_count, 7);

    let profile = pipeline
        .upload_document(&profile.id, DocumentKind::MentorRemarks, upload("mentor.pdf"))
        .expect("upload");
    assert_eq!(profile.stage5.completed_count, 1);
    assert!(profile.stage5.checklist.is_uploaded(DocumentKind::MentorRemarks));
    assert_eq!(profile.updated_at, opening_day());

    let profile = pipeline
        .remove_document(&profile.id, DocumentKind::MentorRemarks)
        .expect("remove");
    assert_eq!(profile.stage5.completed_count, 0);
    assert_eq!(profile.stage5.completion_rate, 0);
}

#[test]
fn walking_all_stages_completes_the_profile() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);

    let profile = complete_through(&pipeline, &profile.id, Stage::Decision);

    assert_eq!(profile.status, ProfileStatus::Completed);
    assert_eq!(profile.current_stage, Stage::Decision);
    assert_eq!(profile.overall_progress(), 100);
    assert_eq!(profile.stage6.decision, Some(AdmissionDecision::Approved));
    assert_eq!(profile.stage6.decision_date, Some(opening_day()));
    assert_eq!(profile.stage6.agreed_percent, 92);
    for stage in Stage::ordered() {
        assert_eq!(profile.common(stage).status, StageStatus::Completed);
        assert!(profile.common(stage).end_date.is_some());
    }

    let error = validation(pipeline.complete_stage(&profile.id, 6).expect_err("done"));
    assert_eq!(
        error,
        ValidationError::ProfileNotActive {
            status: ProfileStatus::Completed
        }
    );
}

#[test]
fn decision_must_be_recorded() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    complete_through(&pipeline, &profile.id, Stage::Dossier);

    let error = validation(pipeline.complete_stage(&profile.id, 6).expect_err("no decision"));
    assert_eq!(error, ValidationError::DecisionNotRecorded);

    pipeline
        .update_stage(&profile.id, 6, decision(AdmissionDecision::Deferred))
        .expect("decision data");
    let profile = pipeline.complete_stage(&profile.id, 6).expect("any decision completes");
    assert_eq!(profile.status, ProfileStatus::Completed);
}

#[test]
fn suspension_blocks_progress_until_reactivated() {
    let (pipeline, _, _) = build_pipeline();
    let profile = open_profile(&pipeline);
    pipeline
        .update_stage(&profile.id, 2, class_details())
        .expect("class data");

    let suspended = pipeline.suspend(&profile.id).expect("suspend");
    assert_eq!(suspended.status, ProfileStatus::Suspended);
    assert_eq!(suspended.stage2.common.status, StageStatus::InProgress);

    let error = validation(pipeline.complete_stage(&profile.id, 2).expect_err("suspended"));
    assert_eq!(
        error,
        ValidationError::ProfileNotActive {
            status: ProfileStatus::Suspended
        }
    );
    assert!(pipeline
        .update_stage(&profile.id, 2, class_details())
        .is_err());

    let error = validation(pipeline.suspend(&profile.id).expect_err("already suspended"));
    assert!(matches!(error, ValidationError::ProfileNotActive { .. }));

    pipeline.reactivate(&profile.id).expect("reactivate");
    let profile = pipeline.complete_stage(&profile.id, 2).expect("completes");
    assert_eq!(profile.current_stage, Stage::Evaluation);

    let error = validation(pipeline.reactivate(&profile.id).expect_err("not suspended"));
    assert_eq!(
        error,
        ValidationError::ProfileNotSuspended {
            status: ProfileStatus::Active
        }
    );
}

#[test]
fn unknown_profiles_are_not_found() {
    let (pipeline, _, _) = build_pipeline();
    let missing = ProfileId("profile-999999".to_string());

    assert!(matches!(
        pipeline.complete_stage(&missing, 2),
        Err(PipelineError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        pipeline.update_stage(&missing, 2, class_details()),
        Err(PipelineError::NotFound(_))
    ));
    assert!(matches!(
        pipeline.overall_progress(&missing),
        Err(PipelineError::NotFound(_))
    ));
}

#[test]
fn list_profiles_filters_by_status_search_and_stage() {
    let (pipeline, _, _) = build_pipeline();
    let lan = open_profile(&pipeline);
    let tam = pipeline
        .create_profile(new_profile("Vo Thanh Tam"))
        .expect("second profile");
    let ha = pipeline
        .create_profile(new_profile("Dang Thu Ha"))
        .expect("third profile");
    complete_through(&pipeline, &tam.id, Stage::AwarenessClass);
    pipeline.suspend(&ha.id).expect("suspend");

    let all = pipeline.list_profiles(&ProfileFilter::default()).expect("list");
    let ids: Vec<_> = all.iter().map(|profile| profile.id.clone()).collect();
    assert_eq!(ids, vec![lan.id.clone(), tam.id.clone(), ha.id.clone()]);

    let active = pipeline
        .list_profiles(&ProfileFilter {
            status: Some(ProfileStatus::Active),
            ..ProfileFilter::default()
        })
        .expect("list");
    assert_eq!(active.len(), 2);

    let by_name = pipeline
        .list_profiles(&ProfileFilter {
            search: Some("THANH".to_string()),
            ..ProfileFilter::default()
        })
        .expect("list");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, tam.id);

    let by_code = pipeline
        .list_profiles(&ProfileFilter {
            search: Some("hs-2025-003".to_string()),
            ..ProfileFilter::default()
        })
        .expect("list");
    assert_eq!(by_code[0].id, ha.id);

    let at_evaluation = pipeline
        .list_profiles(&ProfileFilter {
            stage: Some(Stage::Evaluation),
            ..ProfileFilter::default()
        })
        .expect("list");
    assert_eq!(at_evaluation.len(), 1);
    assert_eq!(pipeline.overall_progress(&tam.id).expect("progress"), 33);
}

#[test]
fn repository_failures_surface_as_repository_errors() {
    let pipeline = ProfilePipeline::new(
        Arc::new(UnavailableRepository),
        Arc::new(FixedClock::new(opening_day())),
        PipelineSettings::default(),
    );

    assert!(matches!(
        pipeline.create_profile(new_profile("Nguyen Thi Lan")),
        Err(PipelineError::Repository(_))
    ));
    assert!(matches!(
        pipeline.list_profiles(&ProfileFilter::default()),
        Err(PipelineError::Repository(_))
    ));
}
