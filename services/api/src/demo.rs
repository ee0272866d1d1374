use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::Args;
use party_admission::error::AppError;
use party_admission::storage::MemoryBlobStore;
use party_admission::workflows::admission::dates::{add_days, format_display};
use party_admission::workflows::admission::{
    AdmissionBlueprint, AdmissionDecision, AwarenessClassPatch, ChecklistVariant, Clock, CommitmentPatch,
    CommitmentTask, DecisionPatch, DocumentUpload, DossierEvaluation, DossierPatch,
    EvaluationPatch, FixedClock, Grade, InitialRating, MemoryProfileRepository, NewProfile,
    PersonalInfoPatch, PipelineReport, PipelineSettings, Profile, ProfilePipeline, Stage,
    StageUpdate, TaskStatus, WorkHistoryEntry,
};
use party_admission::workflows::notifications::NotificationService;
use party_admission::workflows::registry::MemberRegistry;
use party_admission::workflows::targets::{NewTarget, TargetBook};
use std::sync::Arc;

fn parse_variant(raw: &str) -> Result<ChecklistVariant, String> {
    ChecklistVariant::parse(raw).ok_or_else(|| format!("'{raw}' is not 'full' or 'simplified'"))
}

#[derive(Args, Debug, Default)]
pub(crate) struct StagesArgs {
    /// Checklist to list under the dossier stage (full or simplified)
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Option<ChecklistVariant>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Day the sample profile is opened (YYYY-MM-DD or dd/mm/yyyy). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Checklist used for the sample dossier (full or simplified)
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Option<ChecklistVariant>,
    /// Days ahead that count as "due soon" for notices
    #[arg(long, default_value_t = 30)]
    pub(crate) lookahead_days: u32,
}

pub(crate) fn run_stages(args: StagesArgs) -> Result<(), AppError> {
    let variant = args.variant.unwrap_or_default();
    let blueprint = AdmissionBlueprint::standard();

    println!("Admission stages");
    for template in blueprint.stage_templates() {
        println!(
            "\n{}. {} ({} days)",
            template.stage.number(),
            template.name,
            template.duration_days
        );
        for requirement in &template.requirements {
            println!("  requires: {requirement}");
        }
        for effect in &template.on_completion {
            println!("  on close: {effect}");
        }
    }

    println!(
        "\nDossier checklist ({:?}, {} documents)",
        variant,
        variant.required_count()
    );
    let mut group = None;
    for item in variant.items() {
        if group != Some(item.group) {
            println!("  {}", item.group.label());
            group = Some(item.group);
        }
        println!("    - {}", item.kind.label());
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start,
        variant,
        lookahead_days,
    } = args;

    let start = start.unwrap_or_else(|| Local::now().date_naive());
    let variant = variant.unwrap_or_default();
    let clock = Arc::new(FixedClock::new(start));
    let pipeline = ProfilePipeline::new(
        Arc::new(MemoryProfileRepository::new()),
        clock.clone(),
        PipelineSettings {
            checklist_variant: variant,
        },
    );

    println!("Admission pipeline demo (opened {})", format_display(start));
    let profile = pipeline.create_profile(NewProfile {
        full_name: "Nguyen Thi Lan".to_string(),
        unit: "Cell 3 - Engineering".to_string(),
        introduced_date: Some(start),
        introducer_name: "Tran Van Minh".to_string(),
        initial_rating: Some(InitialRating::Good),
    })?;
    let id = profile.id.clone();
    println!("- Opened {} as {}", profile.personal_info.full_name, profile.code);
    print_open_stage(&profile);

    clock.advance_days(20);
    pipeline.update_stage(&id, 2, class_details(start))?;
    print_closed(&pipeline.complete_stage(&id, 2)?, Stage::AwarenessClass);

    clock.advance_days(10);
    if let Err(err) = pipeline.complete_stage(&id, 3) {
        println!("  Closing the evaluation without scores is rejected: {err}");
    }
    pipeline.update_stage(&id, 3, evaluation_scores())?;
    let profile = pipeline.complete_stage(&id, 3)?;
    print_closed(&profile, Stage::Evaluation);
    println!(
        "  Overall score {:.1}, grade {:?}",
        profile.stage3.overall_score, profile.stage3.grade
    );

    clock.advance_days(30);
    pipeline.update_stage(&id, 4, commitment_details(clock.today()))?;
    print_closed(&pipeline.complete_stage(&id, 4)?, Stage::Commitment);

    clock.advance_days(20);
    for item in variant.items() {
        pipeline.upload_document(
            &id,
            item.kind,
            DocumentUpload {
                file_name: format!("{:?}.pdf", item.kind),
                size_bytes: 2048,
                media_type: Some("application/pdf".to_string()),
            },
        )?;
    }
    pipeline.update_stage(&id, 5, dossier_details())?;
    print_closed(&pipeline.complete_stage(&id, 5)?, Stage::Dossier);

    clock.advance_days(15);
    pipeline.update_stage(&id, 6, decision())?;
    let profile = pipeline.complete_stage(&id, 6)?;
    print_closed(&profile, Stage::Decision);
    println!(
        "  {} of {} present members agreed ({}%)",
        profile.stage6.agreed_votes, profile.stage6.present_members, profile.stage6.agreed_percent
    );

    let profiles = pipeline.snapshot()?;
    let summary = PipelineReport::build(&profiles, clock.today()).summary();
    println!(
        "\nPipeline on {}: {} profile(s), {} completed, average progress {:.1}%",
        format_display(summary.as_of),
        summary.total,
        summary.completed,
        summary.average_progress
    );

    let store = Arc::new(MemoryBlobStore::default());
    let registry = MemberRegistry::new(store.clone());
    let member = registry.convert_profile(&profile, clock.today())?;
    println!(
        "\nRegistered member #{} ({}) joined {}, probation ends {}",
        member.id,
        member.status.label(),
        format_display(member.join_date),
        format_display(member.probation_end_date)
    );
    if let Err(err) = registry.convert_profile(&profile, clock.today()) {
        println!("  A second conversion is refused: {err}");
    }

    clock.set(member.probation_end_date - Duration::days(10));
    let notices = NotificationService::new(store.clone(), lookahead_days);
    let drafts = notices.check_probation_deadlines(&registry.list()?, clock.today());
    let published = notices.publish(drafts, clock.today())?;
    println!("\nNotices on {}", format_display(clock.today()));
    for notice in &published {
        println!("  [{:?}] {} ({})", notice.kind, notice.title, notice.description);
    }
    if published.is_empty() {
        println!("  none due within {lookahead_days} days");
    }

    let targets = TargetBook::new(store);
    let target = targets.add(NewTarget {
        unit: member.unit.clone(),
        year: clock.today().year(),
        training_target: 25,
        recruitment_target: 20,
        training_done: 20,
        recruitment_done: 15,
    })?;
    println!(
        "\nTarget for {} in {}: {}% ({:?})",
        target.unit,
        target.year,
        target.rate(),
        target.band()
    );

    Ok(())
}

fn print_open_stage(profile: &Profile) {
    if let Some(stage) = profile.open_stage() {
        let deadline = profile
            .common(stage)
            .deadline
            .map(format_display)
            .unwrap_or_else(|| "-".to_string());
        println!("  Now at stage {} {} (due {})", stage.number(), stage.label(), deadline);
    }
}

fn print_closed(profile: &Profile, stage: Stage) {
    let closed = profile
        .common(stage)
        .end_date
        .map(format_display)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "- Stage {} {} closed on {} (progress {}%)",
        stage.number(),
        stage.label(),
        closed,
        profile.overall_progress()
    );
    print_open_stage(profile);
}

fn class_details(start: NaiveDate) -> StageUpdate {
    StageUpdate::AwarenessClass(AwarenessClassPatch {
        class_name: Some("Party awareness class".to_string()),
        class_code: Some("LCT-01".to_string()),
        class_start_date: Some(add_days(start, 5)),
        class_end_date: Some(add_days(start, 16)),
        total_sessions: Some(10),
        attended_sessions: Some(10),
        exam_score: Some(8.5),
        exam_grade: Some(Grade::A),
        ..AwarenessClassPatch::default()
    })
}

fn evaluation_scores() -> StageUpdate {
    StageUpdate::Evaluation(EvaluationPatch {
        evaluator: Some("Le Quang Huy".to_string()),
        political_awareness: Some(8.0),
        study_attitude: Some(7.5),
        moral_quality: Some(8.5),
        grade: Some(Grade::B),
        ..EvaluationPatch::default()
    })
}

fn commitment_details(today: NaiveDate) -> StageUpdate {
    StageUpdate::Commitment(CommitmentPatch {
        commitment_content: Some("Lead the youth union volunteer programme".to_string()),
        mentor_name: Some("Pham Duc Anh".to_string()),
        tasks: Some(vec![CommitmentTask {
            id: "task-1".to_string(),
            name: "Volunteer weekend".to_string(),
            status: TaskStatus::Completed,
            completed_date: Some(today),
        }]),
        ..CommitmentPatch::default()
    })
}

fn dossier_details() -> StageUpdate {
    StageUpdate::Dossier(DossierPatch {
        personal_info: Some(PersonalInfoPatch {
            date_of_birth: NaiveDate::from_ymd_opt(1998, 6, 21),
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

fn decision() -> StageUpdate {
    StageUpdate::Decision(DecisionPatch {
        present_members: Some(12),
        agreed_votes: Some(11),
        disagreed_votes: Some(1),
        decision: Some(AdmissionDecision::Approved),
        decision_number: Some("QD-118".to_string()),
        ..DecisionPatch::default()
    })
}
