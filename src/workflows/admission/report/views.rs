use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{Grade, ProfileId, ProfileStatus, Stage, StageStatus, StatusTone};
use super::super::guard::DossierProgress;
use super::super::profile::Profile;

/// Row shown in profile listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: ProfileId,
    pub code: String,
    pub full_name: String,
    pub unit: String,
    pub status: ProfileStatus,
    pub current_stage: Stage,
    pub stage_label: &'static str,
    pub progress: u8,
    pub open_deadline: Option<NaiveDate>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            code: profile.code.clone(),
            full_name: profile.personal_info.full_name.clone(),
            unit: profile.personal_info.unit.clone(),
            status: profile.status,
            current_stage: profile.current_stage,
            stage_label: profile.current_stage.label(),
            progress: profile.overall_progress(),
            open_deadline: profile
                .open_stage()
                .and_then(|stage| profile.common(stage).deadline),
        }
    }
}

/// One stage of the progress timeline on the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct StageTimelineEntry {
    pub stage: Stage,
    pub stage_label: &'static str,
    pub status: StageStatus,
    pub status_label: &'static str,
    pub tone: StatusTone,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

/// Full profile plus derived fields for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDetail {
    pub progress: u8,
    pub timeline: Vec<StageTimelineEntry>,
    pub dossier: DossierProgress,
    pub advisory_grade: Grade,
    pub profile: Profile,
}

impl From<&Profile> for ProfileDetail {
    fn from(profile: &Profile) -> Self {
        let timeline = Stage::ordered()
            .into_iter()
            .map(|stage| {
                let common = profile.common(stage);
                StageTimelineEntry {
                    stage,
                    stage_label: stage.label(),
                    status: common.status,
                    status_label: common.status.label(),
                    tone: common.status.tone(),
                    start_date: common.start_date,
                    end_date: common.end_date,
                    deadline: common.deadline,
                }
            })
            .collect();

        Self {
            progress: profile.overall_progress(),
            timeline,
            dossier: DossierProgress::of(profile),
            advisory_grade: profile.stage3.advisory_grade(),
            profile: profile.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageCount {
    pub stage: Stage,
    pub stage_label: &'static str,
    pub active: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverdueStage {
    pub profile_id: ProfileId,
    pub code: String,
    pub full_name: String,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub deadline: NaiveDate,
    pub days_overdue: i64,
}

/// Stage 3 grade that disagrees with the band its overall score falls in.
#[derive(Debug, Clone, Serialize)]
pub struct GradeAdvisory {
    pub profile_id: ProfileId,
    pub code: String,
    pub overall_score: f64,
    pub recorded: Grade,
    pub advised: Grade,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReportSummary {
    pub as_of: NaiveDate,
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub suspended: usize,
    pub average_progress: f64,
    pub by_stage: Vec<StageCount>,
    pub overdue: Vec<OverdueStage>,
    pub grade_advisories: Vec<GradeAdvisory>,
}
