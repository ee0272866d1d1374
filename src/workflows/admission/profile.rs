use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checklist::{ChecklistVariant, DocumentChecklist, DocumentReference};
use super::dates::stage_deadline;
use super::domain::{
    AdmissionDecision, EvaluationResult, Gender, Grade, InitialRating, ProfileId, ProfileStatus,
    ReviewStatus, Stage, StageStatus, TaskStatus,
};

/// Fields every stage carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageCommon {
    pub status: StageStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub note: String,
}

impl StageCommon {
    fn open(&mut self, today: NaiveDate, stage: Stage, note: &str) {
        self.status = StageStatus::InProgress;
        self.start_date = Some(today);
        self.deadline = Some(stage_deadline(today, stage));
        self.note = note.to_string();
    }

    fn close(&mut self, today: NaiveDate) {
        self.status = StageStatus::Completed;
        self.end_date = Some(today);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub id_number: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub unit: String,
    pub position: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub workplace: String,
}

impl PersonalInfo {
    /// Fields the dossier stage insists on.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.full_name.trim().is_empty() {
            missing.push("full name");
        }
        if self.date_of_birth.is_none() {
            missing.push("date of birth");
        }
        if self.id_number.trim().is_empty() {
            missing.push("id number");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroductionStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub introducer_name: String,
    pub introducer_position: String,
    pub introducer_phone: String,
    pub introduced_date: NaiveDate,
    pub reason: String,
    pub initial_rating: InitialRating,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AwarenessClassStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub class_name: String,
    pub class_code: String,
    pub instructor: String,
    pub location: String,
    pub class_start_date: Option<NaiveDate>,
    pub class_end_date: Option<NaiveDate>,
    pub total_sessions: u32,
    pub attended_sessions: u32,
    pub exam_score: Option<f64>,
    pub exam_grade: Option<Grade>,
    pub certificate_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub evaluation_date: Option<NaiveDate>,
    pub evaluator: String,
    pub evaluator_position: String,
    pub political_awareness: f64,
    pub study_attitude: f64,
    pub moral_quality: f64,
    pub overall_score: f64,
    pub grade: Grade,
    pub evaluator_comments: String,
    pub agreed_percent: u8,
    pub result: EvaluationResult,
}

impl EvaluationStage {
    /// Mean of the three sub-scores rounded to one decimal place.
    pub fn compute_overall(political_awareness: f64, study_attitude: f64, moral_quality: f64) -> f64 {
        let mean = (political_awareness + study_attitude + moral_quality) / 3.0;
        (mean * 10.0).round() / 10.0
    }

    pub(crate) fn refresh_overall(&mut self) {
        self.overall_score =
            Self::compute_overall(self.political_awareness, self.study_attitude, self.moral_quality);
    }

    pub fn advisory_grade(&self) -> Grade {
        Grade::advisory_for(self.overall_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentTask {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    pub completed_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub commitment_date: Option<NaiveDate>,
    pub commitment_content: String,
    pub duration_months: u32,
    pub mentor_name: String,
    pub mentor_position: String,
    pub mentor_phone: String,
    pub tasks: Vec<CommitmentTask>,
    pub completion_rate: u8,
}

impl Default for CommitmentStage {
    fn default() -> Self {
        Self {
            common: StageCommon::default(),
            commitment_date: None,
            commitment_content: String::new(),
            duration_months: 12,
            mentor_name: String::new(),
            mentor_position: String::new(),
            mentor_phone: String::new(),
            tasks: Vec::new(),
            completion_rate: 0,
        }
    }
}

impl CommitmentStage {
    pub(crate) fn refresh_completion_rate(&mut self) {
        self.completion_rate = percentage(
            self.tasks
                .iter()
                .filter(|task| task.status == TaskStatus::Completed)
                .count(),
            self.tasks.len(),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    pub period: String,
    pub position: String,
    pub unit: String,
    pub description: String,
}

impl WorkHistoryEntry {
    pub fn is_filled(&self) -> bool {
        !self.period.trim().is_empty() && !self.position.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DossierEvaluation {
    pub party_evaluation: String,
    pub union_evaluation: String,
    pub training_result: String,
    pub mentor_comment: String,
}

impl DossierEvaluation {
    pub fn is_filled(&self) -> bool {
        !self.party_evaluation.trim().is_empty() && !self.training_result.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DossierStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub checklist_variant: ChecklistVariant,
    pub checklist: DocumentChecklist,
    pub required_count: usize,
    pub completed_count: usize,
    pub completion_rate: u8,
    pub review_status: ReviewStatus,
    pub review_comments: Option<String>,
    pub work_history: Vec<WorkHistoryEntry>,
    pub evaluation: DossierEvaluation,
}

impl DossierStage {
    pub fn new(variant: ChecklistVariant) -> Self {
        Self {
            common: StageCommon::default(),
            checklist_variant: variant,
            checklist: DocumentChecklist::default(),
            required_count: variant.required_count(),
            completed_count: 0,
            completion_rate: 0,
            review_status: ReviewStatus::Pending,
            review_comments: None,
            work_history: Vec::new(),
            evaluation: DossierEvaluation::default(),
        }
    }

    /// Counts are derived from the checklist so `completed_count` can never exceed `required_count`.
    pub(crate) fn refresh_counts(&mut self) {
        self.required_count = self.checklist_variant.required_count();
        self.completed_count = self.checklist.completed_count(self.checklist_variant);
        self.completion_rate = percentage(self.completed_count, self.required_count);
    }

    pub fn work_history_filled(&self) -> bool {
        !self.work_history.is_empty() && self.work_history.iter().all(WorkHistoryEntry::is_filled)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionStage {
    #[serde(flatten)]
    pub common: StageCommon,
    pub meeting_date: Option<NaiveDate>,
    pub total_members: u32,
    pub present_members: u32,
    pub agreed_votes: u32,
    pub disagreed_votes: u32,
    pub agreed_percent: u8,
    pub decision: Option<AdmissionDecision>,
    pub decision_number: Option<String>,
    pub decision_date: Option<NaiveDate>,
    pub signer_name: Option<String>,
    pub signer_position: Option<String>,
    pub decision_file: Option<DocumentReference>,
}

impl DecisionStage {
    pub(crate) fn refresh_agreed_percent(&mut self) {
        self.agreed_percent = percentage(self.agreed_votes as usize, self.present_members as usize);
    }
}

/// Data needed to open a profile; every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub full_name: String,
    pub unit: String,
    pub introduced_date: Option<NaiveDate>,
    pub introducer_name: String,
    pub initial_rating: Option<InitialRating>,
}

/// One admission case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub code: String,
    pub status: ProfileStatus,
    pub current_stage: Stage,
    pub personal_info: PersonalInfo,
    pub stage1: IntroductionStage,
    pub stage2: AwarenessClassStage,
    pub stage3: EvaluationStage,
    pub stage4: CommitmentStage,
    pub stage5: DossierStage,
    pub stage6: DecisionStage,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
}

impl Profile {
    /// Build a profile whose introduction is already recorded and whose awareness class is open.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        id: ProfileId,
        code: String,
        full_name: String,
        unit: String,
        introducer_name: String,
        introduced_date: NaiveDate,
        initial_rating: InitialRating,
        variant: ChecklistVariant,
        today: NaiveDate,
    ) -> Self {
        let stage1 = IntroductionStage {
            common: StageCommon {
                status: StageStatus::Completed,
                start_date: Some(today),
                end_date: Some(today),
                deadline: Some(today),
                note: "Introduction recorded".to_string(),
            },
            introducer_name,
            introducer_position: String::new(),
            introducer_phone: String::new(),
            introduced_date,
            reason: String::new(),
            initial_rating,
        };

        let mut stage2 = AwarenessClassStage::default();
        stage2
            .common
            .open(today, Stage::AwarenessClass, "Waiting for class enrolment");

        Self {
            id,
            code,
            status: ProfileStatus::Active,
            current_stage: Stage::AwarenessClass,
            personal_info: PersonalInfo {
                full_name,
                unit,
                ..PersonalInfo::default()
            },
            stage1,
            stage2,
            stage3: EvaluationStage::default(),
            stage4: CommitmentStage::default(),
            stage5: DossierStage::new(variant),
            stage6: DecisionStage::default(),
            created_at: today,
            updated_at: today,
        }
    }

    pub fn common(&self, stage: Stage) -> &StageCommon {
        match stage {
            Stage::Introduction => &self.stage1.common,
            Stage::AwarenessClass => &self.stage2.common,
            Stage::Evaluation => &self.stage3.common,
            Stage::Commitment => &self.stage4.common,
            Stage::Dossier => &self.stage5.common,
            Stage::Decision => &self.stage6.common,
        }
    }

    pub(crate) fn common_mut(&mut self, stage: Stage) -> &mut StageCommon {
        match stage {
            Stage::Introduction => &mut self.stage1.common,
            Stage::AwarenessClass => &mut self.stage2.common,
            Stage::Evaluation => &mut self.stage3.common,
            Stage::Commitment => &mut self.stage4.common,
            Stage::Dossier => &mut self.stage5.common,
            Stage::Decision => &mut self.stage6.common,
        }
    }

    pub fn completed_stages(&self) -> usize {
        Stage::ordered()
            .into_iter()
            .filter(|stage| self.common(*stage).status == StageStatus::Completed)
            .count()
    }

    /// Completed stages over six, as a rounded percentage.
    pub fn overall_progress(&self) -> u8 {
        percentage(self.completed_stages(), Stage::COUNT)
    }

    /// The stage currently accepting work, if the profile is still moving.
    pub fn open_stage(&self) -> Option<Stage> {
        let stage = self.current_stage;
        (self.common(stage).status == StageStatus::InProgress).then_some(stage)
    }

    /// Apply a successful completion of `stage`. Preconditions are checked by the guard.
    pub(crate) fn advance(&mut self, stage: Stage, today: NaiveDate) {
        self.common_mut(stage).close(today);

        match stage {
            Stage::Introduction | Stage::AwarenessClass => {}
            Stage::Evaluation => {
                self.stage3.evaluation_date = Some(today);
                self.stage3.result = EvaluationResult::Pass;
            }
            Stage::Commitment => {
                self.stage4.completion_rate = 100;
            }
            Stage::Dossier => {
                self.stage5.review_status = ReviewStatus::Approved;
                self.stage5.completion_rate = 100;
                self.stage5.common.note = "Dossier complete".to_string();
            }
            Stage::Decision => {
                if self.stage6.decision_date.is_none() {
                    self.stage6.decision_date = Some(today);
                }
            }
        }

        match stage.next() {
            Some(next) => {
                self.common_mut(next).open(today, next, opening_note(next));
                self.current_stage = next;
            }
            None => {
                self.status = ProfileStatus::Completed;
            }
        }

        self.updated_at = today;
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.personal_info.full_name.to_lowercase().contains(&needle)
            || self.code.to_lowercase().contains(&needle)
    }
}

fn opening_note(stage: Stage) -> &'static str {
    match stage {
        Stage::Introduction => "Recording introduction",
        Stage::AwarenessClass => "Waiting for class enrolment",
        Stage::Evaluation => "Waiting for post-class evaluation",
        Stage::Commitment => "Waiting for training commitment",
        Stage::Dossier => "Waiting for dossier completion",
        Stage::Decision => "Waiting for admission decision",
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_score_rounds_to_one_decimal() {
        assert_eq!(EvaluationStage::compute_overall(6.0, 7.0, 8.0), 7.0);
        assert_eq!(EvaluationStage::compute_overall(4.0, 4.0, 4.0), 4.0);
        assert_eq!(EvaluationStage::compute_overall(8.0, 8.5, 9.0), 8.5);
        assert_eq!(EvaluationStage::compute_overall(7.0, 7.0, 8.0), 7.3);
        assert_eq!(EvaluationStage::compute_overall(9.0, 9.0, 8.0), 8.7);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(3, 6), 50);
        assert_eq!(percentage(1, 6), 17);
        assert_eq!(percentage(5, 6), 83);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(35, 45), 78);
    }

    #[test]
    fn dossier_counts_follow_the_variant() {
        let mut dossier = DossierStage::new(ChecklistVariant::Full);
        assert_eq!(dossier.required_count, 16);
        dossier.checklist_variant = ChecklistVariant::Simplified;
        dossier.refresh_counts();
        assert_eq!(dossier.required_count, 7);
        assert_eq!(dossier.completed_count, 0);
    }

    #[test]
    fn commitment_rate_tracks_completed_tasks() {
        let mut commitment = CommitmentStage::default();
        commitment.tasks = vec![
            CommitmentTask {
                id: "t1".to_string(),
                name: "Volunteer day".to_string(),
                status: TaskStatus::Completed,
                completed_date: None,
            },
            CommitmentTask {
                id: "t2".to_string(),
                name: "Study group".to_string(),
                status: TaskStatus::InProgress,
                completed_date: None,
            },
        ];
        commitment.refresh_completion_rate();
        assert_eq!(commitment.completion_rate, 50);
    }

    #[test]
    fn work_history_needs_period_and_position() {
        let mut dossier = DossierStage::new(ChecklistVariant::Full);
        assert!(!dossier.work_history_filled());
        dossier.work_history.push(WorkHistoryEntry {
            period: "2019-2023".to_string(),
            position: String::new(),
            ..WorkHistoryEntry::default()
        });
        assert!(!dossier.work_history_filled());
        dossier.work_history[0].position = "Engineer".to_string();
        assert!(dossier.work_history_filled());
    }
}
