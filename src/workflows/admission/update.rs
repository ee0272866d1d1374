//! Partial stage updates.
//!
//! Each variant carries only the fields the caller wants to change; `None` leaves the stored
//! value alone. Merging never touches stage status, dates owned by the lifecycle, or
//! `current_stage`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checklist::{ChecklistVariant, DocumentReference};
use super::domain::{
    AdmissionDecision, EvaluationResult, Gender, Grade, InitialRating, ReviewStatus, Stage,
};
use super::guard::ValidationError;
use super::profile::{
    CommitmentTask, DossierEvaluation, PersonalInfo, Profile, WorkHistoryEntry,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageUpdate {
    Introduction(IntroductionPatch),
    AwarenessClass(AwarenessClassPatch),
    Evaluation(EvaluationPatch),
    Commitment(CommitmentPatch),
    Dossier(DossierPatch),
    Decision(DecisionPatch),
}

impl StageUpdate {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Introduction(_) => Stage::Introduction,
            Self::AwarenessClass(_) => Stage::AwarenessClass,
            Self::Evaluation(_) => Stage::Evaluation,
            Self::Commitment(_) => Stage::Commitment,
            Self::Dossier(_) => Stage::Dossier,
            Self::Decision(_) => Stage::Decision,
        }
    }

    /// Reject values the forms never allow, before anything is merged.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Evaluation(patch) => patch.validate(),
            _ => Ok(()),
        }
    }

    /// Merge into `profile`. Callers have already checked that the variant matches the stage.
    pub(crate) fn apply(self, profile: &mut Profile) {
        match self {
            Self::Introduction(patch) => patch.apply(profile),
            Self::AwarenessClass(patch) => patch.apply(profile),
            Self::Evaluation(patch) => patch.apply(profile),
            Self::Commitment(patch) => patch.apply(profile),
            Self::Dossier(patch) => patch.apply(profile),
            Self::Decision(patch) => patch.apply(profile),
        }
    }
}

/// Evaluation sub-scores are marked on a 0 to 10 scale.
pub const MAX_SUB_SCORE: f64 = 10.0;

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroductionPatch {
    pub introducer_name: Option<String>,
    pub introducer_position: Option<String>,
    pub introducer_phone: Option<String>,
    pub introduced_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub initial_rating: Option<InitialRating>,
    pub note: Option<String>,
}

impl IntroductionPatch {
    fn apply(self, profile: &mut Profile) {
        let stage = &mut profile.stage1;
        set(&mut stage.introducer_name, self.introducer_name);
        set(&mut stage.introducer_position, self.introducer_position);
        set(&mut stage.introducer_phone, self.introducer_phone);
        set(&mut stage.introduced_date, self.introduced_date);
        set(&mut stage.reason, self.reason);
        set(&mut stage.initial_rating, self.initial_rating);
        set(&mut stage.common.note, self.note);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwarenessClassPatch {
    pub class_name: Option<String>,
    pub class_code: Option<String>,
    pub instructor: Option<String>,
    pub location: Option<String>,
    pub class_start_date: Option<NaiveDate>,
    pub class_end_date: Option<NaiveDate>,
    pub total_sessions: Option<u32>,
    pub attended_sessions: Option<u32>,
    pub exam_score: Option<f64>,
    pub exam_grade: Option<Grade>,
    pub certificate_number: Option<String>,
    pub note: Option<String>,
}

impl AwarenessClassPatch {
    fn apply(self, profile: &mut Profile) {
        let stage = &mut profile.stage2;
        set(&mut stage.class_name, self.class_name);
        set(&mut stage.class_code, self.class_code);
        set(&mut stage.instructor, self.instructor);
        set(&mut stage.location, self.location);
        set_opt(&mut stage.class_start_date, self.class_start_date);
        set_opt(&mut stage.class_end_date, self.class_end_date);
        set(&mut stage.total_sessions, self.total_sessions);
        set(&mut stage.attended_sessions, self.attended_sessions);
        set_opt(&mut stage.exam_score, self.exam_score);
        set_opt(&mut stage.exam_grade, self.exam_grade);
        set_opt(&mut stage.certificate_number, self.certificate_number);
        set(&mut stage.common.note, self.note);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPatch {
    pub evaluator: Option<String>,
    pub evaluator_position: Option<String>,
    pub political_awareness: Option<f64>,
    pub study_attitude: Option<f64>,
    pub moral_quality: Option<f64>,
    pub grade: Option<Grade>,
    pub evaluator_comments: Option<String>,
    pub agreed_percent: Option<u8>,
    pub result: Option<EvaluationResult>,
    pub note: Option<String>,
}

impl EvaluationPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        let scores = [
            ("political awareness", self.political_awareness),
            ("study attitude", self.study_attitude),
            ("moral quality", self.moral_quality),
        ];
        for (field, score) in scores {
            if let Some(score) = score {
                if !(0.0..=MAX_SUB_SCORE).contains(&score) {
                    return Err(ValidationError::ScoreOutOfRange { field, score });
                }
            }
        }
        Ok(())
    }

    fn apply(self, profile: &mut Profile) {
        let stage = &mut profile.stage3;
        set(&mut stage.evaluator, self.evaluator);
        set(&mut stage.evaluator_position, self.evaluator_position);
        set(&mut stage.political_awareness, self.political_awareness);
        set(&mut stage.study_attitude, self.study_attitude);
        set(&mut stage.moral_quality, self.moral_quality);
        set(&mut stage.grade, self.grade);
        set(&mut stage.evaluator_comments, self.evaluator_comments);
        set(&mut stage.agreed_percent, self.agreed_percent.map(|p| p.min(100)));
        set(&mut stage.result, self.result);
        set(&mut stage.common.note, self.note);
        stage.refresh_overall();
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitmentPatch {
    pub commitment_date: Option<NaiveDate>,
    pub commitment_content: Option<String>,
    pub duration_months: Option<u32>,
    pub mentor_name: Option<String>,
    pub mentor_position: Option<String>,
    pub mentor_phone: Option<String>,
    /// Replaces the whole task list when present.
    pub tasks: Option<Vec<CommitmentTask>>,
    pub note: Option<String>,
}

impl CommitmentPatch {
    fn apply(self, profile: &mut Profile) {
        let stage = &mut profile.stage4;
        set_opt(&mut stage.commitment_date, self.commitment_date);
        set(&mut stage.commitment_content, self.commitment_content);
        set(&mut stage.duration_months, self.duration_months);
        set(&mut stage.mentor_name, self.mentor_name);
        set(&mut stage.mentor_position, self.mentor_position);
        set(&mut stage.mentor_phone, self.mentor_phone);
        set(&mut stage.common.note, self.note);
        if let Some(tasks) = self.tasks {
            stage.tasks = tasks;
            stage.refresh_completion_rate();
        }
    }
}

/// Personal details edited from the dossier form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub unit: Option<String>,
    pub position: Option<String>,
    pub education: Option<String>,
    pub workplace: Option<String>,
}

impl PersonalInfoPatch {
    fn apply(self, info: &mut PersonalInfo) {
        set(&mut info.full_name, self.full_name);
        set_opt(&mut info.date_of_birth, self.date_of_birth);
        set(&mut info.gender, self.gender);
        set(&mut info.id_number, self.id_number);
        set(&mut info.phone, self.phone);
        set(&mut info.email, self.email);
        set(&mut info.address, self.address);
        set(&mut info.unit, self.unit);
        set(&mut info.position, self.position);
        set(&mut info.education, self.education);
        set(&mut info.workplace, self.workplace);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DossierPatch {
    pub personal_info: Option<PersonalInfoPatch>,
    pub work_history: Option<Vec<WorkHistoryEntry>>,
    pub evaluation: Option<DossierEvaluation>,
    pub checklist_variant: Option<ChecklistVariant>,
    pub review_status: Option<ReviewStatus>,
    pub review_comments: Option<String>,
    pub note: Option<String>,
}

impl DossierPatch {
    fn apply(self, profile: &mut Profile) {
        if let Some(info) = self.personal_info {
            info.apply(&mut profile.personal_info);
        }
        let stage = &mut profile.stage5;
        set(&mut stage.work_history, self.work_history);
        set(&mut stage.evaluation, self.evaluation);
        set(&mut stage.checklist_variant, self.checklist_variant);
        set(&mut stage.review_status, self.review_status);
        set_opt(&mut stage.review_comments, self.review_comments);
        set(&mut stage.common.note, self.note);
        stage.refresh_counts();
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionPatch {
    pub meeting_date: Option<NaiveDate>,
    pub total_members: Option<u32>,
    pub present_members: Option<u32>,
    pub agreed_votes: Option<u32>,
    pub disagreed_votes: Option<u32>,
    pub decision: Option<AdmissionDecision>,
    pub decision_number: Option<String>,
    pub decision_date: Option<NaiveDate>,
    pub signer_name: Option<String>,
    pub signer_position: Option<String>,
    pub decision_file: Option<DocumentReference>,
    pub note: Option<String>,
}

impl DecisionPatch {
    fn apply(self, profile: &mut Profile) {
        let stage = &mut profile.stage6;
        set_opt(&mut stage.meeting_date, self.meeting_date);
        set(&mut stage.total_members, self.total_members);
        set(&mut stage.present_members, self.present_members);
        set(&mut stage.agreed_votes, self.agreed_votes);
        set(&mut stage.disagreed_votes, self.disagreed_votes);
        set_opt(&mut stage.decision, self.decision);
        set_opt(&mut stage.decision_number, self.decision_number);
        set_opt(&mut stage.decision_date, self.decision_date);
        set_opt(&mut stage.signer_name, self.signer_name);
        set_opt(&mut stage.signer_position, self.signer_position);
        set_opt(&mut stage.decision_file, self.decision_file);
        set(&mut stage.common.note, self.note);
        stage.refresh_agreed_percent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tag_selects_the_patch() {
        let update: StageUpdate = serde_json::from_value(serde_json::json!({
            "stage": "evaluation",
            "political_awareness": 8.0,
            "study_attitude": 7.5
        }))
        .expect("deserialize");

        assert_eq!(update.stage(), Stage::Evaluation);
        match update {
            StageUpdate::Evaluation(patch) => {
                assert_eq!(patch.political_awareness, Some(8.0));
                assert_eq!(patch.moral_quality, None);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn sub_scores_stay_on_the_ten_point_scale() {
        let inflated = StageUpdate::Evaluation(EvaluationPatch {
            political_awareness: Some(15.0),
            study_attitude: Some(0.0),
            moral_quality: Some(0.0),
            ..EvaluationPatch::default()
        });
        assert_eq!(
            inflated.validate(),
            Err(ValidationError::ScoreOutOfRange {
                field: "political awareness",
                score: 15.0
            })
        );

        let negative = StageUpdate::Evaluation(EvaluationPatch {
            moral_quality: Some(-1.0),
            ..EvaluationPatch::default()
        });
        assert!(negative.validate().is_err());

        let edges = StageUpdate::Evaluation(EvaluationPatch {
            political_awareness: Some(0.0),
            study_attitude: Some(10.0),
            ..EvaluationPatch::default()
        });
        assert_eq!(edges.validate(), Ok(()));
    }

    #[test]
    fn unknown_stage_tag_is_rejected() {
        let result: Result<StageUpdate, _> =
            serde_json::from_value(serde_json::json!({ "stage": "onboarding" }));
        assert!(result.is_err());
    }
}
