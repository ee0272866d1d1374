use serde::Serialize;

use super::checklist::{ChecklistVariant, DocumentKind};
use super::domain::{ProfileStatus, Stage, StageStatus};
use super::profile::Profile;

/// Lowest overall evaluation score that lets stage 3 complete.
pub const MINIMUM_EVALUATION_SCORE: f64 = 5.0;

/// Dossier sections checked before stage 5 can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DossierSection {
    PersonalInfo,
    WorkHistory,
    Evaluation,
    Documents,
}

impl DossierSection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalInfo => "personal information",
            Self::WorkHistory => "work history",
            Self::Evaluation => "evaluation narratives",
            Self::Documents => "supporting documents",
        }
    }
}

/// Recoverable rejection naming the unmet precondition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("stage {number} does not exist; stages are numbered 1 to 6")]
    UnknownStage { number: u8 },
    #[error("profile is {}; only active profiles accept changes", status.label())]
    ProfileNotActive { status: ProfileStatus },
    #[error("profile is {}; only suspended profiles can be reactivated", status.label())]
    ProfileNotSuspended { status: ProfileStatus },
    #[error("stage {stage} is not open; the profile is at stage {current_stage}")]
    StageNotOpen { stage: Stage, current_stage: Stage },
    #[error("update carries stage {update} data but targets stage {requested}")]
    StageMismatch { requested: Stage, update: Stage },
    #[error("awareness class is missing {}", missing.join(", "))]
    ClassDetailsIncomplete { missing: Vec<&'static str> },
    #[error("{field} score {score} is outside the 0 to 10 scale")]
    ScoreOutOfRange { field: &'static str, score: f64 },
    #[error("overall evaluation score {score:.1} is below the minimum of {minimum:.1}")]
    ScoreBelowThreshold { score: f64, minimum: f64 },
    #[error("training commitment is missing {}", missing.join(", "))]
    CommitmentIncomplete { missing: Vec<&'static str> },
    #[error(
        "dossier is incomplete ({uploaded}/{required} documents): missing {}",
        missing.iter().map(|section| section.label()).collect::<Vec<_>>().join(", ")
    )]
    DossierIncomplete {
        missing: Vec<DossierSection>,
        uploaded: usize,
        required: usize,
    },
    #[error("{} is not part of the {variant:?} checklist", document.label())]
    DocumentNotInChecklist {
        document: DocumentKind,
        variant: ChecklistVariant,
    },
    #[error("an admission decision must be recorded first")]
    DecisionNotRecorded,
}

/// Section-by-section view of the dossier requirements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DossierProgress {
    pub personal_info: bool,
    pub work_history: bool,
    pub evaluation: bool,
    pub documents: bool,
    pub uploaded: usize,
    pub required: usize,
    pub missing_documents: Vec<DocumentKind>,
}

impl DossierProgress {
    pub fn of(profile: &Profile) -> Self {
        let dossier = &profile.stage5;
        let uploaded = dossier.checklist.completed_count(dossier.checklist_variant);
        let required = dossier.checklist_variant.required_count();
        Self {
            personal_info: profile.personal_info.missing_required().is_empty(),
            work_history: dossier.work_history_filled(),
            evaluation: dossier.evaluation.is_filled(),
            documents: uploaded == required,
            uploaded,
            required,
            missing_documents: dossier.checklist.missing(dossier.checklist_variant),
        }
    }

    pub fn missing(&self) -> Vec<DossierSection> {
        [
            (self.personal_info, DossierSection::PersonalInfo),
            (self.work_history, DossierSection::WorkHistory),
            (self.evaluation, DossierSection::Evaluation),
            (self.documents, DossierSection::Documents),
        ]
        .into_iter()
        .filter(|(done, _)| !done)
        .map(|(_, section)| section)
        .collect()
    }
}

/// The profile must be active before stage data may change.
pub(crate) fn ensure_active(profile: &Profile) -> Result<(), ValidationError> {
    if profile.status == ProfileStatus::Active {
        Ok(())
    } else {
        Err(ValidationError::ProfileNotActive {
            status: profile.status,
        })
    }
}

/// Every precondition for completing `stage`. Nothing is mutated.
pub(crate) fn check_completion(profile: &Profile, stage: Stage) -> Result<(), ValidationError> {
    ensure_active(profile)?;

    if stage != profile.current_stage
        || profile.common(stage).status != StageStatus::InProgress
    {
        return Err(ValidationError::StageNotOpen {
            stage,
            current_stage: profile.current_stage,
        });
    }

    match stage {
        Stage::Introduction => Ok(()),
        Stage::AwarenessClass => {
            let class = &profile.stage2;
            let mut missing = Vec::new();
            if class.class_name.trim().is_empty() {
                missing.push("class name");
            }
            if class.class_start_date.is_none() {
                missing.push("class start date");
            }
            if class.class_end_date.is_none() {
                missing.push("class end date");
            }
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::ClassDetailsIncomplete { missing })
            }
        }
        Stage::Evaluation => {
            let score = profile.stage3.overall_score;
            if score >= MINIMUM_EVALUATION_SCORE {
                Ok(())
            } else {
                Err(ValidationError::ScoreBelowThreshold {
                    score,
                    minimum: MINIMUM_EVALUATION_SCORE,
                })
            }
        }
        Stage::Commitment => {
            let commitment = &profile.stage4;
            let mut missing = Vec::new();
            if commitment.commitment_content.trim().is_empty() {
                missing.push("commitment content");
            }
            if commitment.mentor_name.trim().is_empty() {
                missing.push("mentor name");
            }
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::CommitmentIncomplete { missing })
            }
        }
        Stage::Dossier => {
            let progress = DossierProgress::of(profile);
            let missing = progress.missing();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::DossierIncomplete {
                    missing,
                    uploaded: progress.uploaded,
                    required: progress.required,
                })
            }
        }
        Stage::Decision => {
            if profile.stage6.decision.is_some() {
                Ok(())
            } else {
                Err(ValidationError::DecisionNotRecorded)
            }
        }
    }
}
