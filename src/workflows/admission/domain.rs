use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for development profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProfileId(pub String);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six admission stages, numbered 1 to 6 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stage {
    Introduction = 1,
    AwarenessClass = 2,
    Evaluation = 3,
    Commitment = 4,
    Dossier = 5,
    Decision = 6,
}

impl Stage {
    pub const COUNT: usize = 6;

    pub const fn ordered() -> [Self; 6] {
        [
            Self::Introduction,
            Self::AwarenessClass,
            Self::Evaluation,
            Self::Commitment,
            Self::Dossier,
            Self::Decision,
        ]
    }

    pub const fn number(self) -> u8 {
        self as u8
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Introduction),
            2 => Some(Self::AwarenessClass),
            3 => Some(Self::Evaluation),
            4 => Some(Self::Commitment),
            5 => Some(Self::Dossier),
            6 => Some(Self::Decision),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::AwarenessClass => "Awareness Class",
            Self::Evaluation => "Post-Class Evaluation",
            Self::Commitment => "Training Commitment",
            Self::Dossier => "Dossier Completion",
            Self::Decision => "Admission Decision",
        }
    }

    /// Calendar days allotted to the stage once it opens.
    pub const fn duration_days(self) -> u32 {
        match self {
            Self::Introduction => 7,
            Self::AwarenessClass => 180,
            Self::Evaluation => 60,
            Self::Commitment => 365,
            Self::Dossier => 60,
            Self::Decision => 7,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stage {0} does not exist; stages are numbered 1 to 6")]
pub struct UnknownStage(pub u8);

impl TryFrom<u8> for Stage {
    type Error = UnknownStage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(UnknownStage(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    pub const fn tone(self) -> StatusTone {
        match self {
            Self::Pending => StatusTone::Muted,
            Self::InProgress => StatusTone::Primary,
            Self::Completed => StatusTone::Success,
            Self::Failed => StatusTone::Destructive,
        }
    }
}

/// Presentation hint derived from a stage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Muted,
    Primary,
    Success,
    Destructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    #[default]
    Active,
    Completed,
    Suspended,
}

impl ProfileStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialRating {
    Excellent,
    Good,
    Average,
    Fair,
}

impl InitialRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Fair => "Fair",
        }
    }
}

/// Letter grade recorded for the post-class evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    #[default]
    C,
    D,
}

impl Grade {
    /// Advisory band for an overall score: A 8.5–10, B 7.0–8.4, C 5.0–6.9, D below 5.
    pub fn advisory_for(score: f64) -> Self {
        if score >= 8.5 {
            Self::A
        } else if score >= 7.0 {
            Self::B
        } else if score >= 5.0 {
            Self::C
        } else {
            Self::D
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationResult {
    #[default]
    Pass,
    Fail,
    ConditionalPass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionDecision {
    Approved,
    Rejected,
    Deferred,
}

impl AdmissionDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deferred => "deferred",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}
