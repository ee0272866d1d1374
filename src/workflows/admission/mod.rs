//! Six-stage admission pipeline for development profiles.
//!
//! A profile is opened with its introduction already recorded and then moves through the
//! awareness class, post-class evaluation, training commitment, dossier completion and the
//! admission decision. Each stage has its own data shape and completion precondition; the
//! guard checks preconditions before anything is mutated, and the repository swaps whole
//! snapshots so a rejected transition leaves no trace.

pub mod blueprint;
pub mod checklist;
pub mod clock;
pub mod dates;
pub mod domain;
pub mod guard;
pub mod profile;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod update;

#[cfg(test)]
mod tests;

pub use blueprint::{AdmissionBlueprint, StageTemplate};
pub use checklist::{
    ChecklistItem, ChecklistVariant, DocumentChecklist, DocumentGroup, DocumentKind,
    DocumentReference,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    AdmissionDecision, EvaluationResult, Gender, Grade, InitialRating, ProfileId, ProfileStatus,
    ReviewStatus, Stage, StageStatus, StatusTone, TaskStatus, UnknownStage,
};
pub use guard::{DossierProgress, DossierSection, ValidationError, MINIMUM_EVALUATION_SCORE};
pub use profile::{
    AwarenessClassStage, CommitmentStage, CommitmentTask, DecisionStage, DossierEvaluation,
    DossierStage, EvaluationStage, IntroductionStage, NewProfile, PersonalInfo, Profile,
    StageCommon, WorkHistoryEntry,
};
pub use report::{export_csv, PipelineReport, PipelineReportSummary, ProfileDetail, ProfileView};
pub use repository::{MemoryProfileRepository, ProfileRepository, RepositoryError};
pub use router::admission_router;
pub use service::{DocumentUpload, PipelineError, PipelineSettings, ProfileFilter, ProfilePipeline};
pub use update::{
    AwarenessClassPatch, CommitmentPatch, DecisionPatch, DossierPatch, EvaluationPatch,
    IntroductionPatch, PersonalInfoPatch, StageUpdate,
};
