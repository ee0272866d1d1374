//! Supporting-document checklist for the dossier stage.
//!
//! Two checklist shapes exist: the full sixteen-item list grouped by category and the
//! seven-item list used by the quick dossier form. Which one a profile uses is stored on
//! the dossier stage itself; the engine only records which items have a reference.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    BackgroundDeclaration,
    Autobiography,
    BirthCertificate,
    IdentityCard,
    PoliceClearance,
    ResidenceConfirmation,
    EmployerConfirmation,
    MembershipApplication,
    AwarenessCertificate,
    TrainingCommitment,
    TrainingEvaluationMinutes,
    PublicOpinionSurvey,
    SelfAssessment,
    CellRemarks,
    Diploma,
    SelfDeclaredBackground,
    CommitteeAndUnionRemarks,
    MentorRemarks,
    StrivingSelfReview,
    PhotoAndIdScan,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resume => "Resume with 4x6 photo",
            Self::BackgroundDeclaration => "Background declaration form",
            Self::Autobiography => "Autobiography",
            Self::BirthCertificate => "Birth certificate (certified copy)",
            Self::IdentityCard => "Identity card (certified copy)",
            Self::PoliceClearance => "Police clearance of criminal record",
            Self::ResidenceConfirmation => "Confirmation from place of residence",
            Self::EmployerConfirmation => "Confirmation from employer",
            Self::MembershipApplication => "Handwritten membership application",
            Self::AwarenessCertificate => "Awareness class certificate",
            Self::TrainingCommitment => "Training commitment",
            Self::TrainingEvaluationMinutes => "Training evaluation minutes",
            Self::PublicOpinionSurvey => "Public opinion survey (at least 20 forms)",
            Self::SelfAssessment => "Self assessment",
            Self::CellRemarks => "Remarks of the party cell",
            Self::Diploma => "Highest diploma",
            Self::SelfDeclaredBackground => "Self-declared background (form 2C)",
            Self::CommitteeAndUnionRemarks => "Remarks of the cell committee and unions",
            Self::MentorRemarks => "Remarks of the guiding member",
            Self::StrivingSelfReview => "Self review of the striving period",
            Self::PhotoAndIdScan => "3x4 photo and identity card scan",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentGroup {
    PersonalRecords,
    IdentityVerification,
    PartyRecords,
    EvaluationRecords,
    Education,
    Dossier,
}

impl DocumentGroup {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PersonalRecords => "Personal records",
            Self::IdentityVerification => "Identity verification",
            Self::PartyRecords => "Party records",
            Self::EvaluationRecords => "Evaluation records",
            Self::Education => "Education",
            Self::Dossier => "Dossier",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub kind: DocumentKind,
    pub group: DocumentGroup,
    pub required: bool,
}

const FULL_CHECKLIST: [ChecklistItem; 16] = [
    item(DocumentKind::Resume, DocumentGroup::PersonalRecords),
    item(DocumentKind::BackgroundDeclaration, DocumentGroup::PersonalRecords),
    item(DocumentKind::Autobiography, DocumentGroup::PersonalRecords),
    item(DocumentKind::BirthCertificate, DocumentGroup::PersonalRecords),
    item(DocumentKind::IdentityCard, DocumentGroup::PersonalRecords),
    item(DocumentKind::PoliceClearance, DocumentGroup::IdentityVerification),
    item(DocumentKind::ResidenceConfirmation, DocumentGroup::IdentityVerification),
    item(DocumentKind::EmployerConfirmation, DocumentGroup::IdentityVerification),
    item(DocumentKind::MembershipApplication, DocumentGroup::PartyRecords),
    item(DocumentKind::AwarenessCertificate, DocumentGroup::PartyRecords),
    item(DocumentKind::TrainingCommitment, DocumentGroup::PartyRecords),
    item(DocumentKind::TrainingEvaluationMinutes, DocumentGroup::PartyRecords),
    item(DocumentKind::PublicOpinionSurvey, DocumentGroup::EvaluationRecords),
    item(DocumentKind::SelfAssessment, DocumentGroup::EvaluationRecords),
    item(DocumentKind::CellRemarks, DocumentGroup::EvaluationRecords),
    item(DocumentKind::Diploma, DocumentGroup::Education),
];

const SIMPLIFIED_CHECKLIST: [ChecklistItem; 7] = [
    item(DocumentKind::SelfDeclaredBackground, DocumentGroup::Dossier),
    item(DocumentKind::CommitteeAndUnionRemarks, DocumentGroup::Dossier),
    item(DocumentKind::TrainingCommitment, DocumentGroup::Dossier),
    item(DocumentKind::AwarenessCertificate, DocumentGroup::Dossier),
    item(DocumentKind::MentorRemarks, DocumentGroup::Dossier),
    item(DocumentKind::StrivingSelfReview, DocumentGroup::Dossier),
    item(DocumentKind::PhotoAndIdScan, DocumentGroup::Dossier),
];

const fn item(kind: DocumentKind, group: DocumentGroup) -> ChecklistItem {
    ChecklistItem {
        kind,
        group,
        required: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistVariant {
    #[default]
    Full,
    Simplified,
}

impl ChecklistVariant {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "simplified" | "simple" => Some(Self::Simplified),
            _ => None,
        }
    }

    pub fn items(self) -> &'static [ChecklistItem] {
        match self {
            Self::Full => &FULL_CHECKLIST,
            Self::Simplified => &SIMPLIFIED_CHECKLIST,
        }
    }

    pub fn contains(self, kind: DocumentKind) -> bool {
        self.items().iter().any(|item| item.kind == kind)
    }

    pub fn required_count(self) -> usize {
        self.items().iter().filter(|item| item.required).count()
    }
}

/// Reference to an uploaded file; content and size are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Uploaded references keyed by checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentChecklist {
    documents: BTreeMap<DocumentKind, DocumentReference>,
}

impl DocumentChecklist {
    pub fn attach(&mut self, kind: DocumentKind, reference: DocumentReference) {
        self.documents.insert(kind, reference);
    }

    pub fn detach(&mut self, kind: DocumentKind) -> Option<DocumentReference> {
        self.documents.remove(&kind)
    }

    pub fn is_uploaded(&self, kind: DocumentKind) -> bool {
        self.documents.contains_key(&kind)
    }

    /// Required items of `variant` that have a reference. Items outside the variant never count.
    pub fn completed_count(&self, variant: ChecklistVariant) -> usize {
        variant
            .items()
            .iter()
            .filter(|item| item.required && self.is_uploaded(item.kind))
            .count()
    }

    pub fn missing(&self, variant: ChecklistVariant) -> Vec<DocumentKind> {
        variant
            .items()
            .iter()
            .filter(|item| item.required && !self.is_uploaded(item.kind))
            .map(|item| item.kind)
            .collect()
    }
}
