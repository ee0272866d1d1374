//! Registry of admitted members.
//!
//! A completed profile with an approved decision becomes a probationary member; twelve
//! months later the member can be moved to official status. The whole registry is one JSON
//! array in the blob store, read and rewritten on every mutation.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{load_collection, save_collection, BlobStore, StorageError};
use crate::workflows::admission::dates::{add_months, days_until, whole_years_between};
use crate::workflows::admission::{
    AdmissionDecision, Gender, Profile, ProfileId, ProfileStatus, Stage, StageStatus,
};

pub const MEMBERS_KEY: &str = "party_members";

/// Months a new member stays probationary.
pub const PROBATION_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Probationary,
    Official,
}

impl MemberStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Probationary => "Probationary member",
            Self::Official => "Official member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberHistoryEntry {
    pub date: NaiveDate,
    pub activity: String,
    pub note: String,
}

/// One completed stage of the profile the member came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentStep {
    pub stage: Stage,
    pub label: String,
    pub completed_on: Option<NaiveDate>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub unit: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
    pub source_profile: ProfileId,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub introducer: String,
    pub decision_number: Option<String>,
    pub probation_end_date: NaiveDate,
    #[serde(default)]
    pub history: Vec<MemberHistoryEntry>,
    #[serde(default)]
    pub development_history: Vec<DevelopmentStep>,
}

impl Member {
    /// Whole years since joining; computed on read, never stored.
    pub fn party_age(&self, today: NaiveDate) -> u32 {
        whole_years_between(self.join_date, today)
    }

    pub fn is_probationary(&self) -> bool {
        self.status == MemberStatus::Probationary
    }
}

/// Probationary member whose probation ends between today and `lookahead_days` from now.
pub fn probation_deadline_approaching(member: &Member, today: NaiveDate, lookahead_days: u32) -> bool {
    if !member.is_probationary() {
        return false;
    }
    let remaining = days_until(today, member.probation_end_date);
    (0..=i64::from(lookahead_days)).contains(&remaining)
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("profile {0} has not completed the admission pipeline")]
    ProfileNotCompleted(ProfileId),
    #[error("profile {0} does not carry an approved admission decision")]
    DecisionNotApproved(ProfileId),
    #[error("profile {0} has already been converted to a member")]
    AlreadyConverted(ProfileId),
    #[error("member {0} not found")]
    MemberNotFound(u64),
    #[error("member {0} is already an official member")]
    AlreadyOfficial(u64),
    #[error("a decision number is required")]
    MissingDecisionNumber,
}

/// Member registry backed by any blob store.
pub struct MemberRegistry<S: ?Sized> {
    store: Arc<S>,
}

impl<S> MemberRegistry<S>
where
    S: BlobStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Member>, RegistryError> {
        Ok(load_collection(self.store.as_ref(), MEMBERS_KEY)?)
    }

    pub fn get(&self, id: u64) -> Result<Member, RegistryError> {
        self.list()?
            .into_iter()
            .find(|member| member.id == id)
            .ok_or(RegistryError::MemberNotFound(id))
    }

    pub fn is_profile_converted(&self, profile_id: &ProfileId) -> Result<bool, RegistryError> {
        Ok(self
            .list()?
            .iter()
            .any(|member| &member.source_profile == profile_id))
    }

    /// Register a completed, approved profile as a probationary member.
    pub fn convert_profile(&self, profile: &Profile, today: NaiveDate) -> Result<Member, RegistryError> {
        if profile.status != ProfileStatus::Completed {
            return Err(RegistryError::ProfileNotCompleted(profile.id.clone()));
        }
        if profile.stage6.decision != Some(AdmissionDecision::Approved) {
            return Err(RegistryError::DecisionNotApproved(profile.id.clone()));
        }

        let mut members: Vec<Member> = load_collection(self.store.as_ref(), MEMBERS_KEY)?;
        if members
            .iter()
            .any(|member| member.source_profile == profile.id)
        {
            return Err(RegistryError::AlreadyConverted(profile.id.clone()));
        }

        let join_date = profile
            .stage6
            .decision_date
            .or(profile.stage6.common.end_date)
            .unwrap_or(today);
        let id = members.iter().map(|member| member.id).max().unwrap_or(0) + 1;
        let info = &profile.personal_info;

        let member = Member {
            id,
            name: info.full_name.clone(),
            unit: info.unit.clone(),
            join_date,
            status: MemberStatus::Probationary,
            source_profile: profile.id.clone(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            date_of_birth: info.date_of_birth,
            gender: info.gender,
            address: info.address.clone(),
            education: info.education.clone(),
            position: info.position.clone(),
            introducer: profile.stage1.introducer_name.clone(),
            decision_number: profile.stage6.decision_number.clone(),
            probation_end_date: add_months(join_date, PROBATION_MONTHS),
            history: vec![MemberHistoryEntry {
                date: join_date,
                activity: "Admitted as probationary member".to_string(),
                note: admission_note(profile),
            }],
            development_history: development_history(profile),
        };

        members.push(member.clone());
        save_collection(self.store.as_ref(), MEMBERS_KEY, &members)?;

        info!(member = id, profile = %profile.id, "profile converted to probationary member");
        Ok(member)
    }

    /// Probationary members whose deadline falls inside the lookahead window.
    pub fn probation_due(&self, today: NaiveDate, lookahead_days: u32) -> Result<Vec<Member>, RegistryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|member| probation_deadline_approaching(member, today, lookahead_days))
            .collect())
    }

    pub fn convert_to_official(
        &self,
        member_id: u64,
        decision_number: &str,
        note: &str,
        today: NaiveDate,
    ) -> Result<Member, RegistryError> {
        let decision_number = decision_number.trim();
        if decision_number.is_empty() {
            return Err(RegistryError::MissingDecisionNumber);
        }

        let mut members: Vec<Member> = load_collection(self.store.as_ref(), MEMBERS_KEY)?;
        let member = members
            .iter_mut()
            .find(|member| member.id == member_id)
            .ok_or(RegistryError::MemberNotFound(member_id))?;
        if member.status == MemberStatus::Official {
            return Err(RegistryError::AlreadyOfficial(member_id));
        }

        member.status = MemberStatus::Official;
        member.decision_number = Some(decision_number.to_string());
        member.history.push(MemberHistoryEntry {
            date: today,
            activity: "Recognised as official member".to_string(),
            note: note.trim().to_string(),
        });
        let updated = member.clone();

        save_collection(self.store.as_ref(), MEMBERS_KEY, &members)?;

        info!(member = member_id, "member recognised as official");
        Ok(updated)
    }
}

fn admission_note(profile: &Profile) -> String {
    let note = profile.stage6.common.note.trim();
    if note.is_empty() {
        format!("Converted from development profile {}", profile.id)
    } else {
        format!("Converted from development profile {}. {note}", profile.id)
    }
}

fn development_history(profile: &Profile) -> Vec<DevelopmentStep> {
    Stage::ordered()
        .into_iter()
        .filter(|stage| profile.common(*stage).status == StageStatus::Completed)
        .map(|stage| {
            let common = profile.common(stage);
            DevelopmentStep {
                stage,
                label: stage.label().to_string(),
                completed_on: common.end_date,
                note: common.note.clone(),
            }
        })
        .collect()
}
