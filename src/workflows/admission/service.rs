use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::checklist::{ChecklistVariant, DocumentKind, DocumentReference};
use super::clock::Clock;
use super::domain::{InitialRating, ProfileId, ProfileStatus, Stage, UnknownStage};
use super::guard::{self, ValidationError};
use super::profile::{NewProfile, Profile};
use super::repository::{ProfileRepository, RepositoryError};
use super::update::StageUpdate;

/// Knobs the pipeline reads when opening profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSettings {
    pub checklist_variant: ChecklistVariant,
}

/// Filter for [`ProfilePipeline::list_profiles`]; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFilter {
    pub status: Option<ProfileStatus>,
    #[serde(default, alias = "q")]
    pub search: Option<String>,
    pub stage: Option<Stage>,
}

impl ProfileFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        self.status.map_or(true, |status| profile.status == status)
            && self.stage.map_or(true, |stage| profile.current_stage == stage)
            && self
                .search
                .as_deref()
                .map_or(true, |needle| profile.matches_search(needle))
    }
}

/// File metadata supplied when a dossier document is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub media_type: Option<String>,
}

/// Engine owning the profile lifecycle: creation, stage updates and transitions.
pub struct ProfilePipeline<R, C> {
    repository: Arc<R>,
    clock: Arc<C>,
    settings: PipelineSettings,
}

impl<R, C> ProfilePipeline<R, C>
where
    R: ProfileRepository + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<C>, settings: PipelineSettings) -> Self {
        Self {
            repository,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Open a profile: introduction completed today, awareness class in progress.
    pub fn create_profile(&self, request: NewProfile) -> Result<Profile, PipelineError> {
        let full_name = required_text(request.full_name, "full name")?;
        let unit = required_text(request.unit, "unit")?;
        let introduced_date = request
            .introduced_date
            .ok_or(ValidationError::MissingField {
                field: "introduction date",
            })?;
        let introducer_name = required_text(request.introducer_name, "introducer name")?;
        let initial_rating: InitialRating =
            request.initial_rating.ok_or(ValidationError::MissingField {
                field: "initial rating",
            })?;

        let today = self.clock.today();
        let variant = self.settings.checklist_variant;
        let stored = self.repository.insert_with(|existing| {
            Profile::open(
                next_profile_id(existing),
                next_profile_code(existing, today.year()),
                full_name,
                unit,
                introducer_name,
                introduced_date,
                initial_rating,
                variant,
                today,
            )
        })?;
        info!(profile = %stored.id, code = %stored.code, "profile opened at stage 2");
        Ok(stored)
    }

    /// Merge partial data into one stage without changing any status.
    pub fn update_stage(
        &self,
        id: &ProfileId,
        stage_number: u8,
        update: StageUpdate,
    ) -> Result<Profile, PipelineError> {
        let stage = parse_stage(stage_number)?;
        if update.stage() != stage {
            return Err(ValidationError::StageMismatch {
                requested: stage,
                update: update.stage(),
            }
            .into());
        }

        update.validate()?;

        let today = self.clock.today();
        let profile = self.repository.update(id, |profile| {
            guard::ensure_active(profile)?;
            update.apply(profile);
            profile.updated_at = today;
            Ok::<(), PipelineError>(())
        })?;

        debug!(profile = %id, stage = stage.number(), "stage data merged");
        Ok(profile)
    }

    /// Validate and perform the transition out of `stage_number`.
    ///
    /// A rejected completion leaves the stored profile untouched.
    pub fn complete_stage(&self, id: &ProfileId, stage_number: u8) -> Result<Profile, PipelineError> {
        let stage = parse_stage(stage_number)?;
        let today = self.clock.today();

        let profile = self.repository.update(id, |profile| {
            if let Err(error) = guard::check_completion(profile, stage) {
                warn!(profile = %id, stage = stage.number(), %error, "stage completion rejected");
                return Err(PipelineError::from(error));
            }
            profile.advance(stage, today);
            Ok(())
        })?;

        match profile.status {
            ProfileStatus::Completed => {
                info!(profile = %id, "admission pipeline completed");
            }
            _ => {
                info!(
                    profile = %id,
                    completed = stage.number(),
                    current = profile.current_stage.number(),
                    "stage completed"
                );
            }
        }
        Ok(profile)
    }

    /// Attach a document reference to an item of the dossier checklist.
    pub fn upload_document(
        &self,
        id: &ProfileId,
        document: DocumentKind,
        upload: DocumentUpload,
    ) -> Result<Profile, PipelineError> {
        let file_name = required_text(upload.file_name, "file name")?;
        let today = self.clock.today();
        let reference = DocumentReference {
            file_name,
            size_bytes: upload.size_bytes,
            uploaded_on: today,
            media_type: upload.media_type,
        };

        let profile = self.repository.update(id, |profile| {
            guard::ensure_active(profile)?;
            let variant = profile.stage5.checklist_variant;
            if !variant.contains(document) {
                return Err(PipelineError::from(ValidationError::DocumentNotInChecklist {
                    document,
                    variant,
                }));
            }
            profile.stage5.checklist.attach(document, reference);
            profile.stage5.refresh_counts();
            profile.updated_at = today;
            Ok(())
        })?;

        debug!(profile = %id, document = document.label(), "document attached");
        Ok(profile)
    }

    pub fn remove_document(
        &self,
        id: &ProfileId,
        document: DocumentKind,
    ) -> Result<Profile, PipelineError> {
        let today = self.clock.today();
        let mut removed = false;
        let profile = self.repository.update(id, |profile| {
            guard::ensure_active(profile)?;
            if profile.stage5.checklist.detach(document).is_some() {
                profile.stage5.refresh_counts();
                profile.updated_at = today;
                removed = true;
            }
            Ok::<(), PipelineError>(())
        })?;

        if removed {
            debug!(profile = %id, document = document.label(), "document removed");
        }
        Ok(profile)
    }

    /// Park an active profile. Stage statuses are left as they are.
    pub fn suspend(&self, id: &ProfileId) -> Result<Profile, PipelineError> {
        let today = self.clock.today();
        let profile = self.repository.update(id, |profile| {
            guard::ensure_active(profile)?;
            profile.status = ProfileStatus::Suspended;
            profile.updated_at = today;
            Ok::<(), PipelineError>(())
        })?;

        info!(profile = %id, stage = profile.current_stage.number(), "profile suspended");
        Ok(profile)
    }

    pub fn reactivate(&self, id: &ProfileId) -> Result<Profile, PipelineError> {
        let today = self.clock.today();
        let profile = self.repository.update(id, |profile| {
            if profile.status != ProfileStatus::Suspended {
                return Err(PipelineError::from(ValidationError::ProfileNotSuspended {
                    status: profile.status,
                }));
            }
            profile.status = ProfileStatus::Active;
            profile.updated_at = today;
            Ok(())
        })?;

        info!(profile = %id, "profile reactivated");
        Ok(profile)
    }

    pub fn get(&self, id: &ProfileId) -> Result<Profile, PipelineError> {
        self.load(id)
    }

    /// Profiles matching `filter`, in insertion order.
    pub fn list_profiles(&self, filter: &ProfileFilter) -> Result<Vec<Profile>, PipelineError> {
        let snapshot = self.repository.snapshot()?;
        Ok(snapshot
            .iter()
            .filter(|profile| filter.matches(profile))
            .cloned()
            .collect())
    }

    pub fn overall_progress(&self, id: &ProfileId) -> Result<u8, PipelineError> {
        Ok(self.load(id)?.overall_progress())
    }

    pub fn snapshot(&self) -> Result<Arc<Vec<Profile>>, PipelineError> {
        Ok(self.repository.snapshot()?)
    }

    fn load(&self, id: &ProfileId) -> Result<Profile, PipelineError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| PipelineError::NotFound(id.clone()))
    }
}

fn required_text(value: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_stage(number: u8) -> Result<Stage, ValidationError> {
    Stage::try_from(number).map_err(|UnknownStage(number)| ValidationError::UnknownStage { number })
}

fn next_profile_id(existing: &[Profile]) -> ProfileId {
    let highest = existing
        .iter()
        .filter_map(|profile| profile.id.0.strip_prefix("profile-"))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    ProfileId(format!("profile-{:06}", highest + 1))
}

/// `HS-<year>-<NNN>`: the Nth profile opened in a year gets N.
fn next_profile_code(existing: &[Profile], year: i32) -> String {
    let prefix = format!("HS-{year}-");
    let same_year = existing
        .iter()
        .filter(|profile| profile.code.starts_with(&prefix))
        .count();
    format!("{prefix}{:03}", same_year + 1)
}

/// Error raised by the profile pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("profile {0} not found")]
    NotFound(ProfileId),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PipelineError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(id) => Self::NotFound(id),
            other => Self::Repository(other),
        }
    }
}
