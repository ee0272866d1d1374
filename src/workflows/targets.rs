use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{load_collection, save_collection, BlobStore, StorageError};

pub const TARGETS_KEY: &str = "recruitment_targets";

/// Yearly training and recruitment target of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    pub unit: String,
    pub year: i32,
    pub training_target: u32,
    pub recruitment_target: u32,
    pub training_done: u32,
    pub recruitment_done: u32,
}

impl Target {
    /// Combined completion percentage. Over-achievement reports above 100.
    pub fn rate(&self) -> u64 {
        completion_rate(
            u64::from(self.training_done) + u64::from(self.recruitment_done),
            u64::from(self.training_target) + u64::from(self.recruitment_target),
        )
    }

    pub fn band(&self) -> RateBand {
        RateBand::for_rate(self.rate())
    }
}

/// `round(done / target * 100)`, or 0 when nothing was targeted. Halves round up.
pub fn completion_rate(done: u64, target: u64) -> u64 {
    if target == 0 {
        return 0;
    }
    done.saturating_mul(100).saturating_add(target / 2) / target
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBand {
    OnTrack,
    Behind,
    Critical,
}

impl RateBand {
    pub fn for_rate(rate: u64) -> Self {
        if rate >= 75 {
            Self::OnTrack
        } else if rate >= 50 {
            Self::Behind
        } else {
            Self::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTarget {
    pub unit: String,
    pub year: i32,
    pub training_target: u32,
    pub recruitment_target: u32,
    #[serde(default)]
    pub training_done: u32,
    #[serde(default)]
    pub recruitment_done: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetUpdate {
    pub unit: Option<String>,
    pub year: Option<i32>,
    pub training_target: Option<u32>,
    pub recruitment_target: Option<u32>,
    pub training_done: Option<u32>,
    pub recruitment_done: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFilter {
    pub year: Option<i32>,
    pub unit: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
}

impl TargetFilter {
    pub fn matches(&self, target: &Target) -> bool {
        let year = self.year.map_or(true, |year| target.year == year);
        let unit = self
            .unit
            .as_deref()
            .map_or(true, |unit| target.unit == unit);
        let search = self.search.as_deref().map_or(true, |needle| {
            target
                .unit
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        year && unit && search
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetTotals {
    pub training_target: u64,
    pub recruitment_target: u64,
    pub training_done: u64,
    pub recruitment_done: u64,
    pub rate: u64,
}

impl TargetTotals {
    pub fn of(targets: &[Target]) -> Self {
        let mut totals = targets.iter().fold(Self::default(), |mut acc, target| {
            acc.training_target += u64::from(target.training_target);
            acc.recruitment_target += u64::from(target.recruitment_target);
            acc.training_done += u64::from(target.training_done);
            acc.recruitment_done += u64::from(target.recruitment_done);
            acc
        });
        totals.rate = completion_rate(
            totals.training_done + totals.recruitment_done,
            totals.training_target + totals.recruitment_target,
        );
        totals
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("unit is required")]
    MissingUnit,
    #[error("training and recruitment targets must both be positive")]
    NonPositiveTarget,
    #[error("target {0} not found")]
    NotFound(u64),
}

fn validate(unit: &str, training_target: u32, recruitment_target: u32) -> Result<(), TargetError> {
    if unit.trim().is_empty() {
        return Err(TargetError::MissingUnit);
    }
    if training_target == 0 || recruitment_target == 0 {
        return Err(TargetError::NonPositiveTarget);
    }
    Ok(())
}

pub struct TargetBook<S: ?Sized> {
    store: Arc<S>,
}

impl<S> TargetBook<S>
where
    S: BlobStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn add(&self, request: NewTarget) -> Result<Target, TargetError> {
        validate(&request.unit, request.training_target, request.recruitment_target)?;

        let mut targets: Vec<Target> = load_collection(self.store.as_ref(), TARGETS_KEY)?;
        let id = targets.iter().map(|target| target.id).max().unwrap_or(0) + 1;
        let target = Target {
            id,
            unit: request.unit.trim().to_string(),
            year: request.year,
            training_target: request.training_target,
            recruitment_target: request.recruitment_target,
            training_done: request.training_done,
            recruitment_done: request.recruitment_done,
        };
        targets.push(target.clone());
        save_collection(self.store.as_ref(), TARGETS_KEY, &targets)?;

        info!(target = id, unit = %target.unit, year = target.year, "recruitment target added");
        Ok(target)
    }

    pub fn update(&self, id: u64, update: TargetUpdate) -> Result<Target, TargetError> {
        let mut targets: Vec<Target> = load_collection(self.store.as_ref(), TARGETS_KEY)?;
        let target = targets
            .iter_mut()
            .find(|target| target.id == id)
            .ok_or(TargetError::NotFound(id))?;

        let mut next = target.clone();
        if let Some(unit) = update.unit {
            next.unit = unit.trim().to_string();
        }
        next.year = update.year.unwrap_or(next.year);
        next.training_target = update.training_target.unwrap_or(next.training_target);
        next.recruitment_target = update.recruitment_target.unwrap_or(next.recruitment_target);
        next.training_done = update.training_done.unwrap_or(next.training_done);
        next.recruitment_done = update.recruitment_done.unwrap_or(next.recruitment_done);
        validate(&next.unit, next.training_target, next.recruitment_target)?;

        *target = next.clone();
        save_collection(self.store.as_ref(), TARGETS_KEY, &targets)?;
        Ok(next)
    }

    pub fn list(&self, filter: &TargetFilter) -> Result<Vec<Target>, TargetError> {
        let targets: Vec<Target> = load_collection(self.store.as_ref(), TARGETS_KEY)?;
        Ok(targets.into_iter().filter(|target| filter.matches(target)).collect())
    }

    /// Targets as CSV with their rate, in listing order.
    pub fn export_csv(&self, filter: &TargetFilter) -> Result<String, TargetExportError> {
        let targets = self.list(filter)?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "unit",
            "year",
            "training_target",
            "training_done",
            "recruitment_target",
            "recruitment_done",
            "rate_percent",
        ])?;
        for target in &targets {
            writer.write_record([
                target.unit.clone(),
                target.year.to_string(),
                target.training_target.to_string(),
                target.training_done.to_string(),
                target.recruitment_target.to_string(),
                target.recruitment_done.to_string(),
                target.rate().to_string(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|error| TargetExportError::Flush(error.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetExportError {
    #[error(transparent)]
    Targets(#[from] TargetError),
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}
