use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::super::dates::days_until;
use super::super::domain::{ProfileStatus, Stage, StageStatus};
use super::super::profile::Profile;
use super::views::{GradeAdvisory, OverdueStage, PipelineReportSummary, StageCount};

/// Aggregates computed over one snapshot of the profile list.
#[derive(Debug)]
pub struct PipelineReport {
    pub as_of: NaiveDate,
    pub by_status: BTreeMap<&'static str, usize>,
    pub active_by_stage: BTreeMap<Stage, usize>,
    pub progress_total: u64,
    pub profile_count: usize,
    pub overdue: Vec<OverdueStage>,
    pub grade_advisories: Vec<GradeAdvisory>,
}

impl PipelineReport {
    pub fn build(profiles: &[Profile], today: NaiveDate) -> Self {
        let mut report = Self {
            as_of: today,
            by_status: BTreeMap::new(),
            active_by_stage: BTreeMap::new(),
            progress_total: 0,
            profile_count: profiles.len(),
            overdue: Vec::new(),
            grade_advisories: Vec::new(),
        };

        for profile in profiles {
            *report.by_status.entry(profile.status.label()).or_default() += 1;
            report.progress_total += u64::from(profile.overall_progress());

            if profile.status == ProfileStatus::Active {
                *report
                    .active_by_stage
                    .entry(profile.current_stage)
                    .or_default() += 1;

                if let Some(overdue) = overdue_stage(profile, today) {
                    report.overdue.push(overdue);
                }
            }

            if let Some(advisory) = grade_advisory(profile) {
                report.grade_advisories.push(advisory);
            }
        }

        report.overdue.sort_by_key(|entry| entry.deadline);
        report
    }

    /// Mean overall progress rounded to one decimal; 0 for an empty pipeline.
    pub fn average_progress(&self) -> f64 {
        if self.profile_count == 0 {
            return 0.0;
        }
        let mean = self.progress_total as f64 / self.profile_count as f64;
        (mean * 10.0).round() / 10.0
    }

    fn count(&self, status: ProfileStatus) -> usize {
        self.by_status.get(status.label()).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> PipelineReportSummary {
        let by_stage = Stage::ordered()
            .into_iter()
            .map(|stage| StageCount {
                stage,
                stage_label: stage.label(),
                active: self.active_by_stage.get(&stage).copied().unwrap_or(0),
            })
            .collect();

        PipelineReportSummary {
            as_of: self.as_of,
            total: self.profile_count,
            active: self.count(ProfileStatus::Active),
            completed: self.count(ProfileStatus::Completed),
            suspended: self.count(ProfileStatus::Suspended),
            average_progress: self.average_progress(),
            by_stage,
            overdue: self.overdue.clone(),
            grade_advisories: self.grade_advisories.clone(),
        }
    }
}

fn overdue_stage(profile: &Profile, today: NaiveDate) -> Option<OverdueStage> {
    let stage = profile.open_stage()?;
    let deadline = profile.common(stage).deadline?;
    let remaining = days_until(today, deadline);
    (remaining < 0).then(|| OverdueStage {
        profile_id: profile.id.clone(),
        code: profile.code.clone(),
        full_name: profile.personal_info.full_name.clone(),
        stage,
        stage_label: stage.label(),
        deadline,
        days_overdue: -remaining,
    })
}

fn grade_advisory(profile: &Profile) -> Option<GradeAdvisory> {
    let evaluation = &profile.stage3;
    if evaluation.common.status == StageStatus::Pending || evaluation.overall_score <= 0.0 {
        return None;
    }
    let advised = evaluation.advisory_grade();
    (advised != evaluation.grade).then(|| GradeAdvisory {
        profile_id: profile.id.clone(),
        code: profile.code.clone(),
        overall_score: evaluation.overall_score,
        recorded: evaluation.grade,
        advised,
    })
}
