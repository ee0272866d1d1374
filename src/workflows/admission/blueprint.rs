use serde::Serialize;

use super::domain::Stage;

/// Static description of one stage: how long it runs and what closes it.
#[derive(Debug, Clone, Serialize)]
pub struct StageTemplate {
    pub stage: Stage,
    pub name: &'static str,
    pub duration_days: u32,
    pub requirements: Vec<&'static str>,
    pub on_completion: Vec<&'static str>,
}

#[derive(Debug)]
pub struct AdmissionBlueprint {
    stages: Vec<StageTemplate>,
}

impl AdmissionBlueprint {
    pub fn standard() -> Self {
        Self {
            stages: standard_stage_templates(),
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageTemplate> {
        self.stages.iter().find(|template| template.stage == stage)
    }

    pub fn stage_templates(&self) -> &[StageTemplate] {
        &self.stages
    }
}

fn template(
    stage: Stage,
    requirements: Vec<&'static str>,
    on_completion: Vec<&'static str>,
) -> StageTemplate {
    StageTemplate {
        stage,
        name: stage.label(),
        duration_days: stage.duration_days(),
        requirements,
        on_completion,
    }
}

fn standard_stage_templates() -> Vec<StageTemplate> {
    vec![
        template(
            Stage::Introduction,
            vec![
                "Full name, unit, introduction date, introducer name and initial rating are recorded when the profile is opened.",
            ],
            vec!["Completed on the day the profile is created; the awareness class opens immediately."],
        ),
        template(
            Stage::AwarenessClass,
            vec!["Class name recorded.", "Class start and end dates recorded."],
            vec!["Post-class evaluation opens with a 60 day deadline."],
        ),
        template(
            Stage::Evaluation,
            vec![
                "Political awareness, study attitude and moral quality scored from 0 to 10.",
                "Overall score (mean, one decimal) of at least 5.0.",
            ],
            vec![
                "Evaluation date stamped and result set to pass.",
                "Training commitment opens with a 365 day deadline.",
            ],
        ),
        template(
            Stage::Commitment,
            vec!["Commitment content recorded.", "Guiding member (mentor) named."],
            vec![
                "Commitment completion rate set to 100%.",
                "Dossier completion opens with a 60 day deadline.",
            ],
        ),
        template(
            Stage::Dossier,
            vec![
                "Personal information filled: full name, date of birth, id number, phone, email.",
                "At least one work history entry, each with period and position.",
                "Party evaluation and training result narratives written.",
                "Every document of the active checklist uploaded.",
            ],
            vec![
                "Dossier review approved.",
                "Admission decision opens with a 7 day deadline.",
            ],
        ),
        template(
            Stage::Decision,
            vec!["Admission decision (approved, rejected or deferred) recorded."],
            vec!["Decision date stamped when absent; the profile is completed."],
        ),
    ]
}
