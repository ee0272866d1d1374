use serde::Serialize;

use super::super::dates::format_display;
use super::super::profile::Profile;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

const HEADER: [&str; 8] = [
    "code",
    "full_name",
    "unit",
    "status",
    "current_stage",
    "stage_label",
    "progress_percent",
    "open_deadline",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    code: &'a str,
    full_name: &'a str,
    unit: &'a str,
    status: &'static str,
    current_stage: u8,
    stage_label: &'static str,
    progress_percent: u8,
    open_deadline: String,
}

/// Render the profile list as CSV with a header row; dates use dd/mm/yyyy.
pub fn export_csv(profiles: &[Profile]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for profile in profiles {
        let open_deadline = profile
            .open_stage()
            .and_then(|stage| profile.common(stage).deadline)
            .map(format_display)
            .unwrap_or_default();

        writer.serialize(ExportRow {
            code: &profile.code,
            full_name: &profile.personal_info.full_name,
            unit: &profile.personal_info.unit,
            status: profile.status.label(),
            current_stage: profile.current_stage.number(),
            stage_label: profile.current_stage.label(),
            progress_percent: profile.overall_progress(),
            open_deadline,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Flush(error.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
