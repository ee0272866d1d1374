mod export;
mod summary;
pub mod views;

pub use export::{export_csv, ExportError};
pub use summary::PipelineReport;
pub use views::{
    GradeAdvisory, OverdueStage, PipelineReportSummary, ProfileDetail, ProfileView, StageCount,
    StageTimelineEntry,
};
