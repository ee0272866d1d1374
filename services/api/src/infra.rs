use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use party_admission::config::{AppConfig, StorageConfig};
use party_admission::storage::{BlobStore, DirectoryBlobStore, MemoryBlobStore, StorageError};
use party_admission::workflows::admission::{
    dates, MemoryProfileRepository, PipelineSettings, ProfilePipeline, SystemClock,
};
use party_admission::workflows::notifications::NotificationService;
use party_admission::workflows::registry::MemberRegistry;
use party_admission::workflows::targets::TargetBook;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type ServicePipeline = ProfilePipeline<MemoryProfileRepository, SystemClock>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) pipeline: Arc<ServicePipeline>,
    pub(crate) members: Arc<MemberRegistry<dyn BlobStore>>,
    pub(crate) notifications: Arc<NotificationService<dyn BlobStore>>,
    pub(crate) targets: Arc<TargetBook<dyn BlobStore>>,
}

impl AppState {
    pub(crate) fn new(
        config: &AppConfig,
        store: Arc<dyn BlobStore>,
        readiness: Arc<AtomicBool>,
        metrics: PrometheusHandle,
    ) -> Self {
        let pipeline = ProfilePipeline::new(
            Arc::new(MemoryProfileRepository::new()),
            Arc::new(SystemClock),
            PipelineSettings {
                checklist_variant: config.pipeline.checklist_variant,
            },
        );

        Self {
            readiness,
            metrics: Arc::new(metrics),
            pipeline: Arc::new(pipeline),
            members: Arc::new(MemberRegistry::new(store.clone())),
            notifications: Arc::new(NotificationService::new(
                store.clone(),
                config.pipeline.notification_lookahead_days,
            )),
            targets: Arc::new(TargetBook::new(store)),
        }
    }
}

/// Directory-backed blobs when a data directory is configured, process memory otherwise.
pub(crate) fn open_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match &config.data_dir {
        Some(dir) => {
            let store = DirectoryBlobStore::open(dir.clone())?;
            info!(data_dir = %store.root().display(), "using directory blob store");
            Ok(Arc::new(store))
        }
        None => {
            info!("no data directory configured; registry and notices stay in memory");
            Ok(Arc::new(MemoryBlobStore::default()))
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    dates::parse_date(raw).map_err(|err| err.to_string())
}
