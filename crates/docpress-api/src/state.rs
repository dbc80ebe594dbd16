//! Application state shared across all handlers.

use std::sync::Arc;

use docpress_convert::ConversionService;
use docpress_core::config::AppConfig;
use docpress_engine::admission::AdmissionController;
use docpress_engine::executor::JobExecutor;
use docpress_engine::probe::ToolProbe;
use docpress_engine::workspace::Workspace;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Bounded-concurrency admission gate.
    pub admission: Arc<AdmissionController>,
    /// Job executor enforcing execution budgets and cleanup.
    pub executor: Arc<JobExecutor>,
    /// Working-storage layout.
    pub workspace: Workspace,
    /// External converter availability probe.
    pub probe: Arc<ToolProbe>,
    /// Per-kind conversion orchestration.
    pub service: Arc<ConversionService>,
}

impl AppState {
    /// Wire up all shared dependencies from configuration.
    pub fn new(config: AppConfig) -> Self {
        let workspace = Workspace::new(config.storage.work_root.clone());
        let service = Arc::new(ConversionService::new(
            workspace.clone(),
            config.tools.clone(),
            &config.jobs,
        ));

        Self {
            admission: Arc::new(AdmissionController::new(&config.jobs)),
            executor: Arc::new(JobExecutor::new(&config.jobs)),
            probe: Arc::new(ToolProbe::new(config.tools.clone())),
            workspace,
            service,
            config: Arc::new(config),
        }
    }
}
