//! Health check handler.

use axum::Json;
use axum::extract::State;
use sysinfo::{ProcessRefreshKind, System};

use crate::dto::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_rss_bytes: read_rss_bytes(),
        slots: state.admission.occupancy(),
        tools: state.probe.availability().await,
    }))
}

/// Resident set size of this process, in bytes. `None` if the process
/// cannot be inspected; health reporting never errors over this.
fn read_rss_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_process_specifics(pid, ProcessRefreshKind::new().with_memory());
    system.process(pid).map(|process| process.memory())
}
