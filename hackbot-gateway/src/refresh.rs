//! Periodic refresh: optional import, then a reconciliation cycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, interval_at};
use tracing::{error, info};

use crate::cycle::{CyclePlan, run_cycle};
use crate::state::AppState;

/// Lower bound on the refresh period.
const MIN_REFRESH_SECONDS: u64 = 5;

async fn run_refresh_tick(state: &AppState) {
    if state.config.settings.projects.import_on_refresh {
        match hackbot_importer::run_import(&state.config).await {
            Ok(count) => info!("Imported {} projects before refresh", count),
            Err(err) => error!("Import before refresh failed: {}", err),
        }
    }

    match run_cycle(state, CyclePlan::REFRESH).await {
        Ok(report) if !report.added.is_empty() => {
            info!(added = ?report.added, "Refresh registered new projects");
        }
        Ok(_) => {}
        Err(err) => error!("Refresh cycle failed: {}", err),
    }
}

/// Start the refresh loop. The first tick fires one period from now, so the
/// caller runs the startup cycle itself beforehand.
pub fn start_refresh_runner(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let seconds = state
        .config
        .settings
        .projects
        .refresh_seconds
        .max(MIN_REFRESH_SECONDS);
    let period = Duration::from_secs(seconds);
    let mut interval = interval_at(Instant::now() + period, period);

    let handle = tokio::spawn(async move {
        loop {
            interval.tick().await;
            run_refresh_tick(&state).await;
        }
    });

    info!("refresh runner started (refresh_seconds={})", seconds);
    handle
}
