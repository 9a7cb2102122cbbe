//! What happens once the gateway is connected, per run mode.

use std::sync::Arc;

use hackbot_core::RunMode;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cycle::{CycleError, CyclePlan, run_cycle};
use crate::prune::prune_uncategorized;
use crate::refresh::start_refresh_runner;
use crate::state::AppState;

/// Run the startup work for the configured mode.
///
/// Returns the refresh runner handle in full mode. One-shot modes request
/// shutdown when done. A setup failure is logged and stops further setup
/// without exiting.
pub async fn run_startup(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let mode = state.config.run_mode();
    info!(?mode, sleep_mode = state.config.sleep_mode(), "Starting setup");

    match mode {
        RunMode::Prune => {
            if let Err(err) = prune_uncategorized(state.api.as_ref()).await {
                error!("Prune failed: {}", err);
            }
            state.request_shutdown();
            None
        }
        RunMode::ChannelsOnly => {
            let plan = CyclePlan {
                announce: false,
                ..CyclePlan::STARTUP
            };
            if let Err(err) = run_cycle(&state, plan).await {
                error!("Channel setup failed: {}", err);
            }
            state.request_shutdown();
            None
        }
        RunMode::AnnouncementsOnly => {
            let plan = CyclePlan {
                create_missing: false,
                ..CyclePlan::STARTUP
            };
            if let Err(err) = run_cycle(&state, plan).await {
                error!("Announcement setup failed: {}", err);
            }
            None
        }
        RunMode::Full => match run_cycle(&state, CyclePlan::STARTUP).await {
            Err(CycleError::Setup(err)) => {
                error!("Guild setup failed, not starting refresh: {}", err);
                None
            }
            result => {
                if let Err(err) = result {
                    error!("Startup cycle failed: {}", err);
                }
                Some(start_refresh_runner(state))
            }
        },
    }
}
