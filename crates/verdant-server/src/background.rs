//! Background tasks for the Verdant server.
//!
//! Includes:
//! - Refreshing this node's own heartbeat.

use crate::AppState;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Starts the self-heartbeat task.
///
/// Runs indefinitely, refreshing this node's registry entry every
/// `interval_seconds` and logging how many nodes are still active.
pub async fn start_heartbeat_task(state: Arc<AppState>, interval_seconds: u64) {
    if interval_seconds == 0 {
        tracing::warn!("heartbeat task disabled (interval=0)");
        return;
    }

    let interval = Duration::from_secs(interval_seconds);
    tracing::info!(
        node_id = state.federation.node_id(),
        interval_seconds,
        "starting heartbeat task"
    );

    loop {
        sleep(interval).await;
        heartbeat_once(&state);
    }
}

/// One heartbeat tick. Returns the number of active nodes afterwards.
pub fn heartbeat_once(state: &AppState) -> usize {
    let federation = &state.federation;
    federation.update_heartbeat(federation.node_id());

    let active = federation.get_active_nodes().len();
    let total = federation.nodes().len();
    if active < total {
        tracing::info!(active, stale = total - active, "federation has stale nodes");
    } else {
        tracing::debug!(active, "heartbeat refreshed");
    }
    active
}
