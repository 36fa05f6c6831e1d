use tracing::debug;

use crate::config::stats_flush_interval;
use crate::state::AppState;

/// Batches statistics writes: navigation only flips the dirty flag and this
/// loop writes at most once per interval.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(stats_flush_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if state.flush_stats().await {
            debug!("statistics flushed");
        }
    }
}
