//! Background refresh of the stored collections.
//!
//! Every cycle reads the configuration file again and looks up each configured clearance in a
//! task of its own, so a failing lookup does not keep the other clearances from updating.

use std::time::Duration;

use log::{debug, error, info};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use zakb_core::config::Config;

use crate::state::AppState;

/// Refresh forever, starting a cycle every configured interval.
pub async fn run(state: AppState) {
    let mut period = state.config.read().await.refresh_interval();
    let mut ticker = refresh_ticker(Instant::now(), period);
    loop {
        ticker.tick().await;
        let config = state.reload_config().await;
        if config.refresh_interval() != period {
            period = config.refresh_interval();
            info!("Refreshing every {period:?} from now on");
            ticker = refresh_ticker(Instant::now() + period, period);
        }
        refresh(&state, &config).await;
    }
}

/// Ticks at `start` and every `period` after it, a late tick delays the following ones.
fn refresh_ticker(start: Instant, period: Duration) -> Interval {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Run one refresh cycle.
///
/// A lookup which fails keeps the previously stored collection.
pub async fn refresh(state: &AppState, config: &Config) {
    let client = match config.client() {
        Ok(client) => client,
        Err(err) => {
            error!("Could not refresh collections: {err}");
            return;
        }
    };
    state
        .events
        .write()
        .await
        .retain(|clearance, _| config.clearances.contains(clearance));
    let tasks: Vec<_> = config
        .clearances
        .iter()
        .map(|&clearance| {
            let client = client.clone();
            let query = config.query(clearance);
            let task = tokio::spawn(async move { client.fetch_event(&query).await });
            (clearance, task)
        })
        .collect();
    for (clearance, task) in tasks {
        match task.await {
            Ok(Ok(event)) => {
                debug!("Refreshed {clearance}: {event:?}");
                state.store(clearance, event).await;
            }
            Ok(Err(err)) => error!(
                "Could not refresh the {} collection: {err}",
                clearance.label()
            ),
            Err(err) => error!(
                "Refreshing the {} collection failed: {err}",
                clearance.label()
            ),
        }
    }
}
