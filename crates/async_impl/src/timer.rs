use std::sync::Arc;
use std::time::Duration;

use common::{DashboardControls, Trigger};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

/// Background refresh timer task: sleeps out each interval and posts a
/// [`Trigger`] through the channel. Cadence timing lives here so the
/// dashboard task only ever receives events.
pub async fn run_trigger_timer(
    interval: Duration,
    trigger_tx: mpsc::Sender<Trigger>,
    controls: Arc<DashboardControls>,
) {
    let mut next_fire = Instant::now() + interval;
    debug!(interval_ms = interval.as_millis() as u64, "trigger timer started");

    while !controls.is_shutdown() {
        sleep_until(next_fire).await;
        next_fire += interval;
        if controls.is_shutdown() {
            break;
        }
        if trigger_tx.send(Trigger).await.is_err() {
            // consumer gone, session is over
            break;
        }
        trace!("trigger posted");
    }
    debug!("trigger timer stopped");
}
