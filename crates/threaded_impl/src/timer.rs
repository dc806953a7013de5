use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use common::{DashboardControls, Trigger};
use tracing::{debug, trace};

/// Upper bound on one timer sleep, so shutdown lands within this window
/// even mid-interval.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Spawn the background refresh timer: sleeps out each interval and
/// posts a [`Trigger`] through the channel. The dashboard thread stays
/// free to serve renders; it only ever *receives* cadence events.
pub fn spawn_trigger_timer(
    interval: Duration,
    trigger_tx: SyncSender<Trigger>,
    controls: Arc<DashboardControls>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut next_fire = Instant::now() + interval;
        debug!(interval_ms = interval.as_millis() as u64, "trigger timer started");

        while !controls.is_shutdown() {
            let now = Instant::now();
            if now >= next_fire {
                next_fire += interval;
                match trigger_tx.try_send(Trigger) {
                    Ok(()) => trace!("trigger posted"),
                    // consumer lagging: drop this trigger, the next one
                    // carries the same information
                    Err(TrySendError::Full(_)) => trace!("trigger dropped, channel full"),
                    Err(TrySendError::Disconnected(_)) => break,
                }
                continue;
            }
            let wait = next_fire.saturating_duration_since(Instant::now());
            thread::sleep(wait.min(SHUTDOWN_POLL));
        }
        debug!("trigger timer stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn timer_posts_triggers_at_interval() {
        let (tx, rx) = mpsc::sync_channel(16);
        let controls = Arc::new(DashboardControls::new());
        let handle = spawn_trigger_timer(Duration::from_millis(20), tx, Arc::clone(&controls));

        thread::sleep(Duration::from_millis(110));
        controls.request_shutdown();
        handle.join().unwrap();

        let fired = rx.try_iter().count();
        assert!(fired >= 3, "expected at least 3 triggers, got {fired}");
    }

    #[test]
    fn timer_stops_when_receiver_drops() {
        let (tx, rx) = mpsc::sync_channel(1);
        let controls = Arc::new(DashboardControls::new());
        let handle = spawn_trigger_timer(Duration::from_millis(5), tx, controls);

        thread::sleep(Duration::from_millis(20));
        drop(rx);
        // next try_send sees the disconnect and the thread exits
        handle.join().unwrap();
    }
}
