use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::Arc;
use std::time::Instant;

use common::{
    DashboardConfig, DashboardControls, DashboardLoop, FeedError, RenderFrame, SampleSource,
    TickRecorder, TickResult, Trigger,
};
use tracing::{debug, warn};

use crate::timer::SHUTDOWN_POLL;

/// Tick loop for one dashboard session.
///
/// With `trigger_rx = None` the scheduler is polled on every tick; with
/// a receiver, cadence events arrive from the background timer and the
/// auto-refresh flag is re-checked on receipt, so toggling it off is
/// observed before the next frame, not after one full interval.
///
/// Source failures propagate to the caller unmodified; nothing is
/// retried here.
pub fn run_dashboard_thread<S: SampleSource>(
    config: DashboardConfig,
    source: S,
    frame_tx: SyncSender<RenderFrame>,
    trigger_rx: Option<Receiver<Trigger>>,
    controls: Arc<DashboardControls>,
    recorder: TickRecorder,
) -> Result<(), FeedError> {
    let mut dash = DashboardLoop::new(source, config.buffer_capacity, config.refresh_interval());
    let period = config.tick_period();
    let mut next_tick = Instant::now() + period;

    loop {
        // wait out the tick period in short slices, watching shutdown
        while !controls.is_shutdown() && Instant::now() < next_tick {
            let wait = next_tick.saturating_duration_since(Instant::now());
            std::thread::sleep(wait.min(SHUTDOWN_POLL));
        }
        if controls.is_shutdown() {
            debug!("dashboard thread shutting down");
            return Ok(());
        }
        next_tick += period;

        dash.set_auto_refresh(controls.auto_refresh_enabled());

        let frame = match &trigger_rx {
            None => dash.tick()?,
            Some(rx) => {
                dash.ingest()?;
                // drain: several queued triggers still mean one redraw
                let mut fired = false;
                while rx.try_recv().is_ok() {
                    fired = true;
                }
                if fired && dash.auto_refresh_enabled() {
                    Some(dash.render_frame())
                } else {
                    None
                }
            }
        };

        recorder.record(TickResult {
            tick_id: dash.tick_id(),
            strategy: config.strategy.to_string(),
            buffer_len: dash.buffer().len(),
            triggered: frame.is_some(),
            pnl: frame.as_ref().map(|f| f.pnl),
        });

        if let Some(frame) = frame {
            if frame_tx.send(frame).is_err() {
                warn!("render consumer went away, ending session");
                return Err(FeedError::ChannelClosed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{SimulatedPriceSource, Strategy};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn fast_config(strategy: Strategy) -> DashboardConfig {
        DashboardConfig {
            strategy,
            tick_period_ms: 10,
            refresh_interval_secs: 0.03,
            ..DashboardConfig::default()
        }
    }

    #[test]
    fn polling_session_emits_frames_and_stops_on_shutdown() {
        let config = fast_config(Strategy::Polling);
        let controls = Arc::new(DashboardControls::new());
        let recorder = TickRecorder::new();
        let (frame_tx, frame_rx) = mpsc::sync_channel(64);

        let worker = {
            let config = config.clone();
            let controls = Arc::clone(&controls);
            let recorder = recorder.clone();
            thread::spawn(move || {
                run_dashboard_thread(
                    config,
                    SimulatedPriceSource::seeded(1),
                    frame_tx,
                    None,
                    controls,
                    recorder,
                )
            })
        };

        thread::sleep(Duration::from_millis(200));
        controls.request_shutdown();
        worker.join().unwrap().unwrap();

        let frames: Vec<_> = frame_rx.try_iter().collect();
        assert!(frames.len() >= 2, "expected frames, got {}", frames.len());
        assert!(recorder.len() >= frames.len());
        assert_eq!(recorder.trigger_count(), frames.len());
        // each frame carries the full snapshot at emission time
        assert!(!frames[0].series.is_empty());
    }

    #[test]
    fn timer_session_respects_disabled_auto_refresh() {
        let config = fast_config(Strategy::Timer);
        let controls = Arc::new(DashboardControls::new());
        controls.set_auto_refresh(false);
        let recorder = TickRecorder::new();
        let (frame_tx, frame_rx) = mpsc::sync_channel(64);
        let (trigger_tx, trigger_rx) = mpsc::sync_channel(8);

        let _timer = crate::timer::spawn_trigger_timer(
            config.refresh_interval(),
            trigger_tx,
            Arc::clone(&controls),
        );
        let worker = {
            let config = config.clone();
            let controls = Arc::clone(&controls);
            let recorder = recorder.clone();
            thread::spawn(move || {
                run_dashboard_thread(
                    config,
                    SimulatedPriceSource::seeded(2),
                    frame_tx,
                    Some(trigger_rx),
                    controls,
                    recorder,
                )
            })
        };

        thread::sleep(Duration::from_millis(150));
        controls.request_shutdown();
        worker.join().unwrap().unwrap();

        assert_eq!(frame_rx.try_iter().count(), 0);
        // ingestion continued while frames were suppressed
        let results = recorder.get_results();
        assert!(!results.is_empty());
        assert!(results.last().unwrap().buffer_len > 1);
    }

    #[test]
    fn timer_session_emits_frames_when_enabled() {
        let config = fast_config(Strategy::Timer);
        let controls = Arc::new(DashboardControls::new());
        let recorder = TickRecorder::new();
        let (frame_tx, frame_rx) = mpsc::sync_channel(64);
        let (trigger_tx, trigger_rx) = mpsc::sync_channel(8);

        let _timer = crate::timer::spawn_trigger_timer(
            config.refresh_interval(),
            trigger_tx,
            Arc::clone(&controls),
        );
        let worker = {
            let config = config.clone();
            let controls = Arc::clone(&controls);
            let recorder = recorder.clone();
            thread::spawn(move || {
                run_dashboard_thread(
                    config,
                    SimulatedPriceSource::seeded(3),
                    frame_tx,
                    Some(trigger_rx),
                    controls,
                    recorder,
                )
            })
        };

        thread::sleep(Duration::from_millis(200));
        controls.request_shutdown();
        worker.join().unwrap().unwrap();

        assert!(frame_rx.try_iter().count() >= 2);
    }
}
