//! OS-thread cadence strategies for the dashboard loop.
//!
//! The session runs one worker thread that ticks at the configured
//! period. Cadence is decided either by polling the scheduler on every
//! tick, or by a background timer thread that posts triggers through a
//! channel so the worker never blocks on refresh timing.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{DashboardConfig, DashboardControls, RenderFrame, SimulatedPriceSource, Strategy, TickRecorder};
use tracing::{error, info};

pub mod dashboard;
pub mod timer;

pub use dashboard::run_dashboard_thread;
pub use timer::spawn_trigger_timer;

/// Run one dashboard session for `config.duration_secs`, sending render
/// frames to `frame_tx`. Returns the per-tick recorder for reporting.
pub fn run_session(config: DashboardConfig, frame_tx: mpsc::SyncSender<RenderFrame>) -> TickRecorder {
    let controls = Arc::new(DashboardControls::new());
    let recorder = TickRecorder::new();

    let trigger_rx = match config.strategy {
        Strategy::Timer => {
            let (trigger_tx, trigger_rx) = mpsc::sync_channel(8);
            // the timer observes the shutdown flag and exits on its own
            let _timer = timer::spawn_trigger_timer(
                config.refresh_interval(),
                trigger_tx,
                Arc::clone(&controls),
            );
            Some(trigger_rx)
        }
        Strategy::Polling => None,
    };

    let worker = {
        let config = config.clone();
        let controls = Arc::clone(&controls);
        let recorder = recorder.clone();
        thread::spawn(move || {
            dashboard::run_dashboard_thread(
                config,
                SimulatedPriceSource::new(),
                frame_tx,
                trigger_rx,
                controls,
                recorder,
            )
        })
    };

    info!(strategy = %config.strategy, duration_secs = config.duration_secs, "threaded session started");
    thread::sleep(Duration::from_secs(config.duration_secs));
    controls.request_shutdown();

    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "dashboard thread stopped with error"),
        Err(_) => error!("dashboard thread panicked"),
    }

    recorder
}
