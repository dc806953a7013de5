//! Tokio cadence strategies for the dashboard loop.
//!
//! Mirrors `threaded_impl` on the async runtime: one dashboard task
//! ticking via `sleep_until`, and for the timer strategy a separate
//! timer task posting triggers through an mpsc channel so the render
//! path never blocks on cadence timing.

use std::sync::Arc;
use std::time::Duration;

use common::{DashboardConfig, DashboardControls, RenderFrame, SimulatedPriceSource, Strategy, TickRecorder};
use tokio::sync::mpsc;
use tracing::{error, info};

pub mod dashboard;
pub mod timer;

pub use dashboard::run_dashboard_task;
pub use timer::run_trigger_timer;

/// Run one dashboard session for `config.duration_secs`, sending render
/// frames to `frame_tx`. Returns the per-tick recorder for reporting.
pub async fn run_session(
    config: DashboardConfig,
    frame_tx: mpsc::Sender<RenderFrame>,
) -> TickRecorder {
    let controls = Arc::new(DashboardControls::new());
    let recorder = TickRecorder::new();

    let trigger_rx = match config.strategy {
        Strategy::Timer => {
            let (trigger_tx, trigger_rx) = mpsc::channel(8);
            // the timer observes the shutdown flag and exits on its own
            let _timer = tokio::spawn(timer::run_trigger_timer(
                config.refresh_interval(),
                trigger_tx,
                Arc::clone(&controls),
            ));
            Some(trigger_rx)
        }
        Strategy::Polling => None,
    };

    let worker = tokio::spawn(dashboard::run_dashboard_task(
        config.clone(),
        SimulatedPriceSource::new(),
        frame_tx,
        trigger_rx,
        Arc::clone(&controls),
        recorder.clone(),
    ));

    info!(strategy = %config.strategy, duration_secs = config.duration_secs, "async session started");
    tokio::time::sleep(Duration::from_secs(config.duration_secs)).await;
    controls.request_shutdown();

    match worker.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "dashboard task stopped with error"),
        Err(e) => error!(error = %e, "dashboard task panicked"),
    }

    recorder
}
