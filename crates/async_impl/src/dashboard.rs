use std::sync::Arc;

use common::{
    DashboardConfig, DashboardControls, DashboardLoop, FeedError, RenderFrame, SampleSource,
    TickRecorder, TickResult, Trigger,
};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Tick task for one dashboard session.
///
/// With `trigger_rx = None` the scheduler is polled on every tick; with
/// a receiver, cadence events arrive from the timer task and the
/// auto-refresh flag is re-checked on receipt. The tick itself stays
/// strictly sequential: pull, append, decide, emit.
pub async fn run_dashboard_task<S: SampleSource>(
    config: DashboardConfig,
    source: S,
    frame_tx: mpsc::Sender<RenderFrame>,
    mut trigger_rx: Option<mpsc::Receiver<Trigger>>,
    controls: Arc<DashboardControls>,
    recorder: TickRecorder,
) -> Result<(), FeedError> {
    let mut dash = DashboardLoop::new(source, config.buffer_capacity, config.refresh_interval());
    let period = config.tick_period();
    let mut next_tick = Instant::now();

    while !controls.is_shutdown() {
        next_tick += period;
        sleep_until(next_tick).await;
        if controls.is_shutdown() {
            break;
        }

        dash.set_auto_refresh(controls.auto_refresh_enabled());

        let frame = match trigger_rx.as_mut() {
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
            if frame_tx.send(frame).await.is_err() {
                warn!("render consumer went away, ending session");
                return Err(FeedError::ChannelClosed);
            }
        }
    }

    debug!("dashboard task shutting down");
    Ok(())
}
