use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::FeedError;
use crate::schedule::RefreshScheduler;
use crate::series::BoundedSeriesBuffer;
use crate::source::{PnlFeed, SampleSource};
use crate::{RenderFrame, Sample};

/// Orchestrator for one dashboard session: pulls a sample from the
/// source, appends it to the buffer, and asks the scheduler whether the
/// renderer should be signalled.
///
/// Owns its buffer and refresh state; never share one instance across
/// sessions. How (and how often) `tick` is re-invoked is the hosting
/// environment's concern.
pub struct DashboardLoop<S> {
    source: S,
    buffer: BoundedSeriesBuffer,
    scheduler: RefreshScheduler,
    pnl: PnlFeed,
    tick_id: u64,
}

impl<S: SampleSource> DashboardLoop<S> {
    pub fn new(source: S, capacity: usize, interval: Duration) -> Self {
        Self::with_start(source, capacity, interval, Instant::now())
    }

    /// Start the cadence window at an explicit instant.
    pub fn with_start(source: S, capacity: usize, interval: Duration, now: Instant) -> Self {
        Self {
            source,
            buffer: BoundedSeriesBuffer::new(capacity),
            scheduler: RefreshScheduler::with_start(interval, now),
            pnl: PnlFeed::new(),
            tick_id: 0,
        }
    }

    /// Pull one sample and append it, without a scheduling decision.
    /// Used by timer-driven sessions, which render on trigger receipt.
    pub fn ingest(&mut self) -> Result<Sample, FeedError> {
        let sample = self.source.next_sample(self.buffer.len())?;
        self.buffer.append(sample);
        self.tick_id += 1;
        Ok(sample)
    }

    /// One full tick: ingest, then emit a frame if a refresh is due.
    /// Source failures propagate unmodified; nothing is retried here.
    pub fn tick_at(&mut self, now: Instant) -> Result<Option<RenderFrame>, FeedError> {
        self.ingest()?;
        if self.scheduler.evaluate_at(now) {
            Ok(Some(self.render_frame()))
        } else {
            Ok(None)
        }
    }

    pub fn tick(&mut self) -> Result<Option<RenderFrame>, FeedError> {
        self.tick_at(Instant::now())
    }

    /// Build the render signal: current snapshot plus a fresh PnL scalar.
    pub fn render_frame(&mut self) -> RenderFrame {
        let frame = RenderFrame {
            tick_id: self.tick_id,
            series: self.buffer.snapshot(),
            pnl: self.pnl.next_pnl(),
        };
        debug!(tick_id = frame.tick_id, samples = frame.series.len(), "render frame emitted");
        frame
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.scheduler.set_enabled(enabled);
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    pub fn buffer(&self) -> &BoundedSeriesBuffer {
        &self.buffer
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoxError;
    use crate::source::SimulatedPriceSource;

    struct FailingSource;

    impl SampleSource for FailingSource {
        fn next_sample(&mut self, _depth: usize) -> Result<Sample, FeedError> {
            Err(FeedError::Source(BoxError::from("socket reset")))
        }
    }

    fn demo_loop(interval_secs: u64, t0: Instant) -> DashboardLoop<SimulatedPriceSource> {
        DashboardLoop::with_start(
            SimulatedPriceSource::seeded(11),
            100,
            Duration::from_secs(interval_secs),
            t0,
        )
    }

    #[test]
    fn frame_emitted_only_when_interval_elapsed() {
        let t0 = Instant::now();
        let mut dash = demo_loop(1, t0);

        let early = dash.tick_at(t0 + Duration::from_millis(500)).unwrap();
        assert!(early.is_none());
        assert_eq!(dash.buffer().len(), 1);

        let due = dash.tick_at(t0 + Duration::from_secs(1)).unwrap();
        let frame = due.expect("frame due at interval boundary");
        assert_eq!(frame.tick_id, 2);
        assert_eq!(frame.series.len(), 2);
        assert!((-1000..=1000).contains(&frame.pnl));
    }

    #[test]
    fn disabling_auto_refresh_suppresses_frames_but_not_ingestion() {
        let t0 = Instant::now();
        let mut dash = demo_loop(1, t0);
        dash.set_auto_refresh(false);

        for i in 1..=5 {
            let out = dash.tick_at(t0 + Duration::from_secs(10 * i)).unwrap();
            assert!(out.is_none());
        }
        assert_eq!(dash.buffer().len(), 5);

        dash.set_auto_refresh(true);
        let out = dash.tick_at(t0 + Duration::from_secs(60)).unwrap();
        assert!(out.is_some());
    }

    #[test]
    fn source_failure_propagates_and_leaves_buffer_unchanged() {
        let t0 = Instant::now();
        let mut dash =
            DashboardLoop::with_start(FailingSource, 100, Duration::from_secs(1), t0);

        let err = dash.tick_at(t0 + Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FeedError::Source(_)));
        assert!(dash.buffer().is_empty());
        assert_eq!(dash.tick_id(), 0);
    }

    #[test]
    fn snapshot_in_frame_is_bounded() {
        let t0 = Instant::now();
        let mut dash = DashboardLoop::with_start(
            SimulatedPriceSource::seeded(3),
            10,
            Duration::from_secs(1),
            t0,
        );
        for i in 1..=30 {
            dash.tick_at(t0 + Duration::from_secs(i)).unwrap();
        }
        let frame = dash.render_frame();
        assert_eq!(frame.series.len(), 10);
    }
}
