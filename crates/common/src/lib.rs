use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod metrics;
pub mod schedule;
pub mod series;
pub mod source;

pub use cache::TtlCache;
pub use config::{DashboardConfig, Strategy};
pub use dashboard::DashboardLoop;
pub use errors::FeedError;
pub use metrics::{TickRecorder, TickResult};
pub use schedule::{RefreshScheduler, Trigger};
pub use series::BoundedSeriesBuffer;
pub use source::{SampleSource, SimulatedPriceSource};

/// A single (timestamp, value) observation flowing through the system.
///
/// Immutable once created; the wall-clock timestamp is what the renderer
/// shows on the chart x-axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// HH:MM:SS label for chart axes.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// The boundary artifact emitted when a refresh is due: everything an
/// external renderer needs to redraw the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    pub tick_id: u64,
    pub series: Vec<Sample>,
    pub pnl: i64,
}

impl RenderFrame {
    pub fn last_value(&self) -> Option<f64> {
        self.series.last().map(|s| s.value)
    }
}

/// Cross-thread control surface for one dashboard session.
///
/// `auto_refresh` mirrors the single boolean UI control; `shutdown` ends
/// the session. Both are read on every scheduling decision, so clearing
/// either is observed before the next trigger.
pub struct DashboardControls {
    auto_refresh: AtomicBool,
    shutdown: AtomicBool,
}

impl DashboardControls {
    pub fn new() -> Self {
        Self {
            auto_refresh: AtomicBool::new(true),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::Relaxed);
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

impl Default for DashboardControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_label_is_hh_mm_ss() {
        let s = Sample::new(Local::now(), 100.0);
        let label = s.time_label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }

    #[test]
    fn controls_default_to_running_with_auto_refresh() {
        let controls = DashboardControls::new();
        assert!(controls.auto_refresh_enabled());
        assert!(!controls.is_shutdown());

        controls.set_auto_refresh(false);
        controls.request_shutdown();
        assert!(!controls.auto_refresh_enabled());
        assert!(controls.is_shutdown());
    }
}
