use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

use crate::errors::FeedError;

/// One row of per-tick bookkeeping for a dashboard session.
#[derive(Debug, Serialize, Clone)]
pub struct TickResult {
    pub tick_id: u64,
    pub strategy: String,
    pub buffer_len: usize,
    pub triggered: bool,
    pub pnl: Option<i64>,
}

/// Thread-safe tick recorder with internal mutability; cloning is cheap
/// (clones the Arcs, not the data).
#[derive(Clone)]
pub struct TickRecorder {
    results: Arc<Mutex<Vec<TickResult>>>,
    triggers: Arc<AtomicUsize>,
}

impl TickRecorder {
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::with_capacity(1024))),
            triggers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn record(&self, result: TickResult) {
        if let Ok(mut data) = self.results.lock() {
            if result.triggered {
                self.triggers.fetch_add(1, Ordering::Relaxed);
            }
            data.push(result);
        }
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.results.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_results(&self) -> Vec<TickResult> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn save_to_csv(&self, filename: &str) -> Result<(), FeedError> {
        let data = self.get_results();
        let mut wtr = csv::Writer::from_path(filename)?;
        for record in &data {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        info!(records = data.len(), file = filename, "saved tick metrics");
        Ok(())
    }
}

impl Default for TickRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tick_id: u64, triggered: bool) -> TickResult {
        TickResult {
            tick_id,
            strategy: "polling".to_string(),
            buffer_len: tick_id as usize,
            triggered,
            pnl: triggered.then_some(250),
        }
    }

    #[test]
    fn records_and_counts_triggers() {
        let recorder = TickRecorder::new();
        recorder.record(result(1, false));
        recorder.record(result(2, true));
        recorder.record(result(3, false));

        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.trigger_count(), 1);
        assert_eq!(recorder.get_results()[1].pnl, Some(250));
    }

    #[test]
    fn saves_csv_with_header_and_rows() {
        let recorder = TickRecorder::new();
        recorder.record(result(1, true));
        recorder.record(result(2, false));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticks.csv");
        recorder.save_to_csv(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("tick_id"));
        assert!(lines[1].contains("true"));
    }
}
