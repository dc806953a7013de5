use std::fmt;
use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::FeedError;
use crate::series::DEFAULT_CAPACITY;

/// How the next scheduling evaluation is arranged.
///
/// `Polling` re-checks elapsed time on every tick of the loop; `Timer`
/// runs a background timer that posts triggers through a channel so the
/// loop never blocks on cadence timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Polling,
    Timer,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Polling => write!(f, "polling"),
            Strategy::Timer => write!(f, "timer"),
        }
    }
}

/// Deployment-time constants for one dashboard session.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub dashboard_name: String,
    pub duration_secs: u64,
    pub tick_period_ms: u64,
    pub refresh_interval_secs: f64,
    pub buffer_capacity: usize,
    pub strategy: Strategy,
    pub fetch_ttl_secs: f64,
    pub enable_logging: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dashboard_name: "Real-Time Trading Dashboard".to_string(),
            duration_secs: 10,
            tick_period_ms: 1000,
            refresh_interval_secs: 1.0,
            buffer_capacity: DEFAULT_CAPACITY,
            strategy: Strategy::Polling,
            fetch_ttl_secs: 60.0,
            enable_logging: true,
        }
    }
}

impl DashboardConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs)
    }

    pub fn fetch_ttl(&self) -> Duration {
        Duration::from_secs_f64(self.fetch_ttl_secs)
    }
}

pub fn load_config(path: &str) -> Result<DashboardConfig, FeedError> {
    let content = fs::read_to_string(path).map_err(|source| FeedError::ConfigIo {
        path: path.to_string(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| FeedError::ConfigParse {
        path: path.to_string(),
        source,
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_observed_deployment() {
        let config = DashboardConfig::default();
        assert_eq!(config.buffer_capacity, 100);
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
        assert_eq!(config.fetch_ttl(), Duration::from_secs(60));
        assert_eq!(config.strategy, Strategy::Polling);
    }

    #[test]
    fn loads_full_config_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dashboard_name = "Demo"
duration_secs = 30
tick_period_ms = 500
refresh_interval_secs = 10.0
buffer_capacity = 250
strategy = "timer"
fetch_ttl_secs = 120.0
enable_logging = false
"#
        )
        .unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.dashboard_name, "Demo");
        assert_eq!(config.tick_period(), Duration::from_millis(500));
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.buffer_capacity, 250);
        assert_eq!(config.strategy, Strategy::Timer);
        assert!(!config.enable_logging);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "refresh_interval_secs = 60.0").unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.buffer_capacity, 100);
    }

    #[test]
    fn missing_file_and_bad_toml_are_distinct_errors() {
        assert!(matches!(
            load_config("configs/does_not_exist.toml"),
            Err(FeedError::ConfigIo { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strategy = \"sleep\"").unwrap();
        assert!(matches!(
            load_config(file.path().to_str().unwrap()),
            Err(FeedError::ConfigParse { .. })
        ));
    }
}
