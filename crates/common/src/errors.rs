use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported to the caller; the core itself has no fatal
/// condition. Source and fetch errors wrap the collaborator's error
/// unmodified as `source()`.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("sample source failure")]
    Source(#[source] BoxError),

    #[error("market data fetch failed for {symbol}")]
    Fetch {
        symbol: String,
        #[source]
        source: BoxError,
    },

    #[error("could not read config file {path}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid TOML")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("render channel closed by consumer")]
    ChannelClosed,

    #[error("failed to write metrics CSV")]
    Csv(#[from] csv::Error),
}
