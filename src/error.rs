//! Error types for the tuner.

/// Result type alias for tuner operations
pub type Result<T> = std::result::Result<T, TunerError>;

/// Errors that can occur while building or driving the tuner
#[derive(Debug, thiserror::Error)]
pub enum TunerError {
    /// No stations registered
    #[error("no stations registered")]
    EmptyCatalog,

    /// Frequency is NaN or infinite
    #[error("frequency {0} is not a finite number")]
    NonFiniteFrequency(f64),

    /// Station asset is unusable (missing, unreadable or zero length)
    #[error("invalid asset for station '{station}': {reason}")]
    InvalidAsset { station: String, reason: String },

    /// Two stations share a name or a frequency
    #[error("duplicate station: {0}")]
    DuplicateStation(String),

    /// Playback backend failed to load/play/seek
    #[error("{channel} channel unavailable: {reason}")]
    ChannelUnavailable { channel: String, reason: String },

    /// Requested frequency lies outside the receivable band
    #[error("frequency {frequency} MHz outside receivable band {min}-{max} MHz")]
    OutOfRangeFrequency { frequency: f64, min: f64, max: f64 },

    /// Request could not be parsed as a frequency
    #[error("invalid frequency '{0}'")]
    UnparsableFrequency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl TunerError {
    /// Create a channel failure for the named channel
    pub fn channel(channel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            channel: channel.into(),
            reason: reason.into(),
        }
    }

    /// Create an asset failure for the named station
    pub fn asset(station: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAsset {
            station: station.into(),
            reason: reason.into(),
        }
    }
}
