use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LogError {
    /// One line failed to parse. Consumers skip the line and continue; the
    /// producer writes concurrently and partial lines are expected.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A log file could not be opened or stat'd. Aggregation skips the file
    /// and continues over the rest of the range.
    #[error("unreadable log file {path}: {reason}")]
    FileUnreadable { path: String, reason: String },

    /// Timeline buckets can only be re-aggregated to a coarser granularity
    /// than they were accumulated at.
    #[error("cannot re-aggregate {native} buckets to {requested}")]
    UnsupportedReaggregation { native: String, requested: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}
