//! Querylens Domain Layer
pub mod config;
pub mod errors;
pub mod log_entry;
pub mod log_filter;
pub mod snapshot;

pub use config::Config;
pub use errors::LogError;
pub use log_entry::{LogEntry, TIMESTAMP_FORMAT};
pub use log_filter::{FilterKind, LogFilter};
pub use snapshot::{
    BlockedDomain, ClientStats, DomainCount, HourlyBucket, LogsResponse, Period, StatsSnapshot,
    Summary, TimelineBucket,
};
