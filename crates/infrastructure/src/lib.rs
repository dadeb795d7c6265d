//! Querylens Infrastructure Layer
//!
//! File-backed implementation of the log analytics ports: TSV entry parsing,
//! per-day file enumeration, the fingerprint-validated aggregation cache, the
//! raw-log query path, and the live tail.
pub mod repositories;
pub mod tail;

pub use repositories::{FileLogRepository, FileStatsCache};
pub use tail::{LogTailer, TailEvent};
