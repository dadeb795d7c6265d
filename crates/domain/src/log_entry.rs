use chrono::NaiveDateTime;
use serde::Serialize;

/// Wall-clock timestamp format used by the log producer, first TSV column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One parsed DNS query log record.
///
/// Field order mirrors the 11-column tab-separated line written by the
/// filtering daemon. `resolved_name` is never set by parsing; it is filled
/// in later through the hostname resolver port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub client_ip: String,
    pub client_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resolved_name: String,
    pub duration_ms: f64,
    pub response_reason: String,
    pub domain: String,
    pub response_answer: String,
    pub return_code: String,
    pub response_category: String,
    pub query_type: String,
    pub source: String,
}

impl LogEntry {
    /// Whether the query was answered by the blocking engine.
    pub fn is_blocked(&self) -> bool {
        let reason = self.response_reason.to_uppercase();
        reason.starts_with("BLOCKED")
    }

    /// Whether the query was served from the daemon's cache. Matches
    /// "CACHED" exactly or a "CACHED " prefix; "CACHEDX" is not cached.
    pub fn is_cached(&self) -> bool {
        let reason = self.response_reason.to_uppercase();
        reason == "CACHED" || reason.starts_with("CACHED ")
    }
}
