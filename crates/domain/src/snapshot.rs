//! Serialization-ready response payloads produced by the aggregation engine.

use crate::log_entry::LogEntry;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// Reporting window an aggregation was computed over. The bounds label the
/// snapshot; they do not filter entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub files_parsed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_queries: u64,
    pub blocked_queries: u64,
    pub cached_queries: u64,
    pub unique_domains: u64,
    pub unique_clients: u64,
    pub avg_duration_ms: f64,
    pub p95_duration_ms: f64,
}

/// Hour-of-day volume bucket, aggregated across calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyBucket {
    pub hour: u32,
    pub total: u64,
    pub blocked: u64,
    pub cached: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedDomain {
    pub domain: String,
    pub count: u64,
    /// Block reason last seen for this domain.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientStats {
    pub ip: String,
    /// Display name first seen for this client.
    pub name: String,
    pub total: u64,
    pub blocked: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub period: Period,
    pub summary: Summary,
    pub hourly: Vec<HourlyBucket>,
    pub top_domains: Vec<DomainCount>,
    pub top_blocked: Vec<BlockedDomain>,
    pub clients: Vec<ClientStats>,
    pub query_types: HashMap<String, u64>,
    pub response_categories: HashMap<String, u64>,
    pub return_codes: HashMap<String, u64>,
}

/// One fixed-width timeline interval, keyed by its truncated start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub timestamp: NaiveDateTime,
    pub total: u64,
    pub blocked: u64,
    pub cached: u64,
}

/// Paginated raw-log response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogsResponse {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub entries: Vec<LogEntry>,
}
