use chrono::{NaiveDateTime, Timelike};
use querylens_domain::{
    BlockedDomain, ClientStats, DomainCount, HourlyBucket, LogEntry, Period, StatsSnapshot, Summary,
};
use std::collections::HashMap;

const TOP_N: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
struct HourCounts {
    total: u64,
    blocked: u64,
    cached: u64,
}

#[derive(Debug, Clone)]
struct BlockedCount {
    count: u64,
    reason: String,
}

#[derive(Debug, Clone)]
struct ClientCount {
    name: String,
    total: u64,
    blocked: u64,
}

/// Incremental, mergeable aggregation of log entries over a reporting window.
///
/// The window bounds only label the resulting snapshot; entries are counted
/// wherever their timestamps fall. Per-file accumulators built by the cache
/// merge into a combined range accumulator before finalizing, so `add` and
/// `merge` must agree: counts add, tables union-and-add, the blocked-domain
/// reason survives from either side, latency samples concatenate.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    start: NaiveDateTime,
    end: NaiveDateTime,
    total: u64,
    blocked: u64,
    cached: u64,
    hourly: [HourCounts; 24],
    domains: HashMap<String, u64>,
    blocked_domains: HashMap<String, BlockedCount>,
    clients: HashMap<String, ClientCount>,
    query_types: HashMap<String, u64>,
    response_categories: HashMap<String, u64>,
    return_codes: HashMap<String, u64>,
    durations: Vec<f64>,
    duration_sum: f64,
}

impl StatsAccumulator {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            total: 0,
            blocked: 0,
            cached: 0,
            hourly: [HourCounts::default(); 24],
            domains: HashMap::new(),
            blocked_domains: HashMap::new(),
            clients: HashMap::new(),
            query_types: HashMap::new(),
            response_categories: HashMap::new(),
            return_codes: HashMap::new(),
            durations: Vec::new(),
            duration_sum: 0.0,
        }
    }

    pub fn add(&mut self, entry: &LogEntry) {
        let blocked = entry.is_blocked();
        let cached = entry.is_cached();

        self.total += 1;
        if blocked {
            self.blocked += 1;
        }
        if cached {
            self.cached += 1;
        }

        let hour = &mut self.hourly[entry.timestamp.hour() as usize];
        hour.total += 1;
        if blocked {
            hour.blocked += 1;
        }
        if cached {
            hour.cached += 1;
        }

        *self.domains.entry(entry.domain.clone()).or_insert(0) += 1;

        if blocked {
            self.blocked_domains
                .entry(entry.domain.clone())
                .and_modify(|b| {
                    b.count += 1;
                    b.reason = entry.response_reason.clone();
                })
                .or_insert_with(|| BlockedCount {
                    count: 1,
                    reason: entry.response_reason.clone(),
                });
        }

        self.clients
            .entry(entry.client_ip.clone())
            .and_modify(|c| {
                c.total += 1;
                if blocked {
                    c.blocked += 1;
                }
            })
            .or_insert_with(|| ClientCount {
                name: entry.client_name.clone(),
                total: 1,
                blocked: u64::from(blocked),
            });

        *self
            .query_types
            .entry(entry.query_type.clone())
            .or_insert(0) += 1;
        *self
            .response_categories
            .entry(entry.response_category.clone())
            .or_insert(0) += 1;
        *self
            .return_codes
            .entry(entry.return_code.clone())
            .or_insert(0) += 1;

        self.durations.push(entry.duration_ms);
        self.duration_sum += entry.duration_ms;
    }

    pub fn merge(&mut self, other: &StatsAccumulator) {
        self.total += other.total;
        self.blocked += other.blocked;
        self.cached += other.cached;

        for (ours, theirs) in self.hourly.iter_mut().zip(other.hourly.iter()) {
            ours.total += theirs.total;
            ours.blocked += theirs.blocked;
            ours.cached += theirs.cached;
        }

        for (domain, count) in &other.domains {
            *self.domains.entry(domain.clone()).or_insert(0) += count;
        }

        for (domain, theirs) in &other.blocked_domains {
            self.blocked_domains
                .entry(domain.clone())
                .and_modify(|b| b.count += theirs.count)
                .or_insert_with(|| theirs.clone());
        }

        for (ip, theirs) in &other.clients {
            self.clients
                .entry(ip.clone())
                .and_modify(|c| {
                    c.total += theirs.total;
                    c.blocked += theirs.blocked;
                })
                .or_insert_with(|| theirs.clone());
        }

        for (key, count) in &other.query_types {
            *self.query_types.entry(key.clone()).or_insert(0) += count;
        }
        for (key, count) in &other.response_categories {
            *self.response_categories.entry(key.clone()).or_insert(0) += count;
        }
        for (key, count) in &other.return_codes {
            *self.return_codes.entry(key.clone()).or_insert(0) += count;
        }

        self.durations.extend_from_slice(&other.durations);
        self.duration_sum += other.duration_sum;
    }

    /// Consumes the accumulated state into an immutable snapshot.
    pub fn finalize(self, files_parsed: usize) -> StatsSnapshot {
        let (avg_duration_ms, p95_duration_ms) = duration_stats(self.durations, self.duration_sum);

        let hourly = self
            .hourly
            .iter()
            .enumerate()
            .map(|(hour, counts)| HourlyBucket {
                hour: hour as u32,
                total: counts.total,
                blocked: counts.blocked,
                cached: counts.cached,
            })
            .collect();

        let mut top_domains: Vec<DomainCount> = self
            .domains
            .iter()
            .map(|(domain, count)| DomainCount {
                domain: domain.clone(),
                count: *count,
            })
            .collect();
        // Descending by count; ties break on the name so output is stable.
        top_domains.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
        top_domains.truncate(TOP_N);

        let mut top_blocked: Vec<BlockedDomain> = self
            .blocked_domains
            .into_iter()
            .map(|(domain, b)| BlockedDomain {
                domain,
                count: b.count,
                reason: b.reason,
            })
            .collect();
        top_blocked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
        top_blocked.truncate(TOP_N);

        let mut clients: Vec<ClientStats> = self
            .clients
            .into_iter()
            .map(|(ip, c)| ClientStats {
                ip,
                name: c.name,
                total: c.total,
                blocked: c.blocked,
            })
            .collect();
        clients.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.ip.cmp(&b.ip)));

        StatsSnapshot {
            period: Period {
                start: self.start,
                end: self.end,
                files_parsed,
            },
            summary: Summary {
                total_queries: self.total,
                blocked_queries: self.blocked,
                cached_queries: self.cached,
                unique_domains: self.domains.len() as u64,
                unique_clients: clients.len() as u64,
                avg_duration_ms,
                p95_duration_ms,
            },
            hourly,
            top_domains,
            top_blocked,
            clients,
            query_types: self.query_types,
            response_categories: self.response_categories,
            return_codes: self.return_codes,
        }
    }
}

/// Mean rounded to one decimal plus nearest-rank p95
/// (`floor(0.95 * count)` clamped to `count - 1`). Zero for empty input.
fn duration_stats(mut durations: Vec<f64>, sum: f64) -> (f64, f64) {
    if durations.is_empty() {
        return (0.0, 0.0);
    }
    let avg = (sum / durations.len() as f64 * 10.0).round() / 10.0;
    durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((durations.len() as f64 * 0.95) as usize).min(durations.len() - 1);
    (avg, durations[idx])
}
