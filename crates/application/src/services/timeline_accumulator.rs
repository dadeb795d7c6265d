use crate::ports::TimeGranularity;
use chrono::{DateTime, NaiveDateTime};
use querylens_domain::{LogError, LogEntry, TimelineBucket};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
struct BucketCounts {
    total: u64,
    blocked: u64,
    cached: u64,
}

/// Sparse time-bucketed volume counts, keyed by epoch-aligned bucket start.
///
/// Mergeable at equal native granularity. Existing buckets can be re-keyed to
/// a coarser granularity; going finer than native is unsupported because the
/// original sub-bucket distribution is gone.
#[derive(Debug, Clone)]
pub struct TimelineAccumulator {
    granularity: TimeGranularity,
    buckets: HashMap<i64, BucketCounts>,
}

impl TimelineAccumulator {
    pub fn new(granularity: TimeGranularity) -> Self {
        Self {
            granularity,
            buckets: HashMap::new(),
        }
    }

    pub fn granularity(&self) -> TimeGranularity {
        self.granularity
    }

    pub fn add(&mut self, entry: &LogEntry) {
        let key = truncate_to(entry.timestamp, self.granularity);
        let bucket = self.buckets.entry(key).or_default();
        bucket.total += 1;
        if entry.is_blocked() {
            bucket.blocked += 1;
        }
        if entry.is_cached() {
            bucket.cached += 1;
        }
    }

    pub fn merge(&mut self, other: &TimelineAccumulator) -> Result<(), LogError> {
        if other.granularity != self.granularity {
            return Err(LogError::UnsupportedReaggregation {
                native: self.granularity.to_string(),
                requested: other.granularity.to_string(),
            });
        }
        for (key, theirs) in &other.buckets {
            let bucket = self.buckets.entry(*key).or_default();
            bucket.total += theirs.total;
            bucket.blocked += theirs.blocked;
            bucket.cached += theirs.cached;
        }
        Ok(())
    }

    /// Re-keys the buckets at a coarser granularity, summing collisions.
    pub fn reaggregate_to(
        &self,
        granularity: TimeGranularity,
    ) -> Result<TimelineAccumulator, LogError> {
        if granularity < self.granularity {
            return Err(LogError::UnsupportedReaggregation {
                native: self.granularity.to_string(),
                requested: granularity.to_string(),
            });
        }
        if granularity == self.granularity {
            return Ok(self.clone());
        }

        let mut coarser = TimelineAccumulator::new(granularity);
        for (key, counts) in &self.buckets {
            let new_key = key - key.rem_euclid(granularity.seconds());
            let bucket = coarser.buckets.entry(new_key).or_default();
            bucket.total += counts.total;
            bucket.blocked += counts.blocked;
            bucket.cached += counts.cached;
        }
        Ok(coarser)
    }

    /// Consumes the buckets into a sequence sorted ascending by start instant.
    /// Empty input yields an empty sequence.
    pub fn finalize(self) -> Vec<TimelineBucket> {
        let mut keys: Vec<i64> = self.buckets.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|key| {
                let counts = self.buckets.get(&key)?;
                let timestamp = DateTime::from_timestamp(key, 0)?.naive_utc();
                Some(TimelineBucket {
                    timestamp,
                    total: counts.total,
                    blocked: counts.blocked,
                    cached: counts.cached,
                })
            })
            .collect()
    }
}

fn truncate_to(timestamp: NaiveDateTime, granularity: TimeGranularity) -> i64 {
    let secs = timestamp.and_utc().timestamp();
    secs - secs.rem_euclid(granularity.seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry_at(hour: u32, minute: u32, reason: &str) -> LogEntry {
        LogEntry {
            timestamp: NaiveDate::from_ymd_opt(2026, 2, 14)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
            client_ip: "10.0.0.1".to_string(),
            client_name: "PC".to_string(),
            resolved_name: String::new(),
            duration_ms: 0.0,
            response_reason: reason.to_string(),
            domain: "example.com.".to_string(),
            response_answer: String::new(),
            return_code: "NOERROR".to_string(),
            response_category: reason.to_string(),
            query_type: "A".to_string(),
            source: "blocky".to_string(),
        }
    }

    #[test]
    fn buckets_by_truncated_hour() {
        let mut acc = TimelineAccumulator::new(TimeGranularity::Hour);
        acc.add(&entry_at(0, 10, "RESOLVED"));
        acc.add(&entry_at(0, 20, "CACHED"));
        acc.add(&entry_at(1, 5, "BLOCKED (ads)"));
        let buckets = acc.finalize();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].total, 2);
        assert_eq!(buckets[0].cached, 1);
        assert_eq!(buckets[1].total, 1);
        assert_eq!(buckets[1].blocked, 1);
        assert!(buckets[0].timestamp < buckets[1].timestamp);
        assert_eq!(
            buckets[0].timestamp,
            NaiveDate::from_ymd_opt(2026, 2, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn merge_requires_equal_granularity() {
        let mut hourly = TimelineAccumulator::new(TimeGranularity::Hour);
        hourly.add(&entry_at(0, 10, "RESOLVED"));

        let mut other = TimelineAccumulator::new(TimeGranularity::Hour);
        other.add(&entry_at(0, 30, "RESOLVED"));
        other.add(&entry_at(1, 5, "BLOCKED (ads)"));
        assert!(hourly.merge(&other).is_ok());

        let buckets = hourly.clone().finalize();
        assert_eq!(buckets[0].total, 2);

        let daily = TimelineAccumulator::new(TimeGranularity::Day);
        assert!(matches!(
            hourly.merge(&daily),
            Err(LogError::UnsupportedReaggregation { .. })
        ));
    }

    #[test]
    fn hourly_reaggregated_to_daily_matches_direct_daily() {
        let entries = [
            entry_at(0, 10, "RESOLVED"),
            entry_at(0, 45, "CACHED"),
            entry_at(13, 0, "BLOCKED (ads)"),
            entry_at(23, 59, "RESOLVED"),
        ];

        let mut hourly = TimelineAccumulator::new(TimeGranularity::Hour);
        let mut daily = TimelineAccumulator::new(TimeGranularity::Day);
        for e in &entries {
            hourly.add(e);
            daily.add(e);
        }

        let reaggregated = hourly.reaggregate_to(TimeGranularity::Day).unwrap();
        assert_eq!(reaggregated.finalize(), daily.finalize());
    }

    #[test]
    fn finer_reaggregation_is_rejected() {
        let hourly = TimelineAccumulator::new(TimeGranularity::Hour);
        assert!(matches!(
            hourly.reaggregate_to(TimeGranularity::QuarterHour),
            Err(LogError::UnsupportedReaggregation { .. })
        ));
        // Equal granularity is a no-op, not an error.
        assert!(hourly.reaggregate_to(TimeGranularity::Hour).is_ok());
    }

    #[test]
    fn empty_accumulator_finalizes_to_empty_sequence() {
        let acc = TimelineAccumulator::new(TimeGranularity::Hour);
        assert!(acc.finalize().is_empty());
    }
}
