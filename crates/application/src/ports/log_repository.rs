use async_trait::async_trait;
use chrono::NaiveDateTime;
use querylens_domain::{LogError, LogFilter, LogsResponse, StatsSnapshot, TimelineBucket};
use std::fmt;

/// Fixed bucket width for timeline aggregation. Ordered finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeGranularity {
    Minute,
    QuarterHour,
    Hour,
    Day,
}

impl TimeGranularity {
    pub const fn seconds(self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::QuarterHour => 900,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minute => "1m",
            Self::QuarterHour => "15m",
            Self::Hour => "1h",
            Self::Day => "1d",
        }
    }

    /// Parses the wire value (`1m`, `15m`, `1h`, `1d`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Minute),
            "15m" => Some(Self::QuarterHour),
            "1h" => Some(Self::Hour),
            "1d" => Some(Self::Day),
            _ => None,
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Analytic access to the query-log corpus for a reporting window.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn get_stats(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<StatsSnapshot, LogError>;

    async fn get_timeline(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: TimeGranularity,
    ) -> Result<Vec<TimelineBucket>, LogError>;

    async fn query_logs(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: LogFilter,
        limit: usize,
        offset: usize,
    ) -> Result<LogsResponse, LogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularities_order_finest_to_coarsest() {
        assert!(TimeGranularity::Minute < TimeGranularity::QuarterHour);
        assert!(TimeGranularity::QuarterHour < TimeGranularity::Hour);
        assert!(TimeGranularity::Hour < TimeGranularity::Day);
    }

    #[test]
    fn parse_round_trips_labels() {
        for g in [
            TimeGranularity::Minute,
            TimeGranularity::QuarterHour,
            TimeGranularity::Hour,
            TimeGranularity::Day,
        ] {
            assert_eq!(TimeGranularity::parse(g.label()), Some(g));
        }
        assert_eq!(TimeGranularity::parse("5m"), None);
    }
}
