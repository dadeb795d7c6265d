use anyhow::bail;
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Resolves a reporting-range preset against the current wall clock.
///
/// `today` is midnight to now; `yesterday` is the full prior calendar day;
/// `7d` and `30d` start at midnight 6 and 29 days back respectively and run
/// to now, so `7d` covers seven calendar days including today.
pub fn parse_range(
    name: &str,
    now: NaiveDateTime,
) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    let midnight = now.date().and_time(NaiveTime::MIN);
    Ok(match name {
        "today" => (midnight, now),
        "yesterday" => (
            midnight - Duration::days(1),
            midnight - Duration::seconds(1),
        ),
        "7d" => (midnight - Duration::days(6), now),
        "30d" => (midnight - Duration::days(29), now),
        other => bail!("unknown range {other:?} (expected today, yesterday, 7d or 30d)"),
    })
}

/// Default window for `logs`: yesterday's midnight through now.
pub fn default_logs_range(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let midnight = now.date().and_time(NaiveTime::MIN);
    (midnight - Duration::days(1), now)
}
