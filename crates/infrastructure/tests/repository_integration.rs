//! End-to-end tests over real log directories on disk.

use chrono::{NaiveDate, NaiveDateTime};
use querylens_application::ports::{LogRepository, TimeGranularity};
use querylens_application::services::StaticResolver;
use querylens_domain::{FilterKind, LogError, LogFilter};
use querylens_infrastructure::{FileLogRepository, FileStatsCache};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

fn log_line(time: &str, ip: &str, name: &str, duration: &str, reason: &str, domain: &str) -> String {
    format!("{time}\t{ip}\t{name}\t{duration}\t{reason}\t{domain}\t\tNOERROR\t{reason}\tA\tblocky")
}

fn at(date: (i32, u32, u32), h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.0, date.1, date.2)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Two days of logs: day one in csv mode (`_ALL`), day two split per client.
fn write_fixture_dir(dir: &Path) {
    let day_one = [
        log_line("2026-02-14 08:00:00", "10.0.0.1", "10.0.0.1", "2.0", "RESOLVED", "example.com."),
        log_line("2026-02-14 08:15:00", "10.0.0.1", "10.0.0.1", "4.0", "CACHED", "example.com."),
        log_line("2026-02-14 09:30:00", "10.0.0.2", "phone", "6.0", "BLOCKED (ads)", "ad.example.net."),
    ];
    fs::write(dir.join("2026-02-14_ALL.log"), day_one.join("\n") + "\n").unwrap();

    let desktop = [log_line(
        "2026-02-15 10:00:00",
        "10.0.0.1",
        "10.0.0.1",
        "8.0",
        "RESOLVED",
        "example.com.",
    )];
    fs::write(dir.join("2026-02-15_10.0.0.1.log"), desktop.join("\n") + "\n").unwrap();

    let phone = [log_line(
        "2026-02-15 10:05:00",
        "10.0.0.2",
        "phone",
        "10.0",
        "BLOCKED (ads)",
        "tracker.example.net.",
    )];
    fs::write(dir.join("2026-02-15_10.0.0.2.log"), phone.join("\n") + "\n").unwrap();
}

fn repository(dir: &Path) -> FileLogRepository {
    FileLogRepository::new(dir, Arc::new(StaticResolver::default()))
}

#[tokio::test]
async fn stats_aggregate_across_days_and_file_layouts() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());

    let snapshot = repository(dir.path())
        .get_stats(at((2026, 2, 14), 0, 0, 0), at((2026, 2, 15), 23, 59, 59))
        .await
        .unwrap();

    assert_eq!(snapshot.summary.total_queries, 5);
    assert_eq!(snapshot.summary.blocked_queries, 2);
    assert_eq!(snapshot.summary.cached_queries, 1);
    assert_eq!(snapshot.summary.unique_clients, 2);
    assert_eq!(snapshot.summary.unique_domains, 3);
    assert_eq!(snapshot.summary.avg_duration_ms, 6.0);
    assert_eq!(snapshot.period.files_parsed, 3);

    assert_eq!(snapshot.top_domains[0].domain, "example.com.");
    assert_eq!(snapshot.top_domains[0].count, 3);
    assert_eq!(snapshot.top_blocked[0].reason, "BLOCKED (ads)");

    let by_hour: u64 = snapshot.hourly.iter().map(|b| b.total).sum();
    assert_eq!(by_hour, snapshot.summary.total_queries);
}

#[tokio::test]
async fn timeline_buckets_hourly_and_reaggregates_to_daily() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let repository = repository(dir.path());
    let (start, end) = (at((2026, 2, 14), 0, 0, 0), at((2026, 2, 15), 23, 59, 59));

    let hourly = repository
        .get_timeline(start, end, TimeGranularity::Hour)
        .await
        .unwrap();
    assert_eq!(hourly.len(), 3);
    assert_eq!(hourly[0].timestamp, at((2026, 2, 14), 8, 0, 0));
    assert_eq!(hourly[0].total, 2);
    assert_eq!(hourly[0].cached, 1);
    // Both day-two entries land in the 10:00 bucket.
    assert_eq!(hourly[2].timestamp, at((2026, 2, 15), 10, 0, 0));
    assert_eq!(hourly[2].total, 2);

    let daily = repository
        .get_timeline(start, end, TimeGranularity::Day)
        .await
        .unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].total, 3);
    assert_eq!(daily[1].total, 2);
    assert_eq!(daily[1].blocked, 1);
}

#[tokio::test]
async fn timeline_finer_than_hourly_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());

    let err = repository(dir.path())
        .get_timeline(
            at((2026, 2, 14), 0, 0, 0),
            at((2026, 2, 14), 23, 59, 59),
            TimeGranularity::Minute,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LogError::UnsupportedReaggregation { .. }));
}

#[tokio::test]
async fn query_logs_enriches_then_filters_by_resolved_name() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());

    let mut names = HashMap::new();
    names.insert("10.0.0.1".to_string(), "desktop.lan".to_string());
    let repository =
        FileLogRepository::new(dir.path(), Arc::new(StaticResolver::new(names)));

    let filter = LogFilter {
        client: Some("desktop".to_string()),
        ..Default::default()
    };
    let response = repository
        .query_logs(
            at((2026, 2, 14), 0, 0, 0),
            at((2026, 2, 15), 23, 59, 59),
            filter,
            100,
            0,
        )
        .await
        .unwrap();

    assert_eq!(response.total, 3);
    assert!(response
        .entries
        .iter()
        .all(|e| e.resolved_name == "desktop.lan"));
    // Newest first.
    assert_eq!(response.entries[0].timestamp, at((2026, 2, 15), 10, 0, 0));
}

#[tokio::test]
async fn query_logs_combines_filters_and_paginates() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let repository = repository(dir.path());

    let filter = LogFilter {
        domain: Some("example.net".to_string()),
        kind: Some(FilterKind::Blocked),
        ..Default::default()
    };
    let response = repository
        .query_logs(
            at((2026, 2, 14), 0, 0, 0),
            at((2026, 2, 15), 23, 59, 59),
            filter,
            1,
            1,
        )
        .await
        .unwrap();

    assert_eq!(response.total, 2);
    assert_eq!(response.entries.len(), 1);
    assert_eq!(response.entries[0].domain, "ad.example.net.");
}

#[tokio::test]
async fn missing_directory_yields_empty_results_not_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-dir");
    let repository = repository(&missing);
    let (start, end) = (at((2026, 2, 14), 0, 0, 0), at((2026, 2, 14), 23, 59, 59));

    let snapshot = repository.get_stats(start, end).await.unwrap();
    assert_eq!(snapshot.summary.total_queries, 0);
    assert_eq!(snapshot.period.files_parsed, 0);

    let response = repository
        .query_logs(start, end, LogFilter::default(), 10, 0)
        .await
        .unwrap();
    assert_eq!(response.total, 0);
}

#[test]
fn cache_reparses_when_a_file_grows() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let cache = FileStatsCache::new();
    let (start, end) = (at((2026, 2, 14), 0, 0, 0), at((2026, 2, 14), 23, 59, 59));

    let first = cache.compute_stats(dir.path(), start, end);
    assert_eq!(first.summary.total_queries, 3);

    let path = dir.path().join("2026-02-14_ALL.log");
    let mut contents = fs::read_to_string(&path).unwrap();
    contents.push_str(&log_line(
        "2026-02-14 11:00:00",
        "10.0.0.3",
        "tv",
        "3.0",
        "RESOLVED",
        "cdn.example.org.",
    ));
    contents.push('\n');
    fs::write(&path, contents).unwrap();

    let second = cache.compute_stats(dir.path(), start, end);
    assert_eq!(second.summary.total_queries, 4);
    assert_eq!(second.summary.unique_clients, 3);
}

#[test]
fn cache_trusts_an_unchanged_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture_dir(dir.path());
    let cache = FileStatsCache::new();
    let (start, end) = (at((2026, 2, 14), 0, 0, 0), at((2026, 2, 14), 23, 59, 59));

    let first = cache.compute_stats(dir.path(), start, end);
    assert_eq!(first.summary.blocked_queries, 1);

    // Same-size rewrite with the mtime restored looks unchanged to the
    // fingerprint, so the cached aggregates must be served as-is.
    let path = dir.path().join("2026-02-14_ALL.log");
    let mtime = fs::metadata(&path).unwrap().modified().unwrap();
    let original = fs::read_to_string(&path).unwrap();
    let rewritten = original.replace("BLOCKED (ads)", "RESOLVEDxxxxX");
    assert_eq!(original.len(), rewritten.len());
    fs::write(&path, rewritten).unwrap();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();

    let second = cache.compute_stats(dir.path(), start, end);
    assert_eq!(second.summary.blocked_queries, 1);
}
