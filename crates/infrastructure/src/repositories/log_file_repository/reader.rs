use super::{enumerate, parser};
use chrono::NaiveDateTime;
use querylens_domain::{LogEntry, LogFilter, LogsResponse};
use std::path::Path;
use tracing::warn;

/// Parses every log file in the inclusive date range. Unreadable files are
/// skipped; the enumerated file count is reported either way.
pub fn load_entries(dir: &Path, start: NaiveDateTime, end: NaiveDateTime) -> (Vec<LogEntry>, usize) {
    let files = enumerate::files_for_range(dir, start.date(), end.date());
    let mut entries = Vec::new();
    for path in &files {
        match parser::parse_file(path) {
            Ok(mut parsed) => entries.append(&mut parsed),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable log file");
            }
        }
    }
    (entries, files.len())
}

/// Applies the filter, sorts reverse-chronologically, and slices out one
/// page. `total` counts post-filter matches; an offset past the end yields
/// an empty page, not an error.
pub fn filter_sort_paginate(
    mut entries: Vec<LogEntry>,
    filter: &LogFilter,
    limit: usize,
    offset: usize,
) -> LogsResponse {
    if !filter.is_empty() {
        entries.retain(|entry| filter.matches(entry));
    }
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let total = entries.len();
    let page = if offset >= total {
        Vec::new()
    } else {
        entries.into_iter().skip(offset).take(limit).collect()
    };

    LogsResponse {
        total,
        offset,
        limit,
        entries: page,
    }
}
