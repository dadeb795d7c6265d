use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Date prefix of the daemon's per-day log filenames.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the log files holding a single date's queries.
///
/// The daemon writes either one `{date}_ALL.log` (csv mode) or one
/// `{date}_{client}.log` per client (csv-client mode). `_ALL` wins when both
/// exist; per-client files sort lexicographically for a deterministic merge
/// order.
pub fn files_for_date(dir: &Path, date: NaiveDate) -> Vec<PathBuf> {
    let date_str = date.format(DATE_FORMAT).to_string();

    let all = dir.join(format!("{date_str}_ALL.log"));
    if all.is_file() {
        return vec![all];
    }

    let pattern = dir.join(format!("{date_str}_*.log"));
    let mut matches: Vec<PathBuf> = match glob::glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            debug!(pattern = %pattern.display(), error = %e, "bad glob pattern");
            Vec::new()
        }
    };
    matches.sort();
    matches
}

/// Concatenates per-date results over an inclusive calendar range. Dates
/// without files contribute nothing.
pub fn files_for_range(dir: &Path, start: NaiveDate, end: NaiveDate) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut day = start;
    while day <= end {
        files.extend(files_for_date(dir, day));
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    files
}
