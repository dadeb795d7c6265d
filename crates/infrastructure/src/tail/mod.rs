//! Live tail over today's log files.
//!
//! One [`LogTailer`] serves one subscriber: it backfills the most recent
//! matching entries, then polls the tracked files on a fixed period and
//! emits every newly appended, filtered record until cancelled.

use crate::repositories::log_file_repository::{enumerate, parser};
use chrono::{Local, NaiveDate};
use querylens_application::ports::HostnameResolver;
use querylens_domain::{LogEntry, LogFilter};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_BACKFILL_COUNT: usize = 50;

/// Event stream delivered to a tail subscriber: one backfill batch, then
/// individual entries at the polling cadence.
#[derive(Debug, Clone)]
pub enum TailEvent {
    Backfill(Vec<LogEntry>),
    Entry(LogEntry),
}

impl TailEvent {
    /// Renders the server-sent-event frame for this event. The backfill batch
    /// is a named event carrying a JSON array; entries are unnamed data
    /// frames. Returns an empty string if serialization fails.
    pub fn to_sse_frame(&self) -> String {
        match self {
            TailEvent::Backfill(entries) => match serde_json::to_string(entries) {
                Ok(json) => format!("event: backfill\ndata: {json}\n\n"),
                Err(e) => {
                    warn!(error = %e, "failed to serialize backfill frame");
                    String::new()
                }
            },
            TailEvent::Entry(entry) => match serde_json::to_string(entry) {
                Ok(json) => format!("data: {json}\n\n"),
                Err(e) => {
                    warn!(error = %e, "failed to serialize entry frame");
                    String::new()
                }
            },
        }
    }
}

/// Follows today's log files, emitting filtered entries as they are written.
///
/// Each tick re-stats every tracked file: a shrunken file means truncation or
/// rotation and restarts from offset zero; growth is read from the previous
/// offset and split into complete lines. Bytes after the last newline in a
/// chunk are dropped rather than buffered — the producer writes whole lines
/// per flush, so a record is lost only when a write straddles a tick. Day
/// rollover re-enumerates the tracked set, and per-client files appearing
/// mid-day join at offset zero.
///
/// The loop ends only on cancellation or when the subscriber goes away;
/// delivery across reconnects is not gap-free.
pub struct LogTailer {
    log_dir: PathBuf,
    filter: LogFilter,
    resolver: Arc<dyn HostnameResolver>,
    poll_interval: Duration,
    backfill_count: usize,
    shutdown: CancellationToken,
}

impl LogTailer {
    pub fn new(
        log_dir: impl Into<PathBuf>,
        filter: LogFilter,
        resolver: Arc<dyn HostnameResolver>,
    ) -> Self {
        Self {
            log_dir: log_dir.into(),
            filter,
            resolver,
            poll_interval: DEFAULT_POLL_INTERVAL,
            backfill_count: DEFAULT_BACKFILL_COUNT,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_backfill_count(mut self, count: usize) -> Self {
        self.backfill_count = count;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs until cancelled or the receiver is dropped.
    pub async fn run(self, tx: mpsc::Sender<TailEvent>) {
        let mut day = Local::now().date_naive();
        let mut offsets: HashMap<PathBuf, u64> = HashMap::new();

        let backfill = self.collect_backfill(day, &mut offsets).await;
        if !backfill.is_empty() && tx.send(TailEvent::Backfill(backfill)).await.is_err() {
            return;
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("log tail cancelled");
                    return;
                }
                _ = interval.tick() => {
                    let today = Local::now().date_naive();
                    if today != day {
                        debug!(%today, "day rollover, retracking log files");
                        day = today;
                        offsets.clear();
                    }
                    if self.poll_tick(day, &mut offsets, &tx).await.is_err() {
                        // Subscriber went away.
                        return;
                    }
                }
            }
        }
    }

    /// Parses today's files in full and returns the last `backfill_count`
    /// matching entries in ascending order, recording each file's current
    /// size so polling starts at the append frontier.
    async fn collect_backfill(
        &self,
        day: NaiveDate,
        offsets: &mut HashMap<PathBuf, u64>,
    ) -> Vec<LogEntry> {
        let files = enumerate::files_for_date(&self.log_dir, day);
        let mut matched = Vec::new();

        for path in &files {
            match parser::parse_file(path) {
                Ok(entries) => {
                    matched.extend(entries.into_iter().filter(|e| self.filter.matches(e)));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable log file");
                }
            }
            if let Ok(meta) = fs::metadata(path) {
                offsets.insert(path.clone(), meta.len());
            }
        }

        matched.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let skip = matched.len().saturating_sub(self.backfill_count);
        let mut batch = matched.split_off(skip);
        for entry in &mut batch {
            self.enrich(entry).await;
        }
        batch
    }

    async fn poll_tick(
        &self,
        day: NaiveDate,
        offsets: &mut HashMap<PathBuf, u64>,
        tx: &mpsc::Sender<TailEvent>,
    ) -> Result<(), mpsc::error::SendError<TailEvent>> {
        for path in enumerate::files_for_date(&self.log_dir, day) {
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            let size = meta.len();
            let offset = offsets.entry(path.clone()).or_insert(0);

            if size < *offset {
                debug!(path = %path.display(), "log file truncated, restarting from start");
                *offset = 0;
            }
            if size <= *offset {
                continue;
            }

            let chunk = match read_chunk(&path, *offset, size - *offset) {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read appended bytes");
                    continue;
                }
            };
            *offset += chunk.len() as u64;

            for line in split_complete_lines(&chunk) {
                let Ok(mut entry) = parser::parse_line(&line) else {
                    continue;
                };
                if !self.filter.matches(&entry) {
                    continue;
                }
                self.enrich(&mut entry).await;
                tx.send(TailEvent::Entry(entry)).await?;
            }
        }
        Ok(())
    }

    async fn enrich(&self, entry: &mut LogEntry) {
        if entry.resolved_name.is_empty() {
            if let Some(name) = self.resolver.resolve(&entry.client_ip).await {
                entry.resolved_name = name;
            }
        }
    }
}

fn read_chunk(path: &Path, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len as usize);
    file.take(len).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Splits a read chunk into complete, non-empty lines. Bytes after the final
/// newline are discarded.
fn split_complete_lines(data: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, byte) in data.iter().enumerate() {
        if *byte == b'\n' {
            let mut line = &data[start..i];
            if line.ends_with(b"\r") {
                line = &line[..line.len() - 1];
            }
            if !line.is_empty() {
                lines.push(String::from_utf8_lossy(line).into_owned());
            }
            start = i + 1;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_trailing_partial_line() {
        let lines = split_complete_lines(b"one\ntwo\r\npartial");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn split_skips_blank_lines() {
        let lines = split_complete_lines(b"one\n\ntwo\n");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn sse_frames_have_expected_shape() {
        let entry = match parser::parse_line(
            "2026-02-14 08:00:00\t10.0.0.1\tPC\t1.5\tRESOLVED\texample.com.\tA (1.2.3.4)\tNOERROR\tRESOLVED\tA\tblocky",
        ) {
            Ok(entry) => entry,
            Err(e) => panic!("fixture line failed to parse: {e}"),
        };

        let frame = TailEvent::Entry(entry.clone()).to_sse_frame();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        assert!(!frame.contains("event:"));

        let frame = TailEvent::Backfill(vec![entry]).to_sse_frame();
        assert!(frame.starts_with("event: backfill\ndata: ["));
        assert!(frame.ends_with("\n\n"));
    }
}
