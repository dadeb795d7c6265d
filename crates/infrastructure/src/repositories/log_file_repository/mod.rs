mod cache;
pub(crate) mod enumerate;
pub(crate) mod parser;
mod reader;

pub use cache::FileStatsCache;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use querylens_application::ports::{HostnameResolver, LogRepository, TimeGranularity};
use querylens_domain::{LogError, LogFilter, LogsResponse, StatsSnapshot, TimelineBucket};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// File-backed [`LogRepository`] over a daemon log directory.
///
/// Aggregation goes through a shared [`FileStatsCache`] so unchanged files
/// are never re-parsed; the raw-log path always reads the range because it
/// returns entries, not aggregates. Parsing is blocking I/O and runs on the
/// blocking pool.
pub struct FileLogRepository {
    log_dir: PathBuf,
    cache: Arc<FileStatsCache>,
    resolver: Arc<dyn HostnameResolver>,
}

impl FileLogRepository {
    pub fn new(log_dir: impl Into<PathBuf>, resolver: Arc<dyn HostnameResolver>) -> Self {
        Self {
            log_dir: log_dir.into(),
            cache: Arc::new(FileStatsCache::new()),
            resolver,
        }
    }

    pub fn log_dir(&self) -> &PathBuf {
        &self.log_dir
    }
}

#[async_trait]
impl LogRepository for FileLogRepository {
    #[instrument(skip(self))]
    async fn get_stats(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<StatsSnapshot, LogError> {
        let cache = Arc::clone(&self.cache);
        let dir = self.log_dir.clone();
        tokio::task::spawn_blocking(move || cache.compute_stats(&dir, start, end))
            .await
            .map_err(|e| LogError::Io(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn get_timeline(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: TimeGranularity,
    ) -> Result<Vec<TimelineBucket>, LogError> {
        let cache = Arc::clone(&self.cache);
        let dir = self.log_dir.clone();
        tokio::task::spawn_blocking(move || cache.compute_timeline(&dir, start, end, granularity))
            .await
            .map_err(|e| LogError::Io(e.to_string()))?
    }

    #[instrument(skip(self, filter))]
    async fn query_logs(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: LogFilter,
        limit: usize,
        offset: usize,
    ) -> Result<LogsResponse, LogError> {
        let dir = self.log_dir.clone();
        let (mut entries, _files) =
            tokio::task::spawn_blocking(move || reader::load_entries(&dir, start, end))
                .await
                .map_err(|e| LogError::Io(e.to_string()))?;

        // Resolved names take part in client filtering, so enrich first.
        for entry in &mut entries {
            if entry.resolved_name.is_empty() {
                if let Some(name) = self.resolver.resolve(&entry.client_ip).await {
                    entry.resolved_name = name;
                }
            }
        }

        Ok(reader::filter_sort_paginate(entries, &filter, limit, offset))
    }
}
