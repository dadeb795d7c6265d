use crate::ports::LogRepository;
use chrono::NaiveDateTime;
use querylens_domain::{LogError, LogFilter, LogsResponse};
use std::sync::Arc;

pub struct QueryLogsUseCase {
    repository: Arc<dyn LogRepository>,
}

impl QueryLogsUseCase {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        filter: LogFilter,
        limit: usize,
        offset: usize,
    ) -> Result<LogsResponse, LogError> {
        self.repository
            .query_logs(start, end, filter, limit, offset)
            .await
    }
}
