use crate::ports::LogRepository;
use chrono::NaiveDateTime;
use querylens_domain::{LogError, StatsSnapshot};
use std::sync::Arc;

pub struct GetLogStatsUseCase {
    repository: Arc<dyn LogRepository>,
}

impl GetLogStatsUseCase {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<StatsSnapshot, LogError> {
        self.repository.get_stats(start, end).await
    }
}
