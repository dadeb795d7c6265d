use crate::ports::{LogRepository, TimeGranularity};
use chrono::NaiveDateTime;
use querylens_domain::{LogError, TimelineBucket};
use std::sync::Arc;

pub struct GetTimelineUseCase {
    repository: Arc<dyn LogRepository>,
}

impl GetTimelineUseCase {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity: TimeGranularity,
    ) -> Result<Vec<TimelineBucket>, LogError> {
        self.repository.get_timeline(start, end, granularity).await
    }
}
