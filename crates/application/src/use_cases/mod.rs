mod get_log_stats;
mod get_timeline;
mod query_logs;

pub use get_log_stats::GetLogStatsUseCase;
pub use get_timeline::GetTimelineUseCase;
pub use query_logs::QueryLogsUseCase;
