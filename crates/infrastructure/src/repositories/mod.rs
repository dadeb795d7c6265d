pub mod log_file_repository;

pub use log_file_repository::{FileLogRepository, FileStatsCache};
