mod hostname_resolver;
mod log_repository;

pub use hostname_resolver::HostnameResolver;
pub use log_repository::{LogRepository, TimeGranularity};
