mod resolver_cache;
mod stats_accumulator;
mod timeline_accumulator;

pub use resolver_cache::{CachingResolver, StaticResolver};
pub use stats_accumulator::StatsAccumulator;
pub use timeline_accumulator::TimelineAccumulator;
