use anyhow::anyhow;
use chrono::Local;
use clap::{Parser, Subcommand};
use querylens_application::ports::{HostnameResolver, LogRepository, TimeGranularity};
use querylens_application::services::{CachingResolver, StaticResolver};
use querylens_application::use_cases::{GetLogStatsUseCase, GetTimelineUseCase, QueryLogsUseCase};
use querylens_domain::{FilterKind, LogFilter};
use querylens_infrastructure::{FileLogRepository, LogTailer};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod bootstrap;
mod range;

#[derive(Parser)]
#[command(name = "querylens")]
#[command(version)]
#[command(about = "Querylens - analytics over a DNS filtering daemon's query logs")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log directory (overrides the config file)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate statistics for a reporting range
    Stats {
        /// Reporting range: today, yesterday, 7d or 30d
        #[arg(long, default_value = "today")]
        range: String,
    },
    /// Query volume over time
    Timeline {
        /// Reporting range: today, yesterday, 7d or 30d
        #[arg(long, default_value = "today")]
        range: String,

        /// Bucket width: 1h or 1d
        #[arg(long, default_value = "1h")]
        interval: String,
    },
    /// Raw log entries, newest first
    Logs {
        /// Reporting range; defaults to yesterday midnight through now
        #[arg(long)]
        range: Option<String>,

        /// Page size (clamped to 1..=1000)
        #[arg(long, default_value_t = 100)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Substring match on client IP, name or resolved name
        #[arg(long)]
        client: Option<String>,

        /// Substring match on the queried domain
        #[arg(long)]
        domain: Option<String>,

        /// Response kind: blocked, cached or resolved
        #[arg(long)]
        kind: Option<String>,
    },
    /// Follow new entries as they are written
    Tail {
        /// Substring match on client IP, name or resolved name
        #[arg(long)]
        client: Option<String>,

        /// Substring match on the queried domain
        #[arg(long)]
        domain: Option<String>,

        /// Response kind: blocked, cached or resolved
        #[arg(long)]
        kind: Option<String>,
    },
}

fn build_filter(client: Option<String>, domain: Option<String>, kind: Option<String>) -> LogFilter {
    LogFilter {
        client,
        domain,
        // Unknown kinds mean no constraint, matching the filter contract.
        kind: kind.as_deref().and_then(FilterKind::parse),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::load_config(cli.config.as_deref(), cli.log_dir)?;
    bootstrap::init_logging(cli.log_level.as_deref());

    let resolver: Arc<dyn HostnameResolver> = Arc::new(CachingResolver::new(
        Arc::new(StaticResolver::default()),
        Duration::from_secs(config.resolver_cache_ttl_secs),
    ));
    let now = Local::now().naive_local();

    match cli.command {
        Command::Stats { range } => {
            let (start, end) = range::parse_range(&range, now)?;
            let repository: Arc<dyn LogRepository> =
                Arc::new(FileLogRepository::new(&config.log_dir, resolver));
            let snapshot = GetLogStatsUseCase::new(repository).execute(start, end).await?;
            print_json(&snapshot)
        }
        Command::Timeline { range, interval } => {
            let (start, end) = range::parse_range(&range, now)?;
            let granularity = TimeGranularity::parse(&interval)
                .ok_or_else(|| anyhow!("unknown interval {interval:?} (expected 1m, 15m, 1h or 1d)"))?;
            let repository: Arc<dyn LogRepository> =
                Arc::new(FileLogRepository::new(&config.log_dir, resolver));
            let buckets = GetTimelineUseCase::new(repository)
                .execute(start, end, granularity)
                .await?;
            print_json(&buckets)
        }
        Command::Logs {
            range,
            limit,
            offset,
            client,
            domain,
            kind,
        } => {
            let (start, end) = match range {
                Some(range) => range::parse_range(&range, now)?,
                None => range::default_logs_range(now),
            };
            let filter = build_filter(client, domain, kind);
            let repository: Arc<dyn LogRepository> =
                Arc::new(FileLogRepository::new(&config.log_dir, resolver));
            let response = QueryLogsUseCase::new(repository)
                .execute(start, end, filter, limit.clamp(1, 1000), offset)
                .await?;
            print_json(&response)
        }
        Command::Tail {
            client,
            domain,
            kind,
        } => {
            let filter = build_filter(client, domain, kind);
            info!(log_dir = %config.log_dir.display(), "tailing query logs");

            let token = CancellationToken::new();
            let tailer = LogTailer::new(&config.log_dir, filter, resolver)
                .with_poll_interval(Duration::from_millis(config.tail_poll_interval_ms))
                .with_backfill_count(config.tail_backfill_count)
                .with_cancellation(token.clone());

            let (tx, mut rx) = mpsc::channel(256);
            let handle = tokio::spawn(tailer.run(tx));

            let mut stdout = std::io::stdout();
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        token.cancel();
                        break;
                    }
                    event = rx.recv() => match event {
                        Some(event) => {
                            let frame = event.to_sse_frame();
                            if !frame.is_empty() {
                                stdout.write_all(frame.as_bytes())?;
                                stdout.flush()?;
                            }
                        }
                        None => break,
                    },
                }
            }

            handle.await?;
            info!("tail stopped");
            Ok(())
        }
    }
}
