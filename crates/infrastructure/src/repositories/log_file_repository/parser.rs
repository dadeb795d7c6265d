use chrono::NaiveDateTime;
use querylens_domain::{LogEntry, LogError, TIMESTAMP_FORMAT};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Number of tab-separated columns the daemon writes per event.
const FIELD_COUNT: usize = 11;

/// Parses one TSV log line. Columns: timestamp, client IP, client name,
/// duration, response reason, domain, response answer, return code, response
/// category, query type, source. An unparseable duration degrades to 0.0;
/// anything else malformed fails the whole line.
pub fn parse_line(line: &str) -> Result<LogEntry, LogError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < FIELD_COUNT {
        return Err(LogError::MalformedRecord(format!(
            "expected {FIELD_COUNT} tab-separated fields, got {}",
            fields.len()
        )));
    }

    let timestamp = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT).map_err(|e| {
        LogError::MalformedRecord(format!("bad timestamp {:?}: {e}", fields[0]))
    })?;

    let duration_ms = fields[3].parse::<f64>().unwrap_or(0.0);

    Ok(LogEntry {
        timestamp,
        client_ip: fields[1].to_string(),
        client_name: fields[2].to_string(),
        resolved_name: String::new(),
        duration_ms,
        response_reason: fields[4].to_string(),
        domain: fields[5].to_string(),
        response_answer: fields[6].to_string(),
        return_code: fields[7].to_string(),
        response_category: fields[8].to_string(),
        query_type: fields[9].to_string(),
        source: fields[10].to_string(),
    })
}

/// Streams a log file line by line, calling `f` for each well-formed entry.
/// Empty and malformed lines are skipped; the producer appends concurrently
/// and transient partial writes are expected. Only the open failure surfaces.
pub fn for_each_entry(path: &Path, mut f: impl FnMut(LogEntry)) -> Result<(), LogError> {
    let file = File::open(path).map_err(|e| LogError::FileUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "stopping log file read early");
                break;
            }
        };
        if line.is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(entry) => f(entry),
            Err(_) => continue,
        }
    }
    Ok(())
}

pub fn parse_file(path: &Path) -> Result<Vec<LogEntry>, LogError> {
    let mut entries = Vec::new();
    for_each_entry(path, |entry| entries.push(entry))?;
    Ok(entries)
}
