use crate::log_entry::LogEntry;

/// Response class a filter can select on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Blocked,
    Cached,
    /// Neither blocked nor cached.
    Resolved,
}

impl FilterKind {
    /// Parses the wire value. Unknown values impose no constraint, matching
    /// the producer's query-parameter handling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blocked" => Some(Self::Blocked),
            "cached" => Some(Self::Cached),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// Filter criteria for raw-log queries and the live tail. All predicates are
/// optional and AND-combined; `None` imposes no constraint.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Case-insensitive substring matched against client IP, display name,
    /// or resolved hostname.
    pub client: Option<String>,
    /// Case-insensitive substring matched against the queried domain.
    pub domain: Option<String>,
    pub kind: Option<FilterKind>,
}

impl LogFilter {
    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.domain.is_none() && self.kind.is_none()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(client) = &self.client {
            let needle = client.to_lowercase();
            let hit = entry.client_ip.to_lowercase().contains(&needle)
                || entry.client_name.to_lowercase().contains(&needle)
                || entry.resolved_name.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(domain) = &self.domain {
            if !entry.domain.to_lowercase().contains(&domain.to_lowercase()) {
                return false;
            }
        }

        match self.kind {
            Some(FilterKind::Blocked) => entry.is_blocked(),
            Some(FilterKind::Cached) => entry.is_cached(),
            Some(FilterKind::Resolved) => !entry.is_blocked() && !entry.is_cached(),
            None => true,
        }
    }
}
