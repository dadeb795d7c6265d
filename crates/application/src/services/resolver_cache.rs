use crate::ports::HostnameResolver;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedName {
    name: Option<String>,
    expires_at: Instant,
}

/// Memoizing decorator over any [`HostnameResolver`]. Reverse lookups are
/// slow relative to the tail poll cadence, so results (including negative
/// ones) are cached with a TTL and looked up off the hot parse path.
pub struct CachingResolver {
    inner: Arc<dyn HostnameResolver>,
    cache: DashMap<String, CachedName>,
    ttl: Duration,
}

impl CachingResolver {
    pub fn new(inner: Arc<dyn HostnameResolver>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait]
impl HostnameResolver for CachingResolver {
    async fn resolve(&self, ip: &str) -> Option<String> {
        if let Some(entry) = self.cache.get(ip) {
            if entry.expires_at > Instant::now() {
                return entry.name.clone();
            }
        }

        let name = self.inner.resolve(ip).await;
        debug!(ip, resolved = name.is_some(), "hostname lookup cached");
        self.cache.insert(
            ip.to_string(),
            CachedName {
                name: name.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        name
    }
}

/// Fixed ip-to-name table. Useful in tests and when no reverse-DNS source is
/// wired in; the default instance resolves nothing.
#[derive(Default)]
pub struct StaticResolver {
    names: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl HostnameResolver for StaticResolver {
    async fn resolve(&self, ip: &str) -> Option<String> {
        self.names.get(ip).cloned()
    }
}
