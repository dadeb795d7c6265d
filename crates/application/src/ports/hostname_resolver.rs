use async_trait::async_trait;

/// Reverse-DNS lookup consumed by the query and tail paths. Resolution is an
/// external concern; implementations decide transport and timeouts. `None`
/// means unresolved and is not an error.
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    async fn resolve(&self, ip: &str) -> Option<String>;
}
