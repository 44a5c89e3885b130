use crate::core::Address;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{Span, debug, info, info_span};

/// Maps one host name to the IP addresses it currently resolves to.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// System resolver (getaddrinfo with stream sockets, IPv4 and IPv6).
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

#[async_trait]
impl NameResolver for DnsResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Table-driven resolver; names missing from the table do not resolve.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    table: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.insert(host, addrs);
        self
    }

    pub fn insert(&mut self, host: impl Into<String>, addrs: Vec<IpAddr>) {
        self.table.insert(host.into(), addrs);
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.table.get(host).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("failed to lookup address information for {}", host),
            )
        })
    }
}

/// Resolves configured host names into the deduplicated candidate set.
#[derive(Clone)]
pub struct AddressResolver {
    resolver: Arc<dyn NameResolver>,
    span: Span,
}

impl AddressResolver {
    pub fn new(resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            resolver,
            span: info_span!("resolver"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Resolves every host name; a name that fails to resolve is skipped.
    pub async fn resolve(&self, hostnames: &[String]) -> BTreeSet<Address> {
        let mut addresses = BTreeSet::new();
        for hostname in hostnames {
            match self.resolver.lookup(hostname).await {
                Ok(ips) => {
                    debug!(parent: &self.span, host = %hostname, resolved = ?ips, "host resolved");
                    addresses.extend(ips.into_iter().map(Address::from));
                }
                Err(err) => {
                    info!(parent: &self.span, host = %hostname, error = %err, "host does not resolve");
                }
            }
        }
        addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn resolves_and_deduplicates_across_names() {
        let resolver = StaticResolver::new()
            .with_host("a.example", vec![ip("1.1.1.1"), ip("2.2.2.2")])
            .with_host("b.example", vec![ip("2.2.2.2"), ip("::1")]);
        let resolver = AddressResolver::new(Arc::new(resolver));

        let addrs = resolver
            .resolve(&["a.example".to_string(), "b.example".to_string()])
            .await;
        let addrs: Vec<_> = addrs.iter().map(Address::as_str).collect();
        assert_eq!(addrs, vec!["1.1.1.1", "2.2.2.2", "::1"]);
    }

    #[tokio::test]
    async fn unresolvable_name_does_not_abort_others() {
        let resolver =
            StaticResolver::new().with_host("b.example", vec![ip("3.3.3.3")]);
        let resolver = AddressResolver::new(Arc::new(resolver));

        let addrs = resolver
            .resolve(&["missing.example".to_string(), "b.example".to_string()])
            .await;
        assert_eq!(addrs.into_iter().collect::<Vec<_>>(), vec![Address::new("3.3.3.3")]);
    }

    #[tokio::test]
    async fn dns_resolver_handles_ip_literals() {
        let ips = DnsResolver.lookup("127.0.0.1").await.unwrap();
        assert!(ips.contains(&ip("127.0.0.1")));
    }
}
