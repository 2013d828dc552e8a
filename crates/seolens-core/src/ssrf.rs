//! Host resolution and reserved-address blocking
//!
//! A target is only fetched when every address its host resolves to is
//! public. The same check is applied again to the address reached after
//! redirects.

use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use tracing::warn;
use url::{Host, Url};

use crate::error::AnalyzeError;
use crate::predicates::is_reserved_address;

/// Resolves a host name to the addresses a connection could reach.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.map(|sa| sa.ip()).collect())
    }
}

/// Fail with `SsrfBlocked` if any address is reserved.
pub fn check_addresses(host: &str, addrs: &[IpAddr]) -> Result<(), AnalyzeError> {
    match addrs.iter().find(|addr| is_reserved_address(**addr)) {
        Some(addr) => {
            warn!(host, address = %addr, "blocked request to reserved address");
            Err(AnalyzeError::SsrfBlocked {
                host: host.to_string(),
                address: addr.to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Resolve the host of `url` and require every address to be public.
///
/// Literal IP hosts are checked without a lookup. Returns the addresses
/// that were validated.
pub async fn ensure_public_host<R>(resolver: &R, url: &Url) -> Result<Vec<IpAddr>, AnalyzeError>
where
    R: HostResolver + ?Sized,
{
    let addrs = match url.host() {
        Some(Host::Ipv4(v4)) => vec![IpAddr::V4(v4)],
        Some(Host::Ipv6(v6)) => vec![IpAddr::V6(v6)],
        Some(Host::Domain(domain)) => {
            let port = url.port_or_known_default().unwrap_or(80);
            return resolve_public(resolver, domain, port).await;
        }
        None => return Err(AnalyzeError::InvalidAddress(format!("{url}: missing host"))),
    };

    let host = url.host_str().unwrap_or_default();
    check_addresses(host, &addrs)?;
    Ok(addrs)
}

/// Resolve `domain` and require every address to be public.
pub async fn resolve_public<R>(resolver: &R, domain: &str, port: u16) -> Result<Vec<IpAddr>, AnalyzeError>
where
    R: HostResolver + ?Sized,
{
    let addrs = resolver
        .resolve(domain, port)
        .await
        .map_err(|_| AnalyzeError::UnresolvableHost {
            host: domain.to_string(),
        })?;
    if addrs.is_empty() {
        return Err(AnalyzeError::UnresolvableHost {
            host: domain.to_string(),
        });
    }

    check_addresses(domain, &addrs)?;
    Ok(addrs)
}

/// Whether a redirect hop can be rejected without a lookup: its host is
/// `localhost` or a literal reserved address.
pub fn is_obviously_internal(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(v4)) => is_reserved_address(IpAddr::V4(v4)),
        Some(Host::Ipv6(v6)) => is_reserved_address(IpAddr::V6(v6)),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        None => true,
    }
}
