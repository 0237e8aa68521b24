//! The host being scanned.
//!
//! A target is resolved once, before any probe runs, and stays fixed for the
//! whole scan.

use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to a single IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }

    /// Resolve a hostname or IP literal to exactly one address.
    ///
    /// IPv4 answers are preferred; an IPv6 address is used only when the
    /// name has no IPv4 record. Any failure is fatal for the run.
    pub async fn resolve(host: &str) -> ScanResult<Self> {
        let host = host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Self::new(host, ip));
        }

        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            debug!("system resolver config unavailable ({}), using defaults", e);
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| ScanError::Resolution {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let ips: Vec<IpAddr> = response.iter().collect();
        let ip = pick_address(&ips).ok_or_else(|| ScanError::Resolution {
            host: host.to_string(),
            reason: "no addresses found".to_string(),
        })?;

        debug!("resolved {} to {}", host, ip);
        Ok(Self::new(host, ip))
    }
}

fn pick_address(ips: &[IpAddr]) -> Option<IpAddr> {
    ips.iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| ips.first())
        .copied()
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}
