//! Prober trait abstraction and per-port outcomes.
//!
//! The coordinator only sees the `Prober` trait, so tests can drive it with
//! scripted probers instead of real sockets.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// An open port as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPort {
    /// The port number that accepted a connection.
    pub port: Port,
    /// Detected or inferred service name.
    pub service: String,
    /// Banner captured from the service; empty when none was captured.
    pub banner: String,
}

impl OpenPort {
    /// Create an open port record without a banner.
    pub fn new(port: Port, service: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            banner: String::new(),
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }
}

/// Result of probing a single port. Immutable once produced.
///
/// Refused, reset, timed out and any other connect failure all map to
/// `ClosedOrFiltered`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open(OpenPort),
    ClosedOrFiltered(Port),
}

/// Trait for single-port prober implementations.
///
/// `probe` must never fail: every fault on the way to a connection is
/// reported as [`ProbeOutcome::ClosedOrFiltered`].
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a single port.
    async fn probe(&self, port: Port) -> ProbeOutcome;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_port_json_shape() {
        let open = OpenPort::new(Port::new(22).unwrap(), "SSH");
        let json = serde_json::to_value(&open).unwrap();
        assert_eq!(json, serde_json::json!({"port": 22, "service": "SSH", "banner": ""}));
    }
}
