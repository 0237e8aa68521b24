//! # portsweep - a bounded-concurrency TCP port scanner
//!
//! portsweep probes one host across a set of TCP ports, reports which ones
//! accept connections, names the likely service and can capture a short
//! banner from each open port.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use portsweep::scanner::{run_scan, ScanEvent, ScanJob, TcpProber};
//! use portsweep::types::{PortSpec, ScanTarget};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = ScanTarget::resolve("127.0.0.1").await?;
//!     let ports = "22,80,8000-8100".parse::<PortSpec>()?.to_ports();
//!     let prober = Arc::new(TcpProber::new(target.ip, Duration::from_secs(1), true));
//!
//!     let results = run_scan(prober, &target, ScanJob::new(ports), |event| {
//!         if let ScanEvent::Open(open) = event {
//!             println!("{} open ({})", open.port, open.service);
//!         }
//!     })
//!     .await?;
//!
//!     println!("{} open ports", results.open_ports.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`services`] - port-to-service-name lookup
//! - [`banner`] - best-effort banner capture
//! - [`scanner`] - the TCP prober and the scan coordinator
//! - [`types`] - validated ports, port sets and the resolved target
//! - [`config`], [`cli`], [`output`], [`report`] - the program around the engine

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ScanError};
pub use scanner::{OpenPort, ProbeOutcome, Prober, ScanEvent, ScanJob, ScanResults};
pub use types::{Port, PortSpec, ScanTarget};
