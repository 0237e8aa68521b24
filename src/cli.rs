//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to the settings file, then to built-in defaults.

use crate::config::Settings;
use crate::error::{ScanError, ScanResult};
use crate::types::{Port, PortSpec};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// A fast, bounded-concurrency TCP port and service scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fast multi-threaded TCP port and service scanner", long_about = None)]
pub struct Args {
    /// Target host name or IP address
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g., "80", "80,443", "1-1024", "22,80,8000-9000") [default: 1-1024]
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Per-connection timeout in seconds, fractions allowed [default: 1.0]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Maximum number of concurrent probes [default: 200]
    #[arg(short = 'T', long = "threads", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Capture a short banner from open ports
    #[arg(short, long)]
    pub banner: bool,

    /// Write a JSON report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Stop the whole scan after this many seconds and report what was found
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<f64>,

    /// Print the final results as JSON instead of the plain summary
    #[arg(long)]
    pub json: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print open ports and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Fully resolved scan parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub ports: Vec<Port>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub grab_banners: bool,
    pub deadline: Option<Duration>,
}

impl Args {
    /// Merge flags over `settings` and validate the result.
    ///
    /// Runs before name resolution so bad input never starts a scan.
    pub fn resolve_options(&self, settings: &Settings) -> ScanResult<ScanOptions> {
        let port_expr = self.ports.as_deref().unwrap_or(&settings.ports);
        let ports = port_expr.parse::<PortSpec>()?.to_ports();

        let timeout = parse_seconds("timeout", self.timeout.unwrap_or(settings.timeout_secs))?;

        let concurrency = self.concurrency.unwrap_or(settings.concurrency);
        if concurrency == 0 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let deadline = self
            .deadline
            .or(settings.deadline_secs)
            .map(|secs| parse_seconds("deadline", secs))
            .transpose()?;

        Ok(ScanOptions {
            ports,
            timeout,
            concurrency,
            grab_banners: self.banner || settings.grab_banners,
            deadline,
        })
    }
}

fn parse_seconds(name: &str, secs: f64) -> ScanResult<Duration> {
    if secs <= 0.0 {
        return Err(ScanError::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| ScanError::InvalidConfig(format!("{} {}: {}", name, secs, e)))
}
