//! Scanner module - coordinates concurrent port probing.
//!
//! A fixed pool of workers pulls ports from a shared queue and sends each
//! outcome down a channel. The coordinator is the only consumer of that
//! channel and the only writer of the result collection.

pub mod tcp;
pub mod traits;

use crate::error::{ScanError, ScanResult};
use crate::types::{Port, ScanTarget};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use std::vec;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

pub use tcp::TcpProber;
pub use traits::{OpenPort, ProbeOutcome, Prober};

/// Progress notifications emitted while a scan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A port was found open. Arrives in completion order, not port order.
    Open(OpenPort),
    /// One more port has finished, whatever its outcome.
    Progress { completed: usize, total: usize },
}

/// What to scan and how hard to push.
#[derive(Debug, Clone)]
pub struct ScanJob {
    /// Ports to probe, one outcome each.
    pub ports: Vec<Port>,
    /// Maximum number of probes in flight at once.
    pub concurrency: usize,
    /// Optional wall-clock limit for the whole scan.
    pub deadline: Option<Duration>,
}

impl ScanJob {
    pub fn new(ports: Vec<Port>) -> Self {
        Self {
            ports,
            concurrency: 200,
            deadline: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Complete scan results, handed out once the scan is over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResults {
    /// Target as given by the user.
    pub target: String,
    /// Address the prober connected to.
    pub ip_address: IpAddr,
    /// Number of ports requested.
    pub ports_scanned: usize,
    /// Number of ports that produced an outcome.
    pub ports_completed: usize,
    /// Open ports, sorted by port number.
    pub open_ports: Vec<OpenPort>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// False when the deadline cut the scan short.
    pub complete: bool,
}

type PortQueue = Arc<Mutex<vec::IntoIter<Port>>>;

/// Execute a complete port scan.
///
/// Every port in `job.ports` yields exactly one outcome unless the deadline
/// elapses first, in which case in-flight probes are abandoned and the
/// results gathered so far come back with `complete == false`.
pub async fn run_scan<F>(
    prober: Arc<dyn Prober>,
    target: &ScanTarget,
    job: ScanJob,
    mut on_event: F,
) -> ScanResult<ScanResults>
where
    F: FnMut(ScanEvent),
{
    if job.concurrency == 0 {
        return Err(ScanError::InvalidConfig(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let deadline = job.deadline.map(|limit| start + limit);
    let total = job.ports.len();
    let worker_count = job.concurrency.min(total);

    info!(
        "scanning {} ports on {} with {} workers",
        total, target, worker_count
    );

    let queue: PortQueue = Arc::new(Mutex::new(job.ports.into_iter()));
    let (tx, mut rx) = mpsc::channel(worker_count.max(1));

    let mut workers = JoinSet::new();
    for id in 0..worker_count {
        workers.spawn(worker(
            id,
            Arc::clone(&queue),
            Arc::clone(&prober),
            tx.clone(),
        ));
    }
    // Channel closes once the last worker exits.
    drop(tx);

    let mut open_ports = Vec::new();
    let mut completed = 0usize;
    let mut expired = false;

    loop {
        // Once the deadline passes, only outcomes already queued are taken.
        let received = match deadline {
            _ if expired => rx.try_recv().ok(),
            Some(at) => tokio::select! {
                biased;
                outcome = rx.recv() => outcome,
                _ = time::sleep_until(at) => {
                    warn!(
                        "deadline reached with {}/{} ports done, abandoning the rest",
                        completed, total
                    );
                    expired = true;
                    rx.try_recv().ok()
                }
            },
            None => rx.recv().await,
        };
        let Some(outcome) = received else {
            break;
        };

        completed += 1;
        if let ProbeOutcome::Open(open) = outcome {
            on_event(ScanEvent::Open(open.clone()));
            open_ports.push(open);
        }
        on_event(ScanEvent::Progress { completed, total });
    }

    workers.abort_all();
    drop(workers);

    open_ports.sort_by_key(|open| open.port);
    let duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "scan of {} finished: {} open, {}/{} ports in {} ms",
        target,
        open_ports.len(),
        completed,
        total,
        duration_ms
    );

    Ok(ScanResults {
        target: target.original.clone(),
        ip_address: prober.target(),
        ports_scanned: total,
        ports_completed: completed,
        open_ports,
        started_at,
        finished_at: Utc::now(),
        duration_ms,
        complete: completed == total,
    })
}

fn next_port(queue: &Mutex<vec::IntoIter<Port>>) -> Option<Port> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next()
}

/// Probe ports from the queue until it runs dry or the coordinator hangs up.
async fn worker(
    id: usize,
    queue: PortQueue,
    prober: Arc<dyn Prober>,
    results: mpsc::Sender<ProbeOutcome>,
) {
    trace!("worker {} started", id);

    while let Some(port) = next_port(&queue) {
        let outcome = AssertUnwindSafe(prober.probe(port))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                warn!("probe of port {} panicked, counting it as not open", port);
                ProbeOutcome::ClosedOrFiltered(port)
            });

        if results.send(outcome).await.is_err() {
            debug!("worker {} stopping, coordinator gone", id);
            return;
        }
    }

    trace!("worker {} finished", id);
}
