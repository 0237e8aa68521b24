//! TCP connect prober.
//!
//! Performs a full TCP handshake through the operating system's socket API.
//! No special privileges are needed.

use crate::banner::grab_banner;
use crate::scanner::traits::{OpenPort, ProbeOutcome, Prober};
use crate::services::service_name;
use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Why a connection attempt did not produce an open port.
///
/// Only used for logging; callers see a single closed/filtered outcome.
#[derive(Debug)]
enum ConnectFailure {
    Refused,
    TimedOut,
    Other(io::Error),
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "refused"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

/// TCP connect prober for one target.
pub struct TcpProber {
    target: IpAddr,
    timeout: Duration,
    grab_banners: bool,
}

impl TcpProber {
    /// Create a new TCP connect prober.
    ///
    /// # Arguments
    /// * `target` - Target IP address to probe
    /// * `timeout` - Connection timeout per port (also bounds each banner phase)
    /// * `grab_banners` - Whether to capture a banner from open ports
    pub fn new(target: IpAddr, timeout: Duration, grab_banners: bool) -> Self {
        Self {
            target,
            timeout,
            grab_banners,
        }
    }

    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ConnectFailure> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(ConnectFailure::Refused)
            }
            Ok(Err(e)) => Err(ConnectFailure::Other(e)),
            Err(_) => Err(ConnectFailure::TimedOut),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match self.attempt_connect(addr).await {
            Ok(stream) => {
                drop(stream);
                let open = OpenPort::new(port, service_name(port));
                debug!("{} is open ({})", addr, open.service);

                if self.grab_banners {
                    let banner = grab_banner(addr, self.timeout).await;
                    ProbeOutcome::Open(open.with_banner(banner))
                } else {
                    ProbeOutcome::Open(open)
                }
            }
            Err(failure) => {
                trace!("{} not open: {}", addr, failure);
                ProbeOutcome::ClosedOrFiltered(port)
            }
        }
    }

    fn target(&self) -> IpAddr {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use std::time::Instant;
    use tokio::net::{TcpListener, TcpSocket};

    fn localhost() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    /// A listener that never accepts, with its backlog filled so further
    /// handshakes stall. The returned streams must outlive the test.
    async fn stalled_listener() -> (TcpListener, Vec<TcpStream>, Port) {
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(1).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut held = Vec::new();
        for _ in 0..32 {
            match timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => held.push(stream),
                Ok(Err(e)) => panic!("filler connect failed: {}", e),
                Err(_) => return (listener, held, Port::new(addr.port()).unwrap()),
            }
        }
        panic!("backlog never filled after {} connections", held.len());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = TcpProber::new(localhost(), Duration::from_millis(200), false);
        assert_eq!(
            prober.probe(port).await,
            ProbeOutcome::ClosedOrFiltered(port)
        );
    }

    #[tokio::test]
    async fn test_stalled_handshake_times_out_as_closed() {
        let (_listener, _held, port) = stalled_listener().await;
        let connect_timeout = Duration::from_millis(300);
        let prober = TcpProber::new(localhost(), connect_timeout, true);

        let start = Instant::now();
        let outcome = prober.probe(port).await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, ProbeOutcome::ClosedOrFiltered(port));
        assert!(elapsed >= connect_timeout, "returned after {:?}", elapsed);
        assert!(elapsed < connect_timeout * 3, "returned after {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_probe_open_port_without_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = TcpProber::new(localhost(), Duration::from_millis(500), false);
        match prober.probe(port).await {
            ProbeOutcome::Open(open) => {
                assert_eq!(open.port, port);
                assert!(!open.service.is_empty());
                assert_eq!(open.banner, "");
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_open_port_with_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 64];
                    if socket.read(&mut buf).await.unwrap_or(0) > 0 {
                        let _ = socket.write_all(b"HTTP/1.0 200 OK\r\n\r\n").await;
                    }
                });
            }
        });

        let prober = TcpProber::new(localhost(), Duration::from_secs(1), true);
        match prober.probe(port).await {
            ProbeOutcome::Open(open) => assert_eq!(open.banner, "HTTP/1.0 200 OK"),
            other => panic!("expected open, got {:?}", other),
        }
    }
}
