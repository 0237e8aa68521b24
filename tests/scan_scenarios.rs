use portsweep::scanner::{run_scan, ScanJob, ScanResults, TcpProber};
use portsweep::types::{Port, ScanTarget};
use portsweep::ScanError;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

const HTTP_RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\n\
Server: scenario-test/1.0 (a deliberately long server header so the banner needs clipping)\r\n\
Content-Length: 0\r\n\r\n";

fn localhost() -> ScanTarget {
    ScanTarget::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Accepts connections and never says anything.
async fn silent_listener() -> Port {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                drop(socket);
            });
        }
    });
    Port::new(port).unwrap()
}

/// Answers any request with an HTTP status line.
async fn http_listener() -> Port {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 256];
                if socket.read(&mut buf).await.unwrap_or(0) > 0 {
                    let _ = socket.write_all(HTTP_RESPONSE).await;
                }
            });
        }
    });
    Port::new(port).unwrap()
}

/// A port that was just free; nothing listens on it.
async fn closed_port() -> Port {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Port::new(port).unwrap()
}

/// Never accepts and has its backlog full, so new handshakes hang.
/// Keep the returned listener and streams alive while scanning.
async fn stalled_listener() -> (TcpListener, Vec<TcpStream>, Port) {
    let socket = TcpSocket::new_v4().unwrap();
    socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let listener = socket.listen(1).unwrap();
    let addr = listener.local_addr().unwrap();

    let mut held = Vec::new();
    for _ in 0..32 {
        match tokio::time::timeout(Duration::from_millis(200), TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => held.push(stream),
            Ok(Err(e)) => panic!("filler connect failed: {}", e),
            Err(_) => return (listener, held, Port::new(addr.port()).unwrap()),
        }
    }
    panic!("backlog never filled after {} connections", held.len());
}

async fn scan(ports: Vec<Port>, grab_banners: bool) -> ScanResults {
    let target = localhost();
    let prober = Arc::new(TcpProber::new(
        target.ip,
        Duration::from_millis(500),
        grab_banners,
    ));
    run_scan(prober, &target, ScanJob::new(ports).with_concurrency(8), |_| {})
        .await
        .expect("scan runs")
}

#[tokio::test]
async fn silent_and_http_listeners_with_banners() {
    let ssh_like = silent_listener().await;
    let http = http_listener().await;
    let mut ports = vec![
        ssh_like,
        http,
        closed_port().await,
        closed_port().await,
        closed_port().await,
    ];
    ports.sort_unstable();
    ports.dedup();

    let results = scan(ports.clone(), true).await;

    assert!(results.complete);
    assert_eq!(results.ports_scanned, ports.len());
    assert_eq!(results.open_ports.len(), 2);

    let mut expected = vec![ssh_like, http];
    expected.sort_unstable();
    let found: Vec<Port> = results.open_ports.iter().map(|o| o.port).collect();
    assert_eq!(found, expected);

    for open in &results.open_ports {
        if open.port == ssh_like {
            assert_eq!(open.banner, "");
        } else {
            assert!(open.banner.starts_with("HTTP/1.0 200 OK"));
            assert!(open.banner.chars().count() <= 100);
        }
    }
}

#[tokio::test]
async fn repeated_scans_find_the_same_ports() {
    let first = silent_listener().await;
    let second = http_listener().await;
    let ports = {
        let mut p = vec![first, second, closed_port().await];
        p.sort_unstable();
        p.dedup();
        p
    };

    let a = scan(ports.clone(), false).await;
    let b = scan(ports, false).await;

    let ports_of = |r: &ScanResults| r.open_ports.iter().map(|o| o.port).collect::<Vec<_>>();
    assert_eq!(ports_of(&a), ports_of(&b));
    assert_eq!(ports_of(&a).len(), 2);
    assert!(a.open_ports.iter().all(|o| o.banner.is_empty()));
}

#[tokio::test]
async fn unanswered_probe_respects_timeout() {
    let (_listener, _held, stalled) = stalled_listener().await;
    let target = localhost();
    let prober = Arc::new(TcpProber::new(target.ip, Duration::from_millis(300), true));
    let ports = vec![stalled, closed_port().await];

    let start = Instant::now();
    let results = run_scan(prober, &target, ScanJob::new(ports), |_| {})
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert!(start.elapsed() < Duration::from_secs(3));
    assert!(results.complete);
    assert_eq!(results.ports_completed, 2);
    assert!(results.open_ports.is_empty());
}

#[tokio::test]
async fn unresolvable_host_is_fatal() {
    let err = ScanTarget::resolve("doesnotexist.invalid").await.unwrap_err();
    assert!(matches!(err, ScanError::Resolution { .. }));
}
