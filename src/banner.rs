//! Banner grabbing for open TCP ports.
//!
//! Best effort: every failure collapses to an empty banner so the caller
//! never has to handle an error here.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Maximum bytes to read for a banner.
const MAX_BANNER_SIZE: usize = 1024;

/// Maximum characters kept from a decoded banner.
const MAX_BANNER_CHARS: usize = 100;

/// Generic probe; HTTP servers answer it, most others ignore it or reply
/// with their greeting anyway.
const PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Grab a banner from `addr` over a fresh connection.
///
/// Connect, send and receive are each bounded by `phase_timeout`. Returns an
/// empty string when nothing usable comes back.
pub async fn grab_banner(addr: SocketAddr, phase_timeout: Duration) -> String {
    match read_response(addr, phase_timeout).await {
        Some(bytes) => sanitize_banner(&bytes),
        None => String::new(),
    }
}

async fn read_response(addr: SocketAddr, phase_timeout: Duration) -> Option<Vec<u8>> {
    let mut stream = match timeout(phase_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            trace!("banner connect to {} failed: {}", addr, e);
            return None;
        }
        Err(_) => {
            trace!("banner connect to {} timed out", addr);
            return None;
        }
    };

    match timeout(phase_timeout, stream.write_all(PROBE)).await {
        Ok(Ok(())) => {}
        _ => {
            trace!("banner probe to {} not sent", addr);
            return None;
        }
    }

    let mut buffer = vec![0u8; MAX_BANNER_SIZE];
    match timeout(phase_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => {
            buffer.truncate(n);
            Some(buffer)
        }
        _ => None,
    }
}

/// Decode, trim and clip raw banner bytes.
///
/// Invalid UTF-8 is replaced rather than rejected. Whitespace is trimmed on
/// both ends, the text is cut to 100 characters, and any
/// whitespace exposed by the cut is trimmed again.
pub fn sanitize_banner(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let clipped: String = text.trim().chars().take(MAX_BANNER_CHARS).collect();
    clipped.trim_end().to_string()
}
