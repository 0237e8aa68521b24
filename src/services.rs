//! Service naming based on port numbers.
//!
//! Lookup order is fixed: the built-in table of well-known ports, then the
//! host's service database, then `"Unknown"`.

use crate::types::Port;
use std::collections::HashMap;
use std::fs;
use std::sync::LazyLock;
use tracing::debug;

/// Name reported when neither table knows the port.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Location of the system service database.
const SYSTEM_SERVICES_PATH: &str = "/etc/services";

/// Static map of well-known ports to service names.
static PORT_SERVICES: LazyLock<HashMap<u16, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (21, "FTP"),
        (22, "SSH"),
        (23, "Telnet"),
        (25, "SMTP"),
        (53, "DNS"),
        (80, "HTTP"),
        (110, "POP3"),
        (143, "IMAP"),
        (443, "HTTPS"),
        (445, "SMB"),
        (3306, "MySQL"),
        (3389, "RDP"),
        (5432, "PostgreSQL"),
        (5900, "VNC"),
        (6379, "Redis"),
        (8080, "HTTP-Alt"),
        (8443, "HTTPS-Alt"),
        (27017, "MongoDB"),
    ])
});

/// TCP entries of the system service database, read on first use.
static SYSTEM_SERVICES: LazyLock<HashMap<u16, String>> = LazyLock::new(|| {
    match fs::read_to_string(SYSTEM_SERVICES_PATH) {
        Ok(content) => parse_services(&content),
        Err(e) => {
            debug!("service database {} unavailable: {}", SYSTEM_SERVICES_PATH, e);
            HashMap::new()
        }
    }
});

/// Look up a port in the built-in table only.
pub fn static_service_name(port: Port) -> Option<&'static str> {
    PORT_SERVICES.get(&port.as_u16()).copied()
}

/// Look up a port in the system service database only.
pub fn system_service_name(port: Port) -> Option<&'static str> {
    SYSTEM_SERVICES.get(&port.as_u16()).map(String::as_str)
}

/// Resolve the service name for an open port.
pub fn service_name(port: Port) -> String {
    static_service_name(port)
        .or_else(|| system_service_name(port))
        .unwrap_or(UNKNOWN_SERVICE)
        .to_string()
}

/// Parse `/etc/services`-style text into a port-to-name map of TCP entries.
///
/// Each line reads `name port/protocol [aliases...]`, with `#` starting a
/// comment. The first entry for a port wins.
pub fn parse_services(content: &str) -> HashMap<u16, String> {
    let mut services = HashMap::new();

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let (Some(name), Some(port_proto)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Some((port, proto)) = port_proto.split_once('/') else {
            continue;
        };
        if !proto.eq_ignore_ascii_case("tcp") {
            continue;
        }
        if let Ok(port) = port.parse::<u16>() {
            services.entry(port).or_insert_with(|| name.to_string());
        }
    }

    services
}
