//! Port mapping parsing
//!
//! Turns the `PORTS` column of `docker ps` into URLs reachable from the
//! host.

/// Host side of one `host -> container` clause of a port mapping string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSegment<'a> {
    /// Host binding, e.g. `0.0.0.0:8080` or `[::]:8080`
    pub host: &'a str,
}

impl<'a> PortSegment<'a> {
    /// Parse a single clause. Clauses without `->` (exposed but unmapped
    /// ports) yield `None`.
    pub fn parse(clause: &'a str) -> Option<Self> {
        let (host, _container) = clause.trim().split_once("->")?;
        Some(Self { host: host.trim() })
    }

    /// Port published on the host: the text after the last `:`
    pub fn host_port(&self) -> Option<&'a str> {
        let (_, port) = self.host.rsplit_once(':')?;
        let port = port.trim();
        if port.is_empty() { None } else { Some(port) }
    }

    pub fn url(&self) -> Option<String> {
        self.host_port()
            .map(|port| format!("http://localhost:{}", port))
    }
}

/// Parse a port mapping string into deduplicated local URLs.
/// Format: "0.0.0.0:8080->80/tcp, [::]:8080->80/tcp"
///
/// Malformed or unmapped clauses are dropped; the result keeps the order of
/// first occurrence.
pub fn parse_ports(raw: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for clause in raw.split(',') {
        let Some(url) = PortSegment::parse(clause).and_then(|segment| segment.url()) else {
            continue;
        };

        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}
