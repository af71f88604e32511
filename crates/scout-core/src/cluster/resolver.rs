//! Address resolution from a node's endpoint fields.
//!
//! Peers report their services as `host:port` strings and any of them may be
//! missing. The probe needs a single host, taken from the first populated
//! endpoint in [`EndpointKind::PRIORITY`] order, and a port, taken from the
//! `rpc` endpoint when the peer advertises one.

use super::endpoint::{EndpointKind, Endpoints};

/// Host segment of a `host:port` string (text before the first `:`).
pub fn host_of(addr: &str) -> &str {
    addr.split(':').next().unwrap_or(addr)
}

/// Port segment of a `host:port` string (text after the last `:`).
pub fn port_of(addr: &str) -> Option<u16> {
    let (_, port) = addr.rsplit_once(':')?;
    port.parse().ok()
}

/// Resolve the host of the first populated endpoint, in priority order.
///
/// An endpoint with an empty host (`":8899"`) is skipped like an absent one.
pub fn resolve_host(endpoints: &Endpoints) -> Option<&str> {
    EndpointKind::PRIORITY
        .iter()
        .filter_map(|kind| endpoints.get(*kind))
        .map(host_of)
        .find(|host| !host.is_empty())
}

/// Port to probe: the `rpc` endpoint's port if present and valid, else `default_port`.
pub fn probe_port(endpoints: &Endpoints, default_port: u16) -> u16 {
    endpoints
        .get(EndpointKind::Rpc)
        .and_then(port_of)
        .unwrap_or(default_port)
}
