//! Derivation of the rate-limit [`ClientKey`] for an incoming request.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use intake::ClientKey;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Picks the identifier a request is rate-limited under.
///
/// The peer socket address is used by default. When the server sits behind a
/// trusted reverse proxy (`trust_forwarded_for`), the first address in
/// `X-Forwarded-For` wins instead. Requests with neither share the
/// [`ClientKey::unknown`] bucket.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> ClientKey {
    if trust_forwarded_for {
        if let Some(ip) = forwarded_for(headers) {
            return ClientKey::from_ip(ip);
        }
    }

    peer.map(|addr| ClientKey::from_ip(canonical_ip(addr.ip())))
        .unwrap_or_else(ClientKey::unknown)
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    first.parse::<IpAddr>().ok().map(canonical_ip)
}

// Dual-stack listeners report IPv4 peers as `::ffff:a.b.c.d`.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}
