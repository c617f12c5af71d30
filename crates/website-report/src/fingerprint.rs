//! Visitor identity derived from the client address and user agent.

use sha1::{Digest, Sha1};
use std::net::IpAddr;

/// Address recorded when neither a forwarded address nor a peer is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the address of the client behind the reverse proxy.
///
/// The first entry of `X-Forwarded-For` wins; the socket peer is used when
/// the header is absent or empty.
#[must_use]
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Hex-encoded SHA-1 of the client address followed by its user agent.
#[must_use]
pub fn visitor_fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.as_bytes());
    hex::encode(hasher.finalize())
}
