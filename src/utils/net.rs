use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Client address for audit rows: first hop of `X-Forwarded-For`,
/// then `X-Real-IP`, then the peer address of the connection.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    peer.ip().to_string()
}
