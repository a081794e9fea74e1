//! Client identification for the attempt budget.
//!
//! Order of precedence: the first `X-Forwarded-For` entry, then `X-Real-IP`,
//! then the connection peer address.

use actix_web::http::header::HeaderMap;
use actix_web::HttpRequest;

const FALLBACK_CLIENT_ID: &str = "127.0.0.1";

/// Derives the identifier the governor keys attempt records on
pub fn client_id(req: &HttpRequest) -> String {
    forwarded_ip_from_headers(req.headers())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| FALLBACK_CLIENT_ID.to_string())
}

/// Reads the proxy-supplied client address, if any
fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
