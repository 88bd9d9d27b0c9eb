//! Request middleware
//!
//! Client identification and the global admission layer.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::handlers::AppState;
use crate::error::{ApiError, Result};

/// Identifier used when nothing better is known about the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Caller identity used as the limiter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Resolves the client from proxy headers, falling back to the peer address.
pub fn resolve_client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    forwarded
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientId(resolve_client_id(&parts.headers, peer)))
    }
}

/// Admits every request against the global limiter.
///
/// The permit lives until the inner service has produced its response.
pub async fn global_admission(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    request: Request,
    next: Next,
) -> Result<Response> {
    let permit = state
        .global_limiter
        .acquire(&client)
        .map_err(ApiError::Rejected)?;

    debug!(client = %client, path = %request.uri().path(), "Global admission granted");
    let response = next.run(request).await;
    drop(permit);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let peer = "127.0.0.1:4000".parse().ok();
        assert_eq!(resolve_client_id(&map, peer), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer_then_unknown() {
        let map = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(resolve_client_id(&map, None), "198.51.100.2");

        let peer: Option<SocketAddr> = "192.0.2.9:5555".parse().ok();
        assert_eq!(resolve_client_id(&HeaderMap::new(), peer), "192.0.2.9");

        assert_eq!(resolve_client_id(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_blank_headers_are_ignored() {
        let map = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "  ")]);
        assert_eq!(resolve_client_id(&map, None), UNKNOWN_CLIENT);
    }
}
