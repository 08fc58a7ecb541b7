//! UpstreamClient: an HTTP client bound to one upstream location.
//!
//! Grounded on `examples/original_source/cmd/hiveInterpreter/network.go`'s
//! `upstreamBuilder` (TCP/HTTPS keep-alive tuning, `http://unix:<path>`
//! dialing) and, for the Unix branch, on the `hyper::client::conn::http1`
//! handshake pattern in
//! `examples/other_examples/19f221c2_hyperium-hyper__src-client-conn-http1.rs.rs`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::time::Duration;
use tokio::net::UnixStream;

pub enum UpstreamClient {
    Http(HttpUpstream),
    Unix(UnixUpstream),
}

impl UpstreamClient {
    /// Builds a client for `location`. A bare `host:port` is prefixed with
    /// `http://`; `http://unix:<path>` dials a Unix domain socket instead of
    /// TCP, using `http://unix` as the nominal request URL.
    pub fn new(location: &str) -> Self {
        let location = normalize_location(location);
        if let Some(path) = location.strip_prefix("http://unix:") {
            UpstreamClient::Unix(UnixUpstream { path: path.to_string() })
        } else {
            UpstreamClient::Http(HttpUpstream::new(location))
        }
    }

    /// Sends `body` as a POST with `Content-Type: application/json`.
    /// Returns `(0, [])` on any transport failure; callers treat that as an
    /// empty body (SPEC_FULL.md §4.1).
    pub async fn execute(&self, body: Vec<u8>) -> (u16, Vec<u8>) {
        match self {
            UpstreamClient::Http(h) => h.execute(body).await,
            UpstreamClient::Unix(u) => u.execute(body).await,
        }
    }
}

fn normalize_location(location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!("http://{location}")
    }
}

/// TCP/HTTPS upstream with a generously sized keep-alive pool, matching the
/// original Go transport's `MaxIdleConns:10000, IdleConnTimeout:30s`.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(10_000)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builder should not fail with these options");
        Self { client, url }
    }

    pub async fn execute(&self, body: Vec<u8>) -> (u16, Vec<u8>) {
        let resp = match self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(_) => return (0, Vec::new()),
        };
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        (status, bytes)
    }
}

/// Upstream reached over a Unix domain socket. Each request opens a fresh
/// connection: hyper's low-level `client::conn::http1` API has no built-in
/// pool, and a hand-rolled one is out of scope for this crate — upstreams
/// reached this way are colocated processes on the same host, where the
/// keep-alive idle-pool tuning that matters for TCP upstreams is moot.
pub struct UnixUpstream {
    path: String,
}

impl UnixUpstream {
    pub async fn execute(&self, body: Vec<u8>) -> (u16, Vec<u8>) {
        let stream = match UnixStream::connect(&self.path).await {
            Ok(s) => s,
            Err(_) => return (0, Vec::new()),
        };
        let io = TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(_) => return (0, Vec::new()),
        };
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let request = match Request::builder()
            .method("POST")
            .uri("/")
            .header("Host", "unix")
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body)))
        {
            Ok(req) => req,
            Err(_) => return (0, Vec::new()),
        };

        let response = match sender.send_request(request).await {
            Ok(resp) => resp,
            Err(_) => return (0, Vec::new()),
        };
        let status = response.status().as_u16();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes().to_vec(),
            Err(_) => Vec::new(),
        };
        (status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_prefix() {
        assert_eq!(normalize_location("127.0.0.1:8080"), "http://127.0.0.1:8080");
    }

    #[test]
    fn existing_scheme_is_preserved() {
        assert_eq!(normalize_location("https://example.com"), "https://example.com");
    }

    #[test]
    fn unix_location_is_detected() {
        match UpstreamClient::new("http://unix:/tmp/example.sock") {
            UpstreamClient::Unix(u) => assert_eq!(u.path, "/tmp/example.sock"),
            UpstreamClient::Http(_) => panic!("expected unix client"),
        }
    }
}
