//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, Response, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use ollama_proxy::{HttpServer, ProxyConfig, Shutdown};

/// What the mock upstream saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    /// Path and raw query, exactly as received.
    pub target: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A canned upstream reply.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: &'static str,
}

impl Reply {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![("content-type", "application/json")],
            body,
        }
    }
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    calls: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

/// Handle on a running mock upstream.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Captured {
        self.captured
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("upstream received no request")
    }
}

async fn record(State(state): State<MockState>, req: Request) -> Response<Body> {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    state.captured.lock().unwrap().push(Captured {
        method: parts.method,
        target,
        headers: parts.headers,
        body,
    });

    let mut builder = Response::builder().status(state.reply.status);
    for (name, value) in &state.reply.headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(state.reply.body)).unwrap()
}

/// Start an upstream that records every request and answers with `reply`.
pub async fn start_mock_upstream(reply: Reply) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply,
        calls: calls.clone(),
        captured: captured.clone(),
    };

    let app = Router::new().fallback(record).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream {
        addr,
        calls,
        captured,
    }
}

/// Handle on an upstream that streams a chunked reply in two parts.
pub struct StreamingUpstream {
    pub addr: SocketAddr,
    release: Arc<Notify>,
}

impl StreamingUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Let the upstream send the rest of the body.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Start a raw HTTP/1.1 upstream that answers one request with a chunked
/// body: `first` immediately, `rest` only after [`StreamingUpstream::release`].
pub async fn start_streaming_upstream(first: &'static str, rest: &'static str) -> StreamingUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let release = Arc::new(Notify::new());
    let gate = release.clone();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Bodyless request: read up to the end of the head
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            head.extend_from_slice(&buf[..n]);
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  content-type: application/x-ndjson\r\n\
                  transfer-encoding: chunked\r\n\r\n",
            )
            .await
            .unwrap();
        socket.write_all(chunk(first).as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        gate.notified().await;

        socket.write_all(chunk(rest).as_bytes()).await.unwrap();
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.flush().await.unwrap();
    });

    StreamingUpstream { addr, release }
}

fn chunk(data: &str) -> String {
    format!("{:x}\r\n{}\r\n", data.len(), data)
}

/// A proxy running on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy forwarding to `upstream_url`.
pub async fn start_proxy(upstream_url: &str) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.upstream.url = upstream_url.to_string();
    start_proxy_with(config).await
}

/// Start a proxy with a prepared configuration.
pub async fn start_proxy_with(mut config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

/// Address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
