//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use backplane_cli::registry::{EndpointKind, Environment, EnvironmentRegistry, RegistryError};

/// Host that only resolves through a mock proxy.
pub const BACKPLANE_URL: &str = "http://backplane.invalid";

/// A mock HTTP server answering every request with a fixed status.
///
/// Acting as a forward proxy it receives absolute-form request lines, which
/// are recorded for inspection.
pub struct MockServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request lines seen so far, e.g. `GET http://backplane.invalid/healthz HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock server on an ephemeral port that answers with `status`.
pub async fn start_mock_server(status: u16) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        respond(socket, status, seen).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockServer { addr, requests }
}

/// Start a server that accepts connections but never answers.
#[allow(dead_code)]
pub async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn respond(mut socket: TcpStream, status: u16, seen: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    // Read the request head before answering.
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf);
    if let Some(line) = head.lines().next() {
        seen.lock().unwrap().push(line.to_string());
    }

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Registry whose active environment exposes [`BACKPLANE_URL`].
#[allow(dead_code)]
pub struct TestRegistry {
    pub backplane_url: Option<String>,
}

#[allow(dead_code)]
impl TestRegistry {
    pub fn with_backplane() -> Self {
        Self {
            backplane_url: Some(BACKPLANE_URL.to_string()),
        }
    }

    pub fn without_backplane() -> Self {
        Self { backplane_url: None }
    }
}

impl EnvironmentRegistry for TestRegistry {
    fn active_environment(&self) -> Result<Environment, RegistryError> {
        let env = Environment::new("production");
        Ok(match &self.backplane_url {
            Some(url) => env.with_endpoint(EndpointKind::Backplane, url.as_str()),
            None => env,
        })
    }
}
