#![allow(dead_code)]

use proxy_harvest::Candidate;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How a fake proxy answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Relays plain GET requests, refuses CONNECT
    GetOnly,
    /// Opens CONNECT tunnels, refuses plain GET
    ConnectOnly,
    /// Accepts both request kinds
    Open,
    /// Answers every request with 403
    Reject,
    /// Accepts the connection and never writes
    Silent,
    /// Writes a status line without the trailing newline, then closes
    Truncated,
}

/// Local TCP listener pretending to be an HTTP proxy
pub struct FakeProxy {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeProxy {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake proxy");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(serve(stream, behavior));
            }
        });
        Self { addr, handle }
    }

    pub fn candidate(&self) -> Candidate {
        Candidate::new(self.addr.to_string())
    }
}

impl Drop for FakeProxy {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream, behavior: Behavior) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let is_connect = buf.starts_with(b"CONNECT ");

    let reply: &[u8] = match (behavior, is_connect) {
        (Behavior::Silent, _) => {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            return;
        }
        (Behavior::Truncated, _) => b"HTTP/1.1 200 OK",
        (Behavior::Reject, _) => b"HTTP/1.1 403 Forbidden\r\n\r\n",
        (Behavior::GetOnly, true) => b"HTTP/1.1 405 Method Not Allowed\r\n\r\n",
        (Behavior::ConnectOnly, false) => b"HTTP/1.1 400 Bad Request\r\n\r\n",
        (_, true) => b"HTTP/1.1 200 Connection established\r\n\r\n",
        (_, false) => b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n",
    };
    let _ = stream.write_all(reply).await;
    let _ = stream.shutdown().await;
}

/// Start `n` fake proxies with the same behavior
pub async fn start_many(n: usize, behavior: Behavior) -> Vec<FakeProxy> {
    let mut proxies = Vec::with_capacity(n);
    for _ in 0..n {
        proxies.push(FakeProxy::start(behavior).await);
    }
    proxies
}

/// Render proxies as a list body, one `host:port` per line
pub fn list_body<'a>(proxies: impl IntoIterator<Item = &'a FakeProxy>) -> String {
    proxies
        .into_iter()
        .map(|p| format!("{}\n", p.addr))
        .collect()
}
