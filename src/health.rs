//! Minimal HTTP liveness endpoint for the hosting platform.
//!
//! `GET /` and `GET /health` answer plain text, `GET /state` dumps the
//! runtime status as JSON.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::scheduler::SharedStatus;

const ONLINE_BODY: &str = "FutNews online";

pub async fn route(method: &str, path: &str, status: &SharedStatus) -> (&'static str, &'static str, String) {
    let path = path.split('?').next().unwrap_or("");
    match (method, path) {
        ("GET", "/") | ("GET", "/health") | ("HEAD", "/health") => {
            ("HTTP/1.1 200 OK", "text/plain; charset=utf-8", ONLINE_BODY.to_string())
        }
        ("GET", "/state") => {
            let snap = status.read().await.clone();
            let json = serde_json::to_string_pretty(&snap).unwrap_or_else(|_| "{}".to_string());
            ("HTTP/1.1 200 OK", "application/json; charset=utf-8", json)
        }
        _ => (
            "HTTP/1.1 404 Not Found",
            "text/plain; charset=utf-8",
            "not found".to_string(),
        ),
    }
}

async fn handle_http_connection(mut stream: TcpStream, status: SharedStatus) -> Result<()> {
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.context("http read")?;
    if n == 0 {
        return Ok(());
    }

    let req = String::from_utf8_lossy(&buf[..n]);
    let first_line = req.lines().next().unwrap_or_default();
    let mut parts = first_line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");

    let (status_line, content_type, body) = route(method, path, &status).await;

    let resp = format!(
        "{status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes()).await.context("http write")?;
    Ok(())
}

pub async fn start_http_server(status: SharedStatus, bind: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(bind).await.context("http bind")?;
    info!("health endpoint on http://{} (GET /health, /state)", bind);

    loop {
        let (stream, peer) = listener.accept().await.context("http accept")?;
        let status = status.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_http_connection(stream, status).await {
                debug!("http handler err {}: {}", peer, e);
            }
        });
    }
}
