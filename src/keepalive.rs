//! Keep-alive HTTP listener.
//!
//! Hosting platforms that idle unresponsive processes only need *something*
//! answering on the configured port. Every request, whatever its method or
//! path, gets the same `200 OK` plain-text reply.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use log::{debug, info};
use tokio::net::TcpListener;

pub const KEEPALIVE_BODY: &str = "Bot is running!";

/// One fallback route, so no method or path can miss.
pub fn router() -> Router {
    Router::new().fallback(alive)
}

async fn alive(method: Method, uri: Uri) -> (StatusCode, &'static str) {
    debug!("keep-alive request: {} {}", method, uri);
    (StatusCode::OK, KEEPALIVE_BODY)
}

/// Bind `0.0.0.0:<port>`.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind keep-alive listener on {}", addr))?;
    info!("Keep-alive server listening on port {}", port);
    Ok(listener)
}

/// Serve keep-alive replies until the task is aborted.
pub async fn serve(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router())
        .await
        .context("keep-alive server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn router_answers_any_method_and_path() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move { axum::serve(listener, router()).await });

        for head in ["PUT /anything", "DELETE /", "OPTIONS /a/b/c?d=e"] {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!(
                "{} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                head
            );
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{}: {}", head, response);
            assert!(response.contains("content-type: text/plain"), "{}", response);
            assert!(response.ends_with(KEEPALIVE_BODY));
        }

        server.abort();
    }
}
