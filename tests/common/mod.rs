//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tenant_router::config::RouterConfig;
use tenant_router::http::HttpServer;
use tenant_router::lifecycle::Shutdown;

/// Start a mock origin that echoes the request target it received.
///
/// The body is the request target; the `Host` header the origin saw is
/// returned in `x-origin-host`.
pub async fn start_echo_origin(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);
                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        let target = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or_default()
                            .to_string();

                        let mut host = String::new();
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) => {}
                            }
                            let line = line.trim_end();
                            if line.is_empty() {
                                break;
                            }
                            if let Some((name, value)) = line.split_once(':') {
                                if name.eq_ignore_ascii_case("host") {
                                    host = value.trim().to_string();
                                }
                            }
                        }

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nx-origin-host: {}\r\nConnection: close\r\n\r\n{}",
                            target.len(),
                            host,
                            target
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Config pointing `example.com` at the given origin.
pub fn config_for(proxy_addr: SocketAddr, origin_addr: SocketAddr) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.routing.base_domain = "example.com".parse().unwrap();
    config.listener.bind_address = proxy_addr.to_string();
    config.origin.url = format!("http://{origin_addr}");
    config.observability.metrics_enabled = false;
    config
}

/// Start the edge host and return the handles that drive it.
pub async fn start_server(
    config: RouterConfig,
) -> (Shutdown, mpsc::UnboundedSender<RouterConfig>) {
    let proxy_addr: SocketAddr = config.listener.bind_address.parse().unwrap();
    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(proxy_addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (shutdown, updates_tx)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
