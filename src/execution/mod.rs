//! Clients for the downstream execution service.
//!
//! The detector only hands over ordered hop lists; verifying them against a
//! live book and trading is the execution service's job.

use crate::errors::{AppError, Result};
use crate::models::TradeHop;
use serde::Serialize;
use tracing::info;

pub mod dedup;

pub use dedup::{Deduplicated, RouteDedup};

/// Outcome of a successful [`ExecutionClient::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The route reached the execution service.
    Forwarded,
    /// The route was withheld, e.g. already forwarded within the dedup window.
    Suppressed,
}

#[async_trait::async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Deliver one detected route. Errors are reported, never retried.
    async fn submit(&self, route: &[TradeHop]) -> Result<Delivery>;
}

#[async_trait::async_trait]
impl<T: ExecutionClient + ?Sized> ExecutionClient for std::sync::Arc<T> {
    async fn submit(&self, route: &[TradeHop]) -> Result<Delivery> {
        (**self).submit(route).await
    }
}

/// Request body understood by the execution service.
#[derive(Debug, Serialize)]
pub struct TradeRequest<'a> {
    pub trade_route: &'a [TradeHop],
}

/// Logs routes instead of sending them anywhere.
#[derive(Debug, Default, Clone)]
pub struct LogExecution;

#[async_trait::async_trait]
impl ExecutionClient for LogExecution {
    async fn submit(&self, route: &[TradeHop]) -> Result<Delivery> {
        let path: Vec<String> = route
            .iter()
            .map(|h| format!("{}→{} (rate {:.6}, size {})", h.from, h.to, h.rate, h.size))
            .collect();
        info!(hops = route.len(), route = ?path, "[EXEC] received trade route");
        Ok(Delivery::Forwarded)
    }
}

/// POSTs routes as JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpExecution {
    client: reqwest::Client,
    endpoint: url::Url,
}

impl HttpExecution {
    pub fn new(endpoint: url::Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rate-graph-arbitrage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ExecutionClient for HttpExecution {
    async fn submit(&self, route: &[TradeHop]) -> Result<Delivery> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&TradeRequest { trade_route: route })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Rejected(format!("{status}: {body}")));
        }
        Ok(Delivery::Forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_request_serializes_hops_in_order() {
        let hops = vec![
            TradeHop {
                from: "BTC".into(),
                to: "USDT".into(),
                rate: -10.5,
                size: 0.25,
            },
            TradeHop {
                from: "USDT".into(),
                to: "ETH".into(),
                rate: 8.0,
                size: 1.5,
            },
        ];
        let json = serde_json::to_value(TradeRequest { trade_route: &hops }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "trade_route": [
                    {"from": "BTC", "to": "USDT", "rate": -10.5, "size": 0.25},
                    {"from": "USDT", "to": "ETH", "rate": 8.0, "size": 1.5}
                ]
            })
        );
    }

    #[tokio::test]
    async fn log_execution_accepts_everything() {
        assert_eq!(LogExecution.submit(&[]).await.unwrap(), Delivery::Forwarded);
    }

    #[test]
    fn http_execution_keeps_endpoint() {
        let url = url::Url::parse("http://localhost:50052/trades").unwrap();
        let client = HttpExecution::new(url.clone()).unwrap();
        assert_eq!(client.endpoint(), &url);
    }

    /// Answer a single HTTP request with `response`, handing back the raw
    /// request once it has been read in full.
    async fn serve_once(response: &'static str) -> (url::Url, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        let url = url::Url::parse(&format!("http://{addr}/trades")).unwrap();
        (url, handle)
    }

    fn hops() -> Vec<TradeHop> {
        vec![TradeHop {
            from: "BTC".into(),
            to: "USDT".into(),
            rate: -10.8,
            size: 0.5,
        }]
    }

    #[tokio::test]
    async fn http_execution_posts_json_route() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        let client = HttpExecution::new(url).unwrap();

        assert_eq!(client.submit(&hops()).await.unwrap(), Delivery::Forwarded);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /trades HTTP/1.1"));
        assert!(request.contains(r#""trade_route":[{"from":"BTC","to":"USDT""#));
    }

    #[tokio::test]
    async fn http_execution_rejects_non_success_status() {
        let (url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\nboom",
        )
        .await;
        let client = HttpExecution::new(url).unwrap();

        match client.submit(&hops()).await {
            Err(AppError::Rejected(msg)) => {
                assert!(msg.starts_with("500"), "{msg}");
                assert!(msg.ends_with("boom"), "{msg}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        server.await.unwrap();
    }
}
