//! CEX quote feed.
//!
//! Responsibilities:
//! • Maintain connection to a centralized exchange public feed.
//! • Push every decoded top-of-book quote into the rate graph.
//! • Handle reconnection and backoff.

use crate::graph::RateGraph;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod binance;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Next reconnect delay: doubled, capped at [`MAX_BACKOFF`].
fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Spawn the ingestion task: stream quotes from `endpoint` into `graph`,
/// reconnecting forever with exponential backoff.
pub fn spawn_quote_ingest(
    endpoint: String,
    symbols: Vec<String>,
    graph: Arc<RateGraph>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match binance::connect_and_stream(&endpoint, &symbols).await {
                Ok(stream) => {
                    info!(symbols = symbols.len(), "[FEED] connected");
                    backoff = INITIAL_BACKOFF;
                    futures::pin_mut!(stream);
                    let mut applied: u64 = 0;
                    let mut dropped: u64 = 0;
                    while let Some(quote) = stream.next().await {
                        if graph.upsert(&quote) {
                            applied += 1;
                        } else {
                            dropped += 1;
                        }
                    }
                    warn!(applied, dropped, "[FEED] stream ended");
                }
                Err(e) => {
                    warn!(error = %e, backoff_ms = backoff.as_millis() as u64, "[FEED] connect failed");
                }
            }
            tokio::time::sleep(backoff).await;
            backoff = next_backoff(backoff);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(next_backoff(INITIAL_BACKOFF), Duration::from_secs(1));
        assert_eq!(next_backoff(Duration::from_secs(20)), MAX_BACKOFF);
        assert_eq!(next_backoff(MAX_BACKOFF), MAX_BACKOFF);
    }
}
